//! Qdrant REST client.
//!
//! Talks to the collection and point endpoints of the Qdrant HTTP API:
//!
//! | operation         | request                                  |
//! |-------------------|------------------------------------------|
//! | collection_exists | `GET /collections/{name}/exists`         |
//! | collection_info   | `GET /collections/{name}`                |
//! | create_collection | `PUT /collections/{name}`                |
//! | delete_collection | `DELETE /collections/{name}`             |
//! | upsert            | `PUT /collections/{name}/points?wait=true` |
//! | search            | `POST /collections/{name}/points/search` |

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use vecsmoke_types::{
    CollectionInfo, CollectionSpec, Distance, Payload, PayloadValue, Point, PointId,
    SearchResult, Settings, SmokeError,
};

use crate::error::{ClientError, ConnectionError, RemoteError, RequestError};
use crate::store::{Connector, Operation, VectorStore};

/// Default REST port.
pub const DEFAULT_PORT: u16 = 6333;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "api-key";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Qdrant REST client.
#[derive(Debug)]
pub struct QdrantConfig {
    /// Base URL (e.g., "https://xyz.cloud.qdrant.io:6333")
    pub url: String,

    /// API key, sent on every request when present
    pub api_key: Option<SecretString>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl QdrantConfig {
    /// Create config for an unauthenticated endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build from settings. Fails when no host is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, SmokeError> {
        let mut config = Self::new(settings.endpoint_url()?).with_timeout(settings.timeout());
        if let Some(key) = settings.api_key.as_deref().filter(|k| !k.is_empty()) {
            config = config.with_api_key(key);
        }
        Ok(config)
    }
}

/// Opens [`QdrantStore`] handles.
pub struct QdrantConnector {
    config: Arc<QdrantConfig>,
}

impl QdrantConnector {
    pub fn new(config: QdrantConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl Connector for QdrantConnector {
    async fn connect(&self) -> Result<Box<dyn VectorStore>, ClientError> {
        info!(
            endpoint = %self.config.url,
            authenticated = self.config.api_key.is_some(),
            "Connecting to vector store"
        );
        let store = QdrantStore::open(Arc::clone(&self.config))?;
        Ok(Box::new(store))
    }

    fn endpoint(&self) -> String {
        self.config.url.clone()
    }
}

/// Handle to a Qdrant instance over REST.
pub struct QdrantStore {
    client: Option<Client>,
    base: Url,
    config: Arc<QdrantConfig>,
}

impl QdrantStore {
    /// Build the HTTP client. No request is sent until the first operation.
    pub fn open(config: Arc<QdrantConfig>) -> Result<Self, ClientError> {
        let base = Url::parse(&config.url)
            .map_err(|e| ConnectionError::InvalidEndpoint(format!("{}: {}", config.url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ConnectionError::InvalidEndpoint(config.url.clone()).into());
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConnectionError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            client: Some(client),
            base,
            config,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ConnectionError::InvalidEndpoint(self.config.url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let client = self.client.as_ref().ok_or(ConnectionError::Closed)?;
        let mut request = client.request(method, self.url(segments)?);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key.expose_secret());
        }
        Ok(request)
    }

    /// Send a request and unwrap the `result` field of the response.
    async fn execute<T: DeserializeOwned>(
        &self,
        op: Operation,
        subject: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        debug!(op = %op, subject, "Sending request");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(op = %op, status = status.as_u16(), "Request failed");
            return Err(classify_failure(op, subject, status.as_u16(), &body));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("{}: {}", op, e)))?;
        Ok(envelope.result)
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn list_collections(&self) -> Result<Vec<String>, ClientError> {
        let request = self.request(Method::GET, &["collections"])?;
        let result: CollectionsResult = self
            .execute(Operation::ListCollections, "*", request)
            .await?;
        Ok(result.collections.into_iter().map(|c| c.name).collect())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, ClientError> {
        let request = self.request(Method::GET, &["collections", name, "exists"])?;
        let result: ExistsResult = self
            .execute(Operation::CollectionExists, name, request)
            .await?;
        Ok(result.exists)
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, ClientError> {
        let request = self.request(Method::GET, &["collections", name])?;
        let result: CollectionInfoResult = self
            .execute(Operation::CollectionInfo, name, request)
            .await?;
        result.config.params.vectors.into_info(name)
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<(), ClientError> {
        let body = CreateCollectionBody {
            vectors: VectorParams {
                size: spec.dimension,
                distance: distance_to_wire(spec.distance).to_string(),
            },
        };
        let request = self
            .request(Method::PUT, &["collections", &spec.name])?
            .json(&body);
        let created: bool = self
            .execute(Operation::CreateCollection, &spec.name, request)
            .await?;
        if !created {
            return Err(RemoteError::Server {
                status: 200,
                message: format!("collection '{}' was not created", spec.name),
            }
            .into());
        }
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool, ClientError> {
        let request = self.request(Method::DELETE, &["collections", name])?;
        self.execute(Operation::DeleteCollection, name, request)
            .await
    }

    async fn upsert(&self, collection: &str, points: &[Point]) -> Result<usize, ClientError> {
        let request = self
            .request(Method::PUT, &["collections", collection, "points"])?
            .query(&[("wait", "true")])
            .json(&UpsertBody { points });
        let result: UpdateResult = self
            .execute(Operation::Upsert, collection, request)
            .await?;

        match result.status.as_str() {
            "completed" | "acknowledged" => Ok(points.len()),
            other => Err(RemoteError::Server {
                status: 200,
                message: format!("upsert finished with status '{}'", other),
            }
            .into()),
        }
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: u64,
    ) -> Result<Vec<SearchResult>, ClientError> {
        let request = self
            .request(Method::POST, &["collections", collection, "points", "search"])?
            .json(&SearchBody {
                vector: query,
                limit,
                with_payload: true,
            });
        let hits: Vec<ScoredPoint> = self
            .execute(Operation::Search, collection, request)
            .await?;
        Ok(hits.into_iter().map(ScoredPoint::into_result).collect())
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(endpoint = %self.config.url, "Closed vector store connection");
        }
    }
}

/// Map a non-success response to an error kind.
pub fn classify_failure(op: Operation, subject: &str, status: u16, body: &str) -> ClientError {
    let message = error_message(body).unwrap_or_else(|| format!("HTTP {} from {}", status, op));
    let already_exists = op == Operation::CreateCollection
        && (status == 409 || message.to_ascii_lowercase().contains("already exists"));

    match status {
        _ if already_exists => RemoteError::AlreadyExists(subject.to_string()).into(),
        401 | 403 => ConnectionError::Unauthorized(message).into(),
        408 | 504 => ConnectionError::Timeout(message).into(),
        404 => RemoteError::NotFound(message).into(),
        400 | 422 => RequestError::Rejected(message).into(),
        _ => RemoteError::Server { status, message }.into(),
    }
}

/// Extract `status.error` from an error body, falling back to the raw text.
fn error_message(body: &str) -> Option<String> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(error) = envelope.status.and_then(|s| s.error) {
            return Some(error);
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Metric name used on the wire.
pub fn distance_to_wire(distance: Distance) -> &'static str {
    match distance {
        Distance::Cosine => "Cosine",
        Distance::Dot => "Dot",
        Distance::Euclidean => "Euclid",
    }
}

/// Parse a wire metric name. Metrics without a local counterpart yield `None`.
pub fn distance_from_wire(name: &str) -> Option<Distance> {
    match name {
        "Cosine" => Some(Distance::Cosine),
        "Dot" => Some(Distance::Dot),
        "Euclid" => Some(Distance::Euclidean),
        _ => None,
    }
}

/// Convert a stored payload; nested values are kept as JSON text.
fn payload_from_wire(raw: HashMap<String, serde_json::Value>) -> Payload {
    raw.into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::Bool(b) => PayloadValue::Bool(b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => PayloadValue::Integer(i),
                    None => PayloadValue::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                serde_json::Value::String(s) => PayloadValue::String(s),
                other => PayloadValue::String(other.to_string()),
            };
            Some((key, value))
        })
        .collect()
}

// ===== Wire types =====

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    status: Option<ErrorStatus>,
}

#[derive(Deserialize)]
struct ErrorStatus {
    error: Option<String>,
}

#[derive(Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Deserialize)]
struct CollectionInfoResult {
    config: CollectionConfig,
}

#[derive(Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Deserialize)]
struct CollectionParams {
    vectors: VectorsConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VectorsConfig {
    Single(VectorParams),
    Named(HashMap<String, VectorParams>),
}

impl VectorsConfig {
    fn into_info(self, collection: &str) -> Result<CollectionInfo, ClientError> {
        match self {
            VectorsConfig::Single(params) => {
                let distance = distance_from_wire(&params.distance).ok_or_else(|| {
                    RequestError::Rejected(format!(
                        "collection '{}' uses unsupported distance '{}'",
                        collection, params.distance
                    ))
                })?;
                Ok(CollectionInfo {
                    dimension: params.size,
                    distance,
                })
            }
            VectorsConfig::Named(named) => {
                let mut names: Vec<String> = named.into_keys().collect();
                names.sort();
                Err(RequestError::Rejected(format!(
                    "collection '{}' uses named vectors ({}); a single unnamed vector is required",
                    collection,
                    names.join(", ")
                ))
                .into())
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
struct VectorParams {
    size: u64,
    distance: String,
}

#[derive(Serialize)]
struct CreateCollectionBody {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct UpsertBody<'a> {
    points: &'a [Point],
}

#[derive(Deserialize)]
struct UpdateResult {
    status: String,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    vector: &'a [f32],
    limit: u64,
    with_payload: bool,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: PointId,
    score: f32,
    #[serde(default)]
    payload: Option<HashMap<String, serde_json::Value>>,
}

impl ScoredPoint {
    fn into_result(self) -> SearchResult {
        SearchResult {
            id: self.id,
            score: self.score,
            payload: self.payload.map(payload_from_wire),
        }
    }
}
