//! End-to-end test infrastructure for vecsmoke.
//!
//! Provides a mocked Qdrant REST endpoint and helpers for running the full
//! connect-ensure-upsert-search pipeline against it.

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vecsmoke_client::{QdrantConfig, QdrantConnector};
use vecsmoke_runner::RunConfig;
use vecsmoke_types::{CollectionSpec, Distance, SampleSet};

/// Collection name used by the scenarios.
pub const COLLECTION: &str = "e2e_collection";

/// Successful Qdrant response envelope.
pub fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "result": result,
        "status": "ok",
        "time": 0.001
    }))
}

/// Failed Qdrant response envelope.
pub fn error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "status": { "error": message },
        "time": 0.001
    }))
}

/// The 4-d cosine scenario with the built-in sample.
pub fn scenario_config() -> RunConfig {
    RunConfig::new(
        CollectionSpec::new(COLLECTION, 4, Distance::Cosine),
        SampleSet::builtin(),
    )
}

/// Connector for the mock server.
pub fn connector(server: &MockServer) -> QdrantConnector {
    QdrantConnector::new(QdrantConfig::new(server.uri()))
}

/// Hits the service returns for the built-in sample, best first.
pub fn scenario_hits() -> Value {
    json!([
        {
            "id": 2,
            "version": 0,
            "score": 0.9325552,
            "payload": { "color": "black", "rand_number": 53, "extra_field": true }
        },
        {
            "id": 1,
            "version": 0,
            "score": 0.6322232,
            "payload": { "color": "red", "rand_number": 32 }
        }
    ])
}

/// Mocked Qdrant endpoint with per-route helpers.
///
/// Each helper mounts one route and takes the number of calls it expects;
/// the server verifies the counts when dropped.
pub struct QdrantMock {
    pub server: MockServer,
}

impl QdrantMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn connector(&self) -> QdrantConnector {
        connector(&self.server)
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub async fn list(&self, names: &[&str], calls: u64) {
        let collections: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
        Mock::given(method("GET"))
            .and(path("/collections"))
            .respond_with(ok(json!({ "collections": collections })))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    pub async fn exists(&self, exists: bool, calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/collections/{}/exists", COLLECTION)))
            .respond_with(ok(json!({ "exists": exists })))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    pub async fn info(&self, size: u64, distance: &str, calls: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/collections/{}", COLLECTION)))
            .respond_with(ok(json!({
                "status": "green",
                "points_count": 0,
                "config": {
                    "params": { "vectors": { "size": size, "distance": distance } }
                }
            })))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Create route requiring the 4-d cosine body.
    pub async fn create(&self, response: ResponseTemplate, calls: u64) {
        Mock::given(method("PUT"))
            .and(path(format!("/collections/{}", COLLECTION)))
            .and(body_json(json!({ "vectors": { "size": 4, "distance": "Cosine" } })))
            .respond_with(response)
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    pub async fn delete(&self, calls: u64) {
        Mock::given(method("DELETE"))
            .and(path(format!("/collections/{}", COLLECTION)))
            .respond_with(ok(json!(true)))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    pub async fn upsert(&self, response: ResponseTemplate, calls: u64) {
        Mock::given(method("PUT"))
            .and(path(format!("/collections/{}/points", COLLECTION)))
            .and(query_param("wait", "true"))
            .respond_with(response)
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    pub async fn search(&self, hits: Value, calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/collections/{}/points/search", COLLECTION)))
            .respond_with(ok(hits))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Routes for a run against an absent collection.
    pub async fn fresh_collection(&self) {
        self.exists(false, 1).await;
        self.create(ok(json!(true)), 1).await;
        self.upsert(upsert_completed(), 1).await;
        self.search(scenario_hits(), 1).await;
    }
}

/// Upsert response for a batch applied before returning.
pub fn upsert_completed() -> ResponseTemplate {
    ok(json!({ "operation_id": 1, "status": "completed" }))
}
