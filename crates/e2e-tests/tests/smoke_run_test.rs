//! Smoke runs against a mocked Qdrant REST endpoint.
//!
//! Each test mounts the routes a run should hit, with call counts; the mock
//! server verifies the counts when it is dropped.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

use e2e_tests::{
    error, ok, scenario_config, scenario_hits, upsert_completed, QdrantMock, COLLECTION,
};
use vecsmoke_client::{ClientError, RemoteError, RequestError};
use vecsmoke_runner::{CollectionOutcome, RunError, SmokeTestRunner};
use vecsmoke_types::{CollectionPolicy, PayloadValue, Point, PointId};

#[tokio::test]
async fn test_scenario_on_fresh_collection() {
    let mock = QdrantMock::start().await;
    mock.fresh_collection().await;

    let runner = SmokeTestRunner::new(mock.connector());
    let report = runner.run(&scenario_config()).await.unwrap();

    assert_eq!(report.collection, COLLECTION);
    assert_eq!(report.collection_outcome, CollectionOutcome::Created);
    assert_eq!(report.upserted, 2);

    let ids: Vec<PointId> = report.results.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![PointId::Num(2), PointId::Num(1)]);

    let payload = report.results[0].payload.as_ref().unwrap();
    assert_eq!(payload["color"], PayloadValue::from("black"));
    assert_eq!(payload["extra_field"], PayloadValue::Bool(true));
}

#[tokio::test]
async fn test_existing_collection_is_reused() {
    let mock = QdrantMock::start().await;
    mock.exists(true, 1).await;
    mock.info(4, "Cosine", 1).await;
    mock.create(ok(json!(true)), 0).await;
    mock.upsert(upsert_completed(), 1).await;
    mock.search(scenario_hits(), 1).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let report = runner.run(&scenario_config()).await.unwrap();

    assert_eq!(report.collection_outcome, CollectionOutcome::AlreadyExisted);
}

#[tokio::test]
async fn test_existing_collection_with_other_dimension_aborts() {
    let mock = QdrantMock::start().await;
    mock.exists(true, 1).await;
    mock.info(8, "Cosine", 1).await;
    mock.upsert(upsert_completed(), 0).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let err = runner.run(&scenario_config()).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Client(ClientError::Request(RequestError::SchemaMismatch { .. }))
    ));
    assert_eq!(err.kind(), "RequestError");
}

#[tokio::test]
async fn test_lost_create_race_falls_through_to_check() {
    let mock = QdrantMock::start().await;
    mock.exists(false, 1).await;
    mock.create(
        error(
            409,
            &format!("Wrong input: Collection `{}` already exists!", COLLECTION),
        ),
        1,
    )
    .await;
    mock.info(4, "Cosine", 1).await;
    mock.upsert(upsert_completed(), 1).await;
    mock.search(scenario_hits(), 1).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let report = runner.run(&scenario_config()).await.unwrap();

    assert_eq!(report.collection_outcome, CollectionOutcome::AlreadyExisted);
}

#[tokio::test]
async fn test_recreate_deletes_then_creates() {
    let mock = QdrantMock::start().await;
    mock.exists(true, 1).await;
    mock.info(8, "Dot", 0).await;
    mock.delete(1).await;
    mock.create(ok(json!(true)), 1).await;
    mock.upsert(upsert_completed(), 1).await;
    mock.search(scenario_hits(), 1).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let config = scenario_config().with_policy(CollectionPolicy::Recreate);
    let report = runner.run(&config).await.unwrap();

    assert_eq!(report.collection_outcome, CollectionOutcome::Recreated);
}

#[tokio::test]
async fn test_cleanup_deletes_after_search() {
    let mock = QdrantMock::start().await;
    mock.fresh_collection().await;
    mock.delete(1).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let report = runner
        .run(&scenario_config().with_cleanup(true))
        .await
        .unwrap();

    assert!(report.cleaned_up);
}

#[tokio::test]
async fn test_out_of_order_hits_are_resorted() {
    let mock = QdrantMock::start().await;
    mock.exists(false, 1).await;
    mock.create(ok(json!(true)), 1).await;
    mock.upsert(upsert_completed(), 1).await;
    mock.search(
        json!([
            { "id": 1, "score": 0.63 },
            { "id": 2, "score": 0.93 }
        ]),
        1,
    )
    .await;

    let runner = SmokeTestRunner::new(mock.connector());
    let report = runner.run(&scenario_config()).await.unwrap();

    let ids: Vec<PointId> = report.results.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![PointId::Num(2), PointId::Num(1)]);
    assert!(report.results[0].payload.is_none());
}

#[tokio::test]
async fn test_upsert_into_vanished_collection_is_remote_error() {
    let mock = QdrantMock::start().await;
    mock.exists(true, 1).await;
    mock.info(4, "Cosine", 1).await;
    mock.upsert(
        error(
            404,
            &format!("Not found: Collection `{}` doesn't exist!", COLLECTION),
        ),
        1,
    )
    .await;
    mock.search(scenario_hits(), 0).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let err = runner.run(&scenario_config()).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Client(ClientError::Remote(RemoteError::NotFound(_)))
    ));
    assert_eq!(err.kind(), "RemoteError");
}

#[tokio::test]
async fn test_rejected_credential_is_connection_error() {
    let mock = QdrantMock::start().await;
    Mock::given(any())
        .respond_with(error(403, "Forbidden: invalid api key"))
        .expect(1)
        .mount(&mock.server)
        .await;

    let runner = SmokeTestRunner::new(mock.connector());
    let err = runner.run(&scenario_config()).await.unwrap_err();

    assert_eq!(err.kind(), "ConnectionError");
}

#[tokio::test]
async fn test_invalid_batch_never_reaches_the_server() {
    let mock = QdrantMock::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock.server)
        .await;

    let mut config = scenario_config();
    config.points.push(Point::new(3, vec![0.1, 0.2, 0.3]));

    let runner = SmokeTestRunner::new(mock.connector());
    let err = runner.run(&config).await.unwrap_err();

    assert_eq!(err.kind(), "RequestError");
}

#[tokio::test]
async fn test_check_on_empty_server() {
    let mock = QdrantMock::start().await;
    mock.list(&[], 1).await;
    mock.exists(false, 1).await;
    mock.info(4, "Cosine", 0).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let report = runner.probe(COLLECTION).await.unwrap();

    assert!(!report.exists);
    assert!(report.collections.is_empty());
    assert_eq!(report.info, None);
}

#[tokio::test]
async fn test_probe_reports_parameters() {
    let mock = QdrantMock::start().await;
    mock.list(&["zoo", COLLECTION], 1).await;
    mock.exists(true, 1).await;
    mock.info(4, "Euclid", 1).await;

    let runner = SmokeTestRunner::new(mock.connector());
    let probe = runner.probe(COLLECTION).await.unwrap();

    assert!(probe.exists);
    assert_eq!(probe.endpoint, mock.uri());
    assert_eq!(
        probe.collections,
        vec![COLLECTION.to_string(), "zoo".to_string()]
    );
    assert_eq!(
        probe.info.map(|i| i.to_string()),
        Some("dimension=4 distance=euclidean".to_string())
    );
}
