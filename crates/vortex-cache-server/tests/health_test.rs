mod helpers;

use axum::http::StatusCode;
use helpers::test_app;
use serde_json::Value;

#[tokio::test]
async fn health_check_returns_200_when_store_is_ready() {
    let app = test_app();

    let response = app.client.get("/health").await;

    response.assert_status(StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json["status"], "UP");
    assert_eq!(json["store"], "memory");
}

#[tokio::test]
async fn health_check_returns_json() {
    let app = test_app();

    let response = app.client.get("/health").await;

    let content_type = response.header("content-type").unwrap();
    assert!(content_type.contains("application/json"));
}

#[tokio::test]
async fn health_check_returns_503_when_store_is_down() {
    let app = test_app();
    app.store.set_ready(false);

    let response = app.client.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = response.json();
    assert_eq!(json["status"], "DOWN");
}

#[tokio::test]
async fn health_check_recovers() {
    let app = test_app();
    app.store.set_ready(false);
    app.client
        .get("/health")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    app.store.set_ready(true);
    app.client.get("/health").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = test_app();

    app.client
        .get("/nope")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_endpoint_renders_text() {
    let app = test_app();

    let response = app.client.get("/metrics").await;

    response.assert_status(StatusCode::OK);
    assert!(
        response
            .header("content-type")
            .unwrap()
            .starts_with("text/plain; version=0.0.4")
    );
    // sin recorder global el render puede estar vacio, pero siempre es texto
    let _ = response.text();
}
