use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use phish_rs::config::TrainingConfig;
use phish_rs::{dataset, ApiServer, FusionPolicy, ScanHistory, Scorer, Trainer};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Test helper: train on the bootstrap set and load the saved artifact
fn trained_scorer(dir: &TempDir) -> Scorer {
    let path = dir.path().join("phishing_model.json");
    let config = TrainingConfig::default();
    Trainer::new(&config)
        .train_and_save(&dataset::synthetic(config.seed), &path)
        .unwrap();
    Scorer::load(&path, FusionPolicy::default()).unwrap()
}

async fn history() -> ScanHistory {
    let history = ScanHistory::connect("sqlite::memory:").await.unwrap();
    history.init_db().await.unwrap();
    history
}

fn router(scorer: Scorer, history: Option<ScanHistory>) -> Router {
    ApiServer::new(scorer, history, 100, "127.0.0.1:0".to_string()).router()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn predict(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), None);

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ML Service Running");

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn test_health_without_model_is_degraded() {
    let app = router(Scorer::unavailable(FusionPolicy::default()), None);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_predict_raw_ip_url() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), None);

    let (status, body) = send(
        &app,
        predict(json!({"text": "http://192.168.1.100/admin/login", "type": "url"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_phishing"], true);
    assert!(body["confidence"].as_f64().unwrap() >= 0.85);
    assert_eq!(body["features"]["has_ip"], true);
    assert_eq!(body["features"]["num_dots"], 3);
    assert_eq!(body["features"]["has_https"], false);
    assert_eq!(body["features"]["length"], 32);
    assert_eq!(body["features"]["suspicious_keywords"], json!(["login"]));
}

#[tokio::test]
async fn test_predict_email_has_no_url_features() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), None);

    let (status, body) = send(
        &app,
        predict(json!({"text": "Hi team, reminder about meeting tomorrow", "type": "email"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"]["keyword_count"], 0);
    assert!(body["features"].get("has_ip").is_none());
    let confidence = body["confidence"].as_f64().unwrap();
    assert_eq!(body["is_phishing"], confidence > 0.5);
}

#[tokio::test]
async fn test_predict_empty_text_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), None);

    let (status, body) = send(&app, predict(json!({"text": "", "type": "url"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"]["length"], 0);
}

#[tokio::test]
async fn test_predict_malformed_input() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), None);

    for body in [
        json!({"type": "url"}),
        json!({"text": "hello"}),
        json!({"text": "hello", "type": "sms"}),
        json!({"text": 42, "type": "url"}),
    ] {
        let (status, response) = send(&app, predict(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].is_string());
    }

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(r#"{"text":"a","type":"url"}"#))
        .unwrap();
    let (status, _) = send(&app, no_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_without_model_is_unavailable() {
    let app = router(Scorer::unavailable(FusionPolicy::default()), None);

    let (status, body) = send(
        &app,
        predict(json!({"text": "http://192.168.1.100/admin/login", "type": "url"})),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["error"],
        "Model not loaded. Please train the model first."
    );
}

#[tokio::test]
async fn test_history_and_analytics() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), Some(history().await));

    send(
        &app,
        predict(json!({"text": "http://10.0.0.1/secure/bank", "type": "url"})),
    )
    .await;
    send(
        &app,
        predict(json!({"text": "Lunch at noon?", "type": "email"})),
    )
    .await;

    let (status, body) = send(&app, get("/history?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    let scans = body["scans"].as_array().unwrap();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0]["content"], "Lunch at noon?");
    assert_eq!(scans[0]["input_type"], "email");

    let (status, body) = send(&app, get("/analytics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_scans"], 2);
    let phishing = body["phishing_count"].as_i64().unwrap();
    let legitimate = body["legitimate_count"].as_i64().unwrap();
    assert_eq!(phishing + legitimate, 2);
    // Raw-IP URL is always phishing
    assert!(phishing >= 1);
    assert_eq!(body["recent_scans"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_disabled_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), None);

    send(
        &app,
        predict(json!({"text": "http://10.0.0.1/secure/bank", "type": "url"})),
    )
    .await;

    let (status, body) = send(&app, get("/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["scans"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, get("/analytics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_scans"], 0);
}

#[tokio::test]
async fn test_unavailable_scans_are_not_recorded() {
    let app = router(
        Scorer::unavailable(FusionPolicy::default()),
        Some(history().await),
    );

    let (status, _) = send(&app, predict(json!({"text": "x", "type": "email"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (_, body) = send(&app, get("/analytics")).await;
    assert_eq!(body["total_scans"], 0);
}

#[tokio::test]
async fn test_clear_history() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(trained_scorer(&dir), Some(history().await));

    send(&app, predict(json!({"text": "Lunch at noon?", "type": "email"}))).await;
    send(&app, predict(json!({"text": "https://github.com", "type": "url"}))).await;

    let delete = Request::builder()
        .method("DELETE")
        .uri("/history")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);

    let (_, body) = send(&app, get("/history")).await;
    assert!(body["scans"].as_array().unwrap().is_empty());
    let (_, body) = send(&app, get("/analytics")).await;
    assert_eq!(body["total_scans"], 0);
}
