//! Integration tests for the HTTP form and JSON endpoints.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cardiorisk_core::error::LoadError;
use cardiorisk_core::gateway::{AppState, SharedState, router};
use cardiorisk_core::model::FixedClassifier;
use cardiorisk_core::{ClassDistribution, Locale, ModelProvider, RiskLabel};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const FORM_BODY: &str = "age=50&sex=Male&cp=0&trestbps=120&chol=200&fbs=No&restecg=0\
&thalach=150&exang=No&oldpeak=1.0&slope=0&ca=0&thal=0";

fn make_state(label: RiskLabel, p0: f64, p1: f64) -> SharedState {
    let provider = ModelProvider::preloaded(Arc::new(FixedClassifier::new(
        label,
        ClassDistribution::new(p0, p1).unwrap(),
    )));
    AppState::new(Arc::new(provider), Locale::En)
        .unwrap()
        .shared()
}

fn missing_model_state() -> SharedState {
    let provider = ModelProvider::unavailable(LoadError::NotFound {
        path: PathBuf::from("heart_disease_model.json"),
    });
    AppState::new(Arc::new(provider), Locale::En)
        .unwrap()
        .shared()
}

async fn send(state: SharedState, request: Request<Body>) -> (StatusCode, String) {
    let app = router(state);
    let resp = ServiceExt::<Request<Body>>::oneshot(app, request)
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn full_body() -> serde_json::Value {
    serde_json::json!({
        "age": 63, "sex": "Female", "cp": 3, "trestbps": 145, "chol": 233,
        "fbs": "Yes", "restecg": 0, "thalach": 150, "exang": "No",
        "oldpeak": 2.3, "slope": 0, "ca": 0, "thal": 1
    })
}

fn error_fields(text: &str) -> Vec<String> {
    let json: serde_json::Value = serde_json::from_str(text).unwrap();
    json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

fn post_json(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// --- /health ---

#[tokio::test]
async fn test_health_reports_model_state() {
    let (status, body) = send(make_state(RiskLabel::Low, 0.9, 0.1), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model_loaded"], true);
    assert_eq!(json["schema_version"], 1);

    let (_, body) = send(missing_model_state(), get("/health")).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["model_loaded"], false);
}

// --- GET / ---

#[tokio::test]
async fn test_form_page_has_no_results_before_submission() {
    let (status, html) = send(make_state(RiskLabel::Low, 0.82, 0.18), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Heart Disease Prediction"));
    assert!(html.contains("name=\"oldpeak\""));
    assert!(!html.contains("class=\"result"));
}

#[tokio::test]
async fn test_form_page_shows_notice_when_model_missing() {
    let (status, html) = send(missing_model_state(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("class=\"notice\""));
    assert!(html.contains("was not found"));
}

// --- POST / ---

#[tokio::test]
async fn test_form_submission_renders_safe_panel() {
    let (status, html) = send(make_state(RiskLabel::Low, 0.82, 0.18), post_form(FORM_BODY)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("class=\"result safe\""));
    assert!(html.contains("82.00%"));
    assert!(html.contains("Good condition"));
}

#[tokio::test]
async fn test_form_rejection_is_422_without_panel() {
    let body = FORM_BODY.replace("age=50", "age=121");
    let (status, html) = send(make_state(RiskLabel::High, 0.1, 0.9), post_form(&body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("age: 121 is outside [1, 120]"));
    assert!(!html.contains("class=\"result"));
}

#[tokio::test]
async fn test_partial_form_is_422_without_panel() {
    let (status, html) = send(make_state(RiskLabel::Low, 0.82, 0.18), post_form("age=70")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(html.contains("thal: missing"));
    assert!(!html.contains("class=\"result"));
}

#[tokio::test]
async fn test_form_submission_with_missing_model_shows_notice_only() {
    let (status, html) = send(missing_model_state(), post_form(FORM_BODY)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("class=\"notice\""));
    assert!(!html.contains("class=\"result"));
}

// --- POST /api/predict ---

#[tokio::test]
async fn test_api_predict_returns_outcome() {
    let (status, text) = send(make_state(RiskLabel::High, 0.35, 0.65), post_json(full_body())).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["label"], 1);
    assert_eq!(json["status"], "At Risk");
    assert_eq!(json["confidence"], 65.0);
    assert_eq!(json["record"]["sex"], 0);
    assert_eq!(json["record"]["fbs"], 1);
    assert_eq!(json["record"]["oldpeak"], 2.3);
}

#[tokio::test]
async fn test_api_predict_rejects_out_of_domain_fields() {
    let mut body = full_body();
    body["ca"] = serde_json::json!(7);
    body["sex"] = serde_json::json!("robot");
    let (status, text) = send(make_state(RiskLabel::Low, 0.9, 0.1), post_json(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = error_fields(&text);
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().any(|f| f == "ca"));
    assert!(fields.iter().any(|f| f == "sex"));
}

#[tokio::test]
async fn test_api_predict_empty_body_reports_every_field() {
    let body = serde_json::json!({});
    let (status, text) = send(make_state(RiskLabel::Low, 0.82, 0.18), post_json(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(json.get("label").is_none());
    let fields = error_fields(&text);
    let expected: Vec<String> = cardiorisk_core::schema::feature_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(fields, expected);
    assert_eq!(json["errors"][0]["message"], "age: missing");
}

#[tokio::test]
async fn test_api_predict_partial_body_is_rejected() {
    let mut body = full_body();
    body.as_object_mut().unwrap().remove("thal");
    let (status, text) = send(make_state(RiskLabel::Low, 0.82, 0.18), post_json(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&text), vec!["thal".to_string()]);
}

#[tokio::test]
async fn test_api_predict_is_503_without_model() {
    let (status, text) = send(missing_model_state(), post_json(full_body())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(json["error"].as_str().unwrap().contains("heart_disease_model.json"));
}
