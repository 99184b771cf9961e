use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use botica_api::build_router;
use botica_api::state::AppState;
use botica_bedrock::error::ProviderError;
use botica_bedrock::provider::{ModelProvider, ProviderOutput, ProviderRequest};
use botica_bedrock::recommend::{GenerationSettings, RecommendationClient};
use botica_storage::store::RecommendationStore;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

enum Reply {
    Text(String),
    Fail(fn() -> ProviderError),
    Slow,
}

struct MockProvider {
    reply: Reply,
    calls: AtomicUsize,
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn complete(&self, _request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Text(text) => Ok(ProviderOutput {
                text: text.clone(),
                usage: None,
            }),
            Reply::Fail(make) => Err(make()),
            Reply::Slow => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(ProviderOutput::default())
            }
        }
    }
}

struct TestApp {
    router: Router,
    store: RecommendationStore,
    provider: Arc<MockProvider>,
    user_id: i64,
}

fn app(reply: Reply) -> TestApp {
    let store = RecommendationStore::open_in_memory().unwrap();
    let user = store.create_user("qf.rojas", "Lucía Rojas").unwrap();
    let provider = Arc::new(MockProvider {
        reply,
        calls: AtomicUsize::new(0),
    });
    let settings = GenerationSettings {
        timeout: Duration::from_millis(50),
        ..GenerationSettings::default()
    };
    let state = AppState {
        store: store.clone(),
        recommender: Arc::new(RecommendationClient::new(provider.clone(), settings)),
        exports: None,
    };
    TestApp {
        router: build_router(state),
        store,
        provider,
        user_id: user.id,
    }
}

fn replying(body: Value) -> TestApp {
    app(Reply::Text(body.to_string()))
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, body).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn send_raw(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, bytes)
}

fn fever_intake() -> Value {
    json!({
        "age": 25,
        "sex": "masculino",
        "weight": 70,
        "symptoms": "fiebre, dolor de cabeza",
        "allergies": null,
        "preexisting_diseases": null,
        "pregnancy": null,
        "current_medication": null,
        "duration_days": 2,
        "severity": "leve"
    })
}

fn paracetamol_response() -> Value {
    json!({
        "recommendations": [{
            "medication": "paracetamol",
            "form": "tableta",
            "via": "oral",
            "amount_value": 500,
            "amount_unit": "mg",
            "every_hour": 8,
            "duration_days": 3,
            "moment": "después de las comidas",
            "instructions": "tomar con un vaso de agua",
            "warnings": []
        }],
        "reason": null
    })
}

fn persist_body(user_id: i64, result: Value) -> Value {
    json!({
        "userId": user_id,
        "form": {
            "idNumber": "12345678",
            "fullName": "Ana Quispe",
            "idType": "DNI",
            "age": "25",
            "gender": "masculino",
            "weight": "70",
            "symptoms": "fiebre, dolor de cabeza",
            "allergies": "",
            "diseases": "",
            "pregnancy": null,
            "currentMedication": null,
            "symptomDuration": "2",
            "severity": "leve"
        },
        "recommendationResult": result
    })
}

#[tokio::test]
async fn health_is_ok() {
    let app = replying(paracetamol_response());
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn generate_then_persist_paracetamol_case() {
    let app = replying(paracetamol_response());

    let (status, headers, bytes) =
        send_raw(&app, "POST", "/recommendations/generate", Some(fever_intake())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("x-generation-id"));
    let generated: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(generated["recommendations"][0]["medication"], "paracetamol");
    assert_eq!(generated["reason"], Value::Null);

    let (status, stored) = send(
        &app,
        "POST",
        "/recommendations",
        Some(persist_body(app.user_id, generated)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored["medications"].as_array().unwrap().len(), 1);
    assert_eq!(stored["medications"][0]["medication"], "paracetamol");
    assert_eq!(stored["patient"]["identificationNumber"], "12345678");
    assert_eq!(stored["evaluation"]["symptoms"], json!(["fiebre", "dolor de cabeza"]));

    let id = stored["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/recommendations/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, stored);

    let (_, by_user) = send(
        &app,
        "GET",
        &format!("/recommendations?userId={}", app.user_id),
        None,
    )
    .await;
    assert_eq!(by_user.as_array().unwrap().len(), 1);

    let (_, by_dni) = send(&app, "GET", "/recommendations?dni=12345678", None).await;
    assert_eq!(by_dni[0]["id"], id);
}

#[tokio::test]
async fn invalid_intake_is_rejected_without_calling_model() {
    let app = replying(paracetamol_response());
    let mut intake = fever_intake();
    intake["age"] = json!(-4);
    intake["sex"] = json!("x");

    let (status, body) = send(&app, "POST", "/recommendations/generate", Some(intake)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("age").is_some());
    assert!(body["details"].get("sex").is_some());
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let app = replying(paracetamol_response());
    let req = Request::builder()
        .method("POST")
        .uri("/recommendations/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_json_model_output_is_bad_gateway_with_raw() {
    let app = app(Reply::Text("Recomiendo paracetamol".to_string()));
    let (status, body) = send(&app, "POST", "/recommendations/generate", Some(fever_intake())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["raw"], "Recomiendo paracetamol");
}

#[tokio::test]
async fn range_dosage_is_bad_gateway_and_nothing_is_persisted() {
    let mut output = paracetamol_response();
    output["recommendations"][0]["amount_unit"] = json!("200-400mg");
    let app = replying(output);

    let (status, body) = send(&app, "POST", "/recommendations/generate", Some(fever_intake())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["details"].get("recommendations[0].amount_unit").is_some());

    assert!(app.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn provider_failure_reports_status() {
    let app = app(Reply::Fail(|| ProviderError::Upstream {
        status: Some(429),
        body: "ThrottlingException".to_string(),
    }));
    let (status, body) = send(&app, "POST", "/recommendations/generate", Some(fever_intake())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 429);
    assert_eq!(body["details"], "ThrottlingException");
}

#[tokio::test]
async fn missing_credentials_is_internal_error() {
    let app = app(Reply::Fail(|| {
        ProviderError::MissingCredentials("no credentials".to_string())
    }));
    let (status, body) = send(&app, "POST", "/recommendations/generate", Some(fever_intake())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn request_build_failure_is_generic_internal_error() {
    let app = app(Reply::Fail(|| {
        ProviderError::InvalidRequest("tool name is required".to_string())
    }));
    let (status, body) = send(&app, "POST", "/recommendations/generate", Some(fever_intake())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
}

#[tokio::test]
async fn slow_model_is_gateway_timeout() {
    let app = app(Reply::Slow);
    let (status, _) = send(&app, "POST", "/recommendations/generate", Some(fever_intake())).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn persist_lists_every_missing_field() {
    let app = replying(paracetamol_response());
    let (status, body) = send(&app, "POST", "/recommendations", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = &body["details"];
    assert!(details.get("userId").is_some());
    assert!(details.get("form").is_some());
    assert!(details.get("recommendationResult").is_some());
}

#[tokio::test]
async fn persist_rejects_short_dni() {
    let app = replying(paracetamol_response());
    let mut body = persist_body(app.user_id, paracetamol_response());
    body["form"]["idNumber"] = json!("1234567");

    let (status, response) = send(&app, "POST", "/recommendations", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["details"].get("form.idNumber").is_some());
    assert!(app.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn persist_accepts_ruc() {
    let app = replying(paracetamol_response());
    let mut body = persist_body(app.user_id, paracetamol_response());
    body["form"]["idNumber"] = json!("20123456789");
    body["form"]["idType"] = json!("RUC");

    let (status, stored) = send(&app, "POST", "/recommendations", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored["patient"]["identificationTypeId"], 2);
}

#[tokio::test]
async fn persist_accepts_numeric_id_number() {
    let app = replying(paracetamol_response());
    let mut body = persist_body(app.user_id, paracetamol_response());
    body["form"]["idNumber"] = json!(12345678);

    let (status, stored) = send(&app, "POST", "/recommendations", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(stored["patient"]["identificationNumber"], "12345678");
}

#[tokio::test]
async fn persist_rejects_invalid_result() {
    let app = replying(paracetamol_response());
    let mut result = paracetamol_response();
    result["reason"] = json!("derivar");

    let (status, _) = send(
        &app,
        "POST",
        "/recommendations",
        Some(persist_body(app.user_id, result)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn persist_for_unknown_user_is_not_found() {
    let app = replying(paracetamol_response());
    let (status, _) = send(
        &app,
        "POST",
        "/recommendations",
        Some(persist_body(app.user_id + 50, paracetamol_response())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn query_prefers_id_over_user() {
    let app = replying(paracetamol_response());
    let mut ids = Vec::new();
    for _ in 0..5 {
        let (_, stored) = send(
            &app,
            "POST",
            "/recommendations",
            Some(persist_body(app.user_id, paracetamol_response())),
        )
        .await;
        ids.push(stored["id"].as_i64().unwrap());
    }

    let uri = format!("/recommendations?id={}&userId={}", ids[2], app.user_id);
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_object());
    assert_eq!(body["id"], ids[2]);

    let (_, all) = send(&app, "GET", "/recommendations", None).await;
    let listed: Vec<i64> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    let mut newest_first = ids.clone();
    newest_first.reverse();
    assert_eq!(listed, newest_first);
}

#[tokio::test]
async fn query_validates_ids() {
    let app = replying(paracetamol_response());
    let (status, _) = send(&app, "GET", "/recommendations?id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/recommendations?userId=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/recommendations?id=999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/recommendations/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn export_returns_document_bytes() {
    let app = replying(paracetamol_response());
    let (_, stored) = send(
        &app,
        "POST",
        "/recommendations",
        Some(persist_body(app.user_id, paracetamol_response())),
    )
    .await;
    let id = stored["id"].as_i64().unwrap();
    let uri = format!("/recommendations/{id}/export");

    let (status, headers, bytes) =
        send_raw(&app, "POST", &uri, Some(json!({ "format": "text" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/markdown"));
    assert!(String::from_utf8(bytes).unwrap().contains("paracetamol"));
    assert!(!headers.contains_key("x-export-key"));

    let (status, headers, bytes) =
        send_raw(&app, "POST", &uri, Some(json!({ "format": "docx" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains(".docx")
    );
    assert_eq!(&bytes[..2], b"PK");

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "format": "pdf" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
