use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use careassist_geo::{GeoapifyClient, ProximitySettings};
use careassist_llm::ChatClient;
use careassist_report::{ReportError, ReportMailer};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

#[async_trait]
impl ReportMailer for RecordingMailer {
    async fn send_report(&self, recipient: &str, pdf: Vec<u8>) -> Result<(), ReportError> {
        if self.fail {
            return Err(ReportError::Pdf("relay refused".to_string()));
        }
        self.sent
            .lock()
            .expect("mailer lock")
            .push((recipient.to_string(), pdf));
        Ok(())
    }
}

fn test_state(base_url: &str, mailer: Arc<RecordingMailer>) -> AppState {
    AppState {
        chat: Arc::new(
            ChatClient::with_base_url("groq-key", "llama3-70b-8192", 5, base_url)
                .expect("chat client"),
        ),
        geo: GeoapifyClient::with_base_url("geo-key", 5, "careassist-test", base_url)
            .expect("geo client"),
        proximity: Arc::new(ProximitySettings::default()),
        mailer,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.expect("request should complete");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, headers, body.to_vec())
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("body should be JSON")
}

fn ready_session() -> Value {
    json!({
        "theme": "dark",
        "assessment": "Likely a common cold. Rest and drink fluids.",
        "report_ready": true
    })
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("no_facilities", StatusCode::NOT_FOUND),
        ("conflict", StatusCode::CONFLICT),
        ("address_unresolved", StatusCode::UNPROCESSABLE_ENTITY),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("upstream_timeout", StatusCode::GATEWAY_TIMEOUT),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, expected) in cases {
        let response = ApiError::new("req-1", code, "msg").into_response();
        assert_eq!(response.status(), expected, "code {code}");
    }
}

#[tokio::test]
async fn health_echoes_request_id() {
    let server = MockServer::start().await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let request = Request::builder()
        .uri("/api/v1/health")
        .header(REQUEST_ID_HEADER, "req-abc")
        .body(Body::empty())
        .expect("request");
    let (status, headers, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[REQUEST_ID_HEADER], "req-abc");
    let json = json_body(&body);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-abc");
}

#[tokio::test]
async fn index_serves_html() {
    let server = MockServer::start().await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, headers, body) = send(app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(String::from_utf8_lossy(&body).contains("Healthcare Assistant"));
}

#[tokio::test]
async fn theme_toggle_flips_posted_session() {
    let server = MockServer::start().await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(
        app,
        post_json("/api/v1/session/theme", &json!({ "session": { "theme": "dark" } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["data"]["session"]["theme"], "light");
}

#[tokio::test]
async fn analyze_records_assessment_and_resets_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Possible flu." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(
        app,
        post_json(
            "/api/v1/analyze",
            &json!({ "session": ready_session(), "symptoms": "fever and aches" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["data"]["assessment"], "Possible flu.");
    assert_eq!(json["data"]["model"], "llama3-70b-8192");
    assert_eq!(json["data"]["session"]["assessment"], "Possible flu.");
    assert_eq!(json["data"]["session"]["report_ready"], false);
}

#[tokio::test]
async fn analyze_blank_symptoms_is_validation_error_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(
        app,
        post_json("/api/v1/analyze", &json!({ "symptoms": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json = json_body(&body);
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["message"], "Please describe your symptoms.");
}

#[tokio::test]
async fn analyze_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(
        app,
        post_json("/api/v1/analyze", &json!({ "symptoms": "headache" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(&body)["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn report_returns_pdf_attachment() {
    let server = MockServer::start().await;
    let app = build_app(test_state(&server.uri(), Arc::default()));
    let session = json!({ "assessment": "Drink water and rest." });

    let (status, headers, body) =
        send(app, post_json("/api/v1/report", &json!({ "session": session }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"healthcare_report.pdf\""
    );
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn report_without_assessment_is_conflict() {
    let server = MockServer::start().await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) =
        send(app, post_json("/api/v1/report", &json!({ "session": {} }))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json_body(&body)["error"]["code"], "conflict");
}

#[tokio::test]
async fn email_sends_pdf_to_trimmed_recipient() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer::default());
    let app = build_app(test_state(&server.uri(), Arc::clone(&mailer)));

    let (status, _, body) = send(
        app,
        post_json(
            "/api/v1/report/email",
            &json!({ "session": ready_session(), "email": " patient@example.com " }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json = json_body(&body);
    assert_eq!(json["data"]["recipient"], "patient@example.com");
    assert_eq!(json["data"]["sent"], true);

    let sent = mailer.sent.lock().expect("mailer lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "patient@example.com");
    assert!(sent[0].1.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn email_requires_generated_report() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer::default());
    let app = build_app(test_state(&server.uri(), Arc::clone(&mailer)));
    let session = json!({ "assessment": "Rest.", "report_ready": false });

    let (status, _, body) = send(
        app,
        post_json(
            "/api/v1/report/email",
            &json!({ "session": session, "email": "patient@example.com" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json_body(&body)["error"]["code"], "conflict");
    assert!(mailer.sent.lock().expect("mailer lock").is_empty());
}

#[tokio::test]
async fn email_blank_address_is_validation_error() {
    let server = MockServer::start().await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(
        app,
        post_json(
            "/api/v1/report/email",
            &json!({ "session": ready_session(), "email": "  " }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["code"], "validation_error");
}

#[tokio::test]
async fn email_delivery_failure_is_internal_error() {
    let server = MockServer::start().await;
    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..RecordingMailer::default()
    });
    let app = build_app(test_state(&server.uri(), mailer));

    let (status, _, _) = send(
        app,
        post_json(
            "/api/v1/report/email",
            &json!({ "session": ready_session(), "email": "patient@example.com" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

async fn mount_geocode(server: &MockServer, features: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/geocode/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": features })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn hospitals_returns_rows_with_partial_flag() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        json!([{ "properties": { "lat": 31.5497, "lon": 74.3436 } }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [
                { "properties": { "name": "Mayo Hospital", "formatted": "Anarkali, Lahore", "lat": 31.57, "lon": 74.31 } },
                { "properties": { "lat": 31.52, "lon": 74.35 } }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/routing"))
        .and(query_param("waypoints", "31.5497,74.3436|31.57,74.31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [{ "properties": { "distance": 5000.0 } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/routing"))
        .and(query_param("waypoints", "31.5497,74.3436|31.52,74.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
        .mount(&server)
        .await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(app, get("/api/v1/hospitals?location=Lahore%2C%20Pakistan")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json_body(&body)["data"];
    assert_eq!(data["location"], "Lahore, Pakistan");
    assert_eq!(data["partial"], true);
    assert_eq!(data["unavailable_count"], 1);
    let rows = data["facilities"].as_array().expect("facilities array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Mayo Hospital");
    assert_eq!(rows[0]["distance"]["status"], "kilometers");
    assert_eq!(rows[0]["distance"]["km"], 5.0);
    assert_eq!(rows[1]["name"], "Unknown");
    assert_eq!(rows[1]["address"], "No address available");
    assert_eq!(rows[1]["distance"]["status"], "unavailable");
}

#[tokio::test]
async fn hospitals_unresolved_address_is_unprocessable() {
    let server = MockServer::start().await;
    mount_geocode(&server, json!([])).await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(app, get("/api/v1/hospitals?location=nowhere")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(&body);
    assert_eq!(json["error"]["code"], "address_unresolved");
    assert_eq!(
        json["error"]["message"],
        "Invalid address or geocoding failed. Try a different location."
    );
}

#[tokio::test]
async fn hospitals_with_no_results_is_not_found() {
    let server = MockServer::start().await;
    mount_geocode(&server, json!([{ "properties": { "lat": 10.0, "lon": 20.0 } }])).await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
        .mount(&server)
        .await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(app, get("/api/v1/hospitals?location=desert")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body)["error"]["code"], "no_facilities");
}

#[tokio::test]
async fn hospitals_with_every_route_is_not_partial() {
    let server = MockServer::start().await;
    mount_geocode(&server, json!([{ "properties": { "lat": 31.5497, "lon": 74.3436 } }])).await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [
                { "properties": { "name": "Mayo Hospital", "lat": 31.57, "lon": 74.31 } },
                { "properties": { "name": "Services Hospital", "lat": 31.54, "lon": 74.33 } }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/routing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [{ "properties": { "distance": 3000.0 } }]
        })))
        .mount(&server)
        .await;
    let app = build_app(test_state(&server.uri(), Arc::default()));

    let (status, _, body) = send(app, get("/api/v1/hospitals?location=Lahore")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json_body(&body)["data"];
    assert_eq!(data["partial"], false);
    assert_eq!(data["unavailable_count"], 0);
    assert_eq!(data["message"], "Found 2 nearby hospitals.");
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn email_logs_do_not_contain_recipient() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = MockServer::start().await;
    let app = build_app(test_state(&server.uri(), Arc::default()));
    let (status, _, _) = send(
        app,
        post_json(
            "/api/v1/report/email",
            &json!({ "session": ready_session(), "email": "patient@example.com" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let output = String::from_utf8(logs.0.lock().expect("log lock").clone()).unwrap();
    assert!(output.contains("report emailed"), "logs: {output}");
    assert!(!output.contains("patient@example.com"), "logs: {output}");
}
