mod assistant;
mod hospitals;
mod report;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Extension, Json, Router,
};
use careassist_core::{AppConfig, SessionError};
use careassist_geo::{GeoapifyClient, ProximitySettings};
use careassist_llm::ChatClient;
use careassist_report::ReportMailer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Everything a handler needs to reach the outside world. Holds no user state.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatClient>,
    pub geo: GeoapifyClient,
    pub proximity: Arc<ProximitySettings>,
    pub mailer: Arc<dyn ReportMailer>,
}

impl AppState {
    /// Builds the external clients from configuration.
    ///
    /// # Errors
    ///
    /// Fails if any client cannot be constructed (bad base URL, TLS setup,
    /// invalid sender address).
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let chat = ChatClient::with_base_url(
            &config.groq_api_key,
            &config.chat_model,
            config.http_timeout_secs,
            &config.chat_base_url,
        )?;
        let geo = GeoapifyClient::with_base_url(
            &config.geoapify_api_key,
            config.http_timeout_secs,
            &config.user_agent,
            &config.geoapify_base_url,
        )?;
        let mailer = careassist_report::SmtpMailer::new(
            &config.smtp_host,
            config.smtp_port,
            &config.gmail_address,
            &config.gmail_app_password,
            config.http_timeout_secs,
        )?;

        Ok(Self {
            chat: Arc::new(chat),
            geo,
            proximity: Arc::new(ProximitySettings::from_app_config(config)),
            mailer: Arc::new(mailer),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "no_facilities" => StatusCode::NOT_FOUND,
            "conflict" => StatusCode::CONFLICT,
            "address_unresolved" => StatusCode::UNPROCESSABLE_ENTITY,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "upstream_timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_session_error(request_id: String, error: &SessionError) -> ApiError {
    ApiError::new(request_id, "conflict", error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/session/theme", post(assistant::toggle_theme))
        .route("/api/v1/analyze", post(assistant::analyze))
        .route("/api/v1/report", post(report::generate_report))
        .route("/api/v1/report/email", post(report::email_report))
        .route("/api/v1/hospitals", get(hospitals::search_hospitals))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    ApiResponse::new(req_id.0, HealthData { status: "ok" })
}

#[cfg(test)]
mod tests;
