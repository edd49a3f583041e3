use axum::{extract::State, Extension, Json};
use careassist_core::SessionState;
use careassist_llm::LlmError;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SessionRequest {
    #[serde(default)]
    pub session: SessionState,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    #[serde(default)]
    pub session: SessionState,
    #[serde(default)]
    pub symptoms: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionData {
    pub session: SessionState,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    pub assessment: String,
    pub model: String,
    pub session: SessionState,
}

pub(super) fn map_llm_error(request_id: String, error: &LlmError) -> ApiError {
    match error {
        LlmError::EmptyPrompt => ApiError::new(request_id, "validation_error", error.to_string()),
        LlmError::Timeout => ApiError::new(
            request_id,
            "upstream_timeout",
            "the assistant took too long to respond",
        ),
        _ => {
            tracing::error!(error = %error, "symptom analysis failed");
            ApiError::new(
                request_id,
                "upstream_error",
                "the assistant is unavailable, try again later",
            )
        }
    }
}

pub(super) async fn toggle_theme(
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SessionRequest>,
) -> Json<ApiResponse<SessionData>> {
    let mut session = body.session;
    session.toggle_theme();
    ApiResponse::new(req_id.0, SessionData { session })
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let assessment = careassist_llm::analyze_symptoms(&state.chat, &body.symptoms)
        .await
        .map_err(|e| map_llm_error(req_id.0.clone(), &e))?;

    let mut session = body.session;
    session.record_assessment(assessment.clone());

    Ok(ApiResponse::new(
        req_id.0,
        AnalyzeData {
            assessment,
            model: state.chat.model().to_string(),
            session,
        },
    ))
}
