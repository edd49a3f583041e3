use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use careassist_core::SessionState;
use careassist_report::{render_pdf, ReportError, REPORT_FILE_NAME};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{assistant::SessionRequest, map_session_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct EmailRequest {
    #[serde(default)]
    pub session: SessionState,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub(super) struct EmailData {
    pub recipient: String,
    pub sent: bool,
}

fn map_report_error(request_id: String, error: &ReportError) -> ApiError {
    match error {
        ReportError::InvalidAddress { .. } | ReportError::EmptyReport => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        ReportError::Smtp(_) => {
            tracing::error!(error = %error, "report email delivery failed");
            ApiError::new(
                request_id,
                "upstream_error",
                "the email could not be sent, try again later",
            )
        }
        _ => {
            tracing::error!(error = %error, "report rendering failed");
            ApiError::new(request_id, "internal_error", "could not build the report")
        }
    }
}

/// Renders the current assessment as a PDF download.
///
/// A success means the posted session may be marked `report_ready`.
pub(super) async fn generate_report(
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SessionRequest>,
) -> Result<Response, ApiError> {
    let mut session = body.session;
    session
        .mark_report_generated()
        .map_err(|e| map_session_error(req_id.0.clone(), &e))?;
    let text = session
        .require_report()
        .map_err(|e| map_session_error(req_id.0.clone(), &e))?;

    let pdf = render_pdf(text).map_err(|e| map_report_error(req_id.0.clone(), &e))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

pub(super) async fn email_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<EmailRequest>,
) -> Result<Json<ApiResponse<EmailData>>, ApiError> {
    let recipient = body.email.trim().to_string();
    if recipient.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "Please enter an email address.",
        ));
    }

    let text = body
        .session
        .require_report()
        .map_err(|e| map_session_error(req_id.0.clone(), &e))?;
    let pdf = render_pdf(text).map_err(|e| map_report_error(req_id.0.clone(), &e))?;

    state
        .mailer
        .send_report(&recipient, pdf)
        .await
        .map_err(|e| map_report_error(req_id.0.clone(), &e))?;

    tracing::info!("report emailed");
    Ok(ApiResponse::new(
        req_id.0,
        EmailData {
            recipient,
            sent: true,
        },
    ))
}
