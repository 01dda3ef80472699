//! Outward error mapping.
//!
//! Every failure leaves the service as exactly one status + JSON body.
//! Internal details (upstream payloads, parser traces) are logged by the
//! pipeline and never copied into a response; only generic processing
//! failures carry a short `error` string.

use crate::error::{InputRejection, PipelineError};
use crate::identity::IdentityError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::types::ErrorResponse;

/// Error returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(IdentityError),
    Pipeline(PipelineError),
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        ApiError::Unauthorized(e)
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Unauthorized(e) => (StatusCode::UNAUTHORIZED, ErrorResponse::message(e.to_string())),
            ApiError::Pipeline(e) => outward(e),
        };
        debug!("Responding {}: {}", status, body.message);
        (status, Json(body)).into_response()
    }
}

/// Status and body for a pipeline failure.
pub fn outward(err: &PipelineError) -> (StatusCode, ErrorResponse) {
    const PROCESSING_FAILED: &str = "Error processing PDF. Please try again.";

    match err {
        PipelineError::InvalidInput(rejection) => {
            let message = match rejection {
                InputRejection::MissingFile => "No PDF file uploaded".to_string(),
                InputRejection::UnsupportedType { .. } => "Only PDF files are allowed".to_string(),
                InputRejection::TooLarge { limit } => {
                    format!("File size too large. Maximum {} allowed.", human_size(*limit))
                }
                InputRejection::Malformed { .. } => {
                    "Malformed upload. Please resend the PDF.".to_string()
                }
            };
            (StatusCode::BAD_REQUEST, ErrorResponse::message(message))
        }
        PipelineError::EmptyContent => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::message("No text content found in the PDF"),
        ),
        PipelineError::ExtractionFailed { detail } | PipelineError::UpstreamUnknown { detail } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::message(PROCESSING_FAILED).with_error(detail.clone()),
        ),
        PipelineError::UpstreamTimeout { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::message("AI service timed out. Please try again later."),
        ),
        PipelineError::UpstreamBadRequest { .. } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::message("Invalid request to AI service. Please check your PDF content."),
        ),
        PipelineError::UpstreamForbidden { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::message("AI service access denied. Please try again later."),
        ),
        PipelineError::UpstreamRateLimited { .. } => {
            let body = ErrorResponse::message(
                "AI service quota exceeded. Please wait a moment and try again, or upgrade your API plan.",
            );
            let body = match err.hint() {
                Some(hint) => body.with_details(hint),
                None => body,
            };
            (StatusCode::TOO_MANY_REQUESTS, body)
        }
        PipelineError::UpstreamNotFound { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::message("AI service model not found. Please contact support."),
        ),
        PipelineError::UpstreamMalformedResponse { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::message("Error processing PDF. Invalid API response."),
        ),
    }
}

/// `10MB` for whole mebibytes, otherwise a byte count.
fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
