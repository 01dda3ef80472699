//! API request handlers.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        FromRequestParts, Multipart, State,
    },
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use futures::TryStreamExt;
use tracing::{debug, warn};

use crate::error::{InputRejection, PipelineError};
use crate::identity::{bearer_token, Identity, IdentityError};
use crate::pipeline::upload::{TransferError, UploadPart};

use super::{
    error::ApiError,
    types::{ApiState, DashboardResponse, HealthResponse, UploadResponse, UPLOAD_FIELD},
};

/// Extractor that resolves the bearer token to an [`Identity`].
///
/// Runs before the body is touched, so an unauthenticated upload is
/// refused without reading any of it.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl FromRequestParts<ApiState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| IdentityError::InvalidToken)?),
        };
        let token = bearer_token(header)?;
        let identity = state.identity.resolve(token).await.inspect_err(|e| {
            debug!("Bearer token rejected: {}", e);
        })?;
        Ok(Authenticated(identity))
    }
}

/// Upload endpoint handler.
///
/// POST /api/upload-pdf
///
/// Accepts multipart form data with a single `pdf` file field. Other
/// fields are skipped. The part is streamed into the upload gate, which
/// enforces type and size before the extractor or the model see anything.
pub async fn upload_pdf_handler(
    State(state): State<ApiState>,
    Authenticated(identity): Authenticated,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let ceiling = state.pipeline.max_upload_bytes();

    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            // Not a multipart request at all: there is no file part.
            warn!("Upload rejected: {}", rejection);
            return Err(PipelineError::missing_file().into());
        }
    };

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| rejection_for(transfer_error(e), ceiling))?;

        let Some(field) = field else {
            warn!("Upload rejected: no '{}' field in form", UPLOAD_FIELD);
            return Err(PipelineError::missing_file().into());
        };

        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let part = UploadPart {
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            body: Box::pin(field.map_err(transfer_error)),
        };
        let result = state.pipeline.process(Some(part), &identity).await?;
        return Ok(Json(result.into()));
    }
}

/// Profile endpoint handler.
///
/// GET /api/auth/profile
pub async fn profile_handler(Authenticated(identity): Authenticated) -> Json<Identity> {
    Json(identity)
}

/// Dashboard summary for the authenticated caller.
///
/// GET /api/dashboard
pub async fn dashboard_handler(Authenticated(identity): Authenticated) -> Json<DashboardResponse> {
    Json(DashboardResponse::for_user(identity))
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn transfer_error(e: MultipartError) -> TransferError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        TransferError::LimitExceeded
    } else {
        TransferError::Interrupted(e.body_text())
    }
}

/// Failure while locating the file part, before the gate has a body to
/// work on.
fn rejection_for(e: TransferError, ceiling: usize) -> PipelineError {
    warn!("Upload rejected while reading multipart: {:?}", e);
    match e {
        TransferError::LimitExceeded => PipelineError::too_large(ceiling),
        TransferError::Interrupted(detail) => PipelineError::InvalidInput(InputRejection::Malformed { detail }),
    }
}
