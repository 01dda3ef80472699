//! API request and response types.

use crate::identity::{Identity, IdentityGate};
use crate::orchestrator::{Pipeline, SimplificationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Multipart field carrying the PDF.
pub const UPLOAD_FIELD: &str = "pdf";

/// Room for multipart boundaries and part headers on top of the file
/// ceiling when sizing the transport body limit.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared handler state. Cloned per request; both fields are cheap handles.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Pipeline,
    pub identity: Arc<dyn IdentityGate>,
}

impl ApiState {
    pub fn new(pipeline: Pipeline, identity: Arc<dyn IdentityGate>) -> Self {
        Self { pipeline, identity }
    }

    /// Hard limit for the whole request body.
    pub fn body_limit(&self) -> usize {
        self.pipeline.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES
    }
}

/// `200` body for `POST /api/upload-pdf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub original_text: String,
    pub simplified_text: String,
}

impl From<SimplificationResult> for UploadResponse {
    fn from(r: SimplificationResult) -> Self {
        Self {
            message: "PDF processed successfully".to_string(),
            original_text: r.original_text,
            simplified_text: r.simplified_text,
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Short technical detail, only for generic processing failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Follow-up advice, e.g. the quota hint on 429.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
            details: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// `GET /api/dashboard` body.
///
/// Cases are not persisted by this service, so the counters are zero and
/// the activity feed is empty. The shape is what dashboard clients expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: Identity,
    pub stats: DashboardStats,
    pub recent_activity: Vec<serde_json::Value>,
}

impl DashboardResponse {
    pub fn for_user(user: Identity) -> Self {
        Self {
            user,
            stats: DashboardStats::default(),
            recent_activity: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_cases: u64,
    pub pending_cases: u64,
    pub completed_cases: u64,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
