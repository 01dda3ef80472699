//! Error types for the plainlegal library.
//!
//! Three error types reflect three distinct failure domains:
//!
//! * [`PipelineError`]: one pipeline invocation failed. Every variant is
//!   terminal: nothing is retried inside the library. The variant's
//!   [`ErrorKind`] is what the HTTP layer maps to an outward status.
//!
//! * [`ConfigError`]: the service cannot be constructed at all
//!   (missing API key, zero timeout).
//!
//! * [`crate::identity::IdentityError`]: the caller could not be
//!   identified; lives next to the identity gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Extra guidance attached to [`PipelineError::UpstreamRateLimited`].
pub const QUOTA_HINT: &str =
    "You have exceeded the free tier limits. The service will reset shortly.";

/// Stable, serialisable classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    ExtractionFailed,
    EmptyContent,
    UpstreamTimeout,
    UpstreamBadRequest,
    UpstreamForbidden,
    UpstreamRateLimited,
    UpstreamNotFound,
    UpstreamMalformedResponse,
    UpstreamUnknown,
}

impl ErrorKind {
    /// True for every kind produced by the simplification client.
    pub fn is_upstream(self) -> bool {
        matches!(
            self,
            ErrorKind::UpstreamTimeout
                | ErrorKind::UpstreamBadRequest
                | ErrorKind::UpstreamForbidden
                | ErrorKind::UpstreamRateLimited
                | ErrorKind::UpstreamNotFound
                | ErrorKind::UpstreamMalformedResponse
                | ErrorKind::UpstreamUnknown
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::ExtractionFailed => "extraction_failed",
            ErrorKind::EmptyContent => "empty_content",
            ErrorKind::UpstreamTimeout => "upstream_timeout",
            ErrorKind::UpstreamBadRequest => "upstream_bad_request",
            ErrorKind::UpstreamForbidden => "upstream_forbidden",
            ErrorKind::UpstreamRateLimited => "upstream_rate_limited",
            ErrorKind::UpstreamNotFound => "upstream_not_found",
            ErrorKind::UpstreamMalformedResponse => "upstream_malformed_response",
            ErrorKind::UpstreamUnknown => "upstream_unknown",
        };
        f.write_str(s)
    }
}

/// Why the upload gate refused a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRejection {
    /// The request carried no file part.
    MissingFile,
    /// The declared content type was absent or not `application/pdf`.
    UnsupportedType { declared: Option<String> },
    /// The body crossed the configured ceiling while streaming.
    TooLarge { limit: usize },
    /// The transfer broke off or the multipart framing was invalid.
    Malformed { detail: String },
}

impl fmt::Display for InputRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRejection::MissingFile => f.write_str("missing file"),
            InputRejection::UnsupportedType { .. } => f.write_str("unsupported type"),
            InputRejection::TooLarge { .. } => f.write_str("too large"),
            InputRejection::Malformed { .. } => f.write_str("malformed upload"),
        }
    }
}

/// Terminal failure of a single pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    // ── Upload gate ───────────────────────────────────────────────────────
    #[error("Invalid input: {0}")]
    InvalidInput(InputRejection),

    // ── Text extraction ───────────────────────────────────────────────────
    /// The PDF parser rejected the document.
    #[error("PDF text extraction failed: {detail}")]
    ExtractionFailed { detail: String },

    /// The PDF parsed but carries no text layer (likely scanned images).
    #[error("No text content found in the PDF")]
    EmptyContent,

    // ── Upstream service ──────────────────────────────────────────────────
    #[error("Upstream call timed out after {secs}s")]
    UpstreamTimeout { secs: u64 },

    #[error("Upstream rejected the request (400): {detail}")]
    UpstreamBadRequest { detail: String },

    #[error("Upstream denied access (403): {detail}")]
    UpstreamForbidden { detail: String },

    /// HTTP 429. [`PipelineError::hint`] returns [`QUOTA_HINT`].
    #[error("Upstream quota exceeded (429): {detail}")]
    UpstreamRateLimited { detail: String },

    #[error("Upstream model or endpoint not found (404): {detail}")]
    UpstreamNotFound { detail: String },

    /// A 2xx response whose body lacked a usable candidate.
    #[error("Upstream response was malformed: {detail}")]
    UpstreamMalformedResponse { detail: String },

    #[error("Upstream call failed: {detail}")]
    UpstreamUnknown { detail: String },
}

impl PipelineError {
    pub fn missing_file() -> Self {
        PipelineError::InvalidInput(InputRejection::MissingFile)
    }

    pub fn unsupported_type(declared: Option<&str>) -> Self {
        PipelineError::InvalidInput(InputRejection::UnsupportedType {
            declared: declared.map(str::to_string),
        })
    }

    pub fn too_large(limit: usize) -> Self {
        PipelineError::InvalidInput(InputRejection::TooLarge { limit })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            PipelineError::EmptyContent => ErrorKind::EmptyContent,
            PipelineError::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            PipelineError::UpstreamBadRequest { .. } => ErrorKind::UpstreamBadRequest,
            PipelineError::UpstreamForbidden { .. } => ErrorKind::UpstreamForbidden,
            PipelineError::UpstreamRateLimited { .. } => ErrorKind::UpstreamRateLimited,
            PipelineError::UpstreamNotFound { .. } => ErrorKind::UpstreamNotFound,
            PipelineError::UpstreamMalformedResponse { .. } => {
                ErrorKind::UpstreamMalformedResponse
            }
            PipelineError::UpstreamUnknown { .. } => ErrorKind::UpstreamUnknown,
        }
    }

    /// Human-readable detail, if the variant carries one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            PipelineError::ExtractionFailed { detail }
            | PipelineError::UpstreamBadRequest { detail }
            | PipelineError::UpstreamForbidden { detail }
            | PipelineError::UpstreamRateLimited { detail }
            | PipelineError::UpstreamNotFound { detail }
            | PipelineError::UpstreamMalformedResponse { detail }
            | PipelineError::UpstreamUnknown { detail }
            | PipelineError::InvalidInput(InputRejection::Malformed { detail }) => Some(detail),
            PipelineError::InvalidInput(_)
            | PipelineError::EmptyContent
            | PipelineError::UpstreamTimeout { .. } => None,
        }
    }

    /// Follow-up advice for the caller. Only rate limiting carries one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PipelineError::UpstreamRateLimited { .. } => Some(QUOTA_HINT),
            _ => None,
        }
    }
}

/// Service construction failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Generative API key is not configured.\nSet GEMINI_API_KEY or pass --api-key.")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A `PLAINLEGAL_TOKENS` entry could not be parsed.
    #[error("Invalid token table entry '{entry}': {reason}")]
    InvalidTokenEntry { entry: String, reason: String },
}
