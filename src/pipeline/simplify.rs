//! Simplification client: send extracted text to the generative service.
//!
//! This is the only stage with network I/O. It is deliberately narrow:
//! build one request, send it once under a hard deadline, and classify the
//! outcome. Prompt wording lives in [`crate::prompts`]; retry policy, if
//! any, belongs to the caller.
//!
//! ## Outcome classification
//!
//! | Upstream outcome | Result |
//! |------------------|--------|
//! | 2xx with `candidates[0].content.parts[0].text` | `Ok(text)` verbatim |
//! | 2xx without it (or non-JSON) | `UpstreamMalformedResponse` |
//! | 400 / 403 / 404 / 429 | `UpstreamBadRequest` / `Forbidden` / `NotFound` / `RateLimited` |
//! | any other status | `UpstreamUnknown` |
//! | deadline exceeded | `UpstreamTimeout` |
//! | connect / TLS / body error | `UpstreamUnknown` |

use crate::config::{GenerationConfig, PipelineConfig};
use crate::error::{ConfigError, PipelineError};
use crate::pipeline::extract::ExtractedText;
use crate::prompts::simplification_prompt;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Header carrying the API key, so the key never appears in a URL or log.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Anything that can turn document text into a plain-language version.
///
/// The pipeline holds this as `Arc<dyn Simplifier>` so tests can swap in
/// a fake.
#[async_trait]
pub trait Simplifier: Send + Sync {
    async fn simplify(&self, text: &ExtractedText) -> Result<String, PipelineError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<RequestContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPart {
    pub text: String,
}

impl GenerateRequest {
    /// Single content, single part: directive plus the whole text.
    pub fn for_text(text: &ExtractedText, generation: GenerationConfig) -> Self {
        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: simplification_prompt(text.as_str()),
                }],
            }],
            generation_config: generation,
        }
    }
}

// Every field is optional so that shape problems surface as a
// classification, not a serde error halfway through.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull `candidates[0].content.parts[0].text` out of a success body.
pub fn candidate_text(body: &str) -> Result<String, PipelineError> {
    let malformed = |detail: &str| PipelineError::UpstreamMalformedResponse {
        detail: detail.to_string(),
    };

    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|_| malformed("response body is not valid JSON"))?;

    let first = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| malformed("response has no candidates"))?;

    let finish_reason = first.finish_reason;
    let text = first
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| {
            malformed(&format!(
                "first candidate has no text part (finishReason: {})",
                finish_reason.as_deref().unwrap_or("none")
            ))
        })?;

    if text.is_empty() {
        return Err(malformed("first candidate text is empty"));
    }
    Ok(text)
}

/// Map a non-success status to its error kind.
///
/// `body` is only mined for the upstream's `error.message`; the body
/// itself is never copied into the error.
pub fn classify_status(status: StatusCode, body: &str) -> PipelineError {
    let upstream_message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message);
    let detail = upstream_message.unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::BAD_REQUEST => PipelineError::UpstreamBadRequest { detail },
        StatusCode::FORBIDDEN => PipelineError::UpstreamForbidden { detail },
        StatusCode::TOO_MANY_REQUESTS => PipelineError::UpstreamRateLimited { detail },
        StatusCode::NOT_FOUND => PipelineError::UpstreamNotFound { detail },
        other => PipelineError::UpstreamUnknown {
            detail: format!("Request failed with status code {}", other.as_u16()),
        },
    }
}

// ── Client ───────────────────────────────────────────────────────────────

/// [`Simplifier`] backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
    generation: GenerationConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("generation", &self.generation)
            .finish()
    }
}

impl GeminiClient {
    /// Client with its own connection pool.
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("plainlegal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http))
    }

    /// Client sharing a caller-provided `reqwest::Client`.
    ///
    /// The deadline is applied per request, so any client works.
    pub fn with_http_client(config: &PipelineConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            url: config.generate_url(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.api_timeout_secs),
            generation: config.generation,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            warn!("Upstream call exceeded {}s deadline", self.timeout.as_secs());
            PipelineError::UpstreamTimeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            warn!("Upstream transport failure: {}", e);
            PipelineError::UpstreamUnknown {
                detail: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Simplifier for GeminiClient {
    async fn simplify(&self, text: &ExtractedText) -> Result<String, PipelineError> {
        let start = Instant::now();
        let request = GenerateRequest::for_text(text, self.generation);
        info!(
            "Calling generative service: {} input chars, deadline {}s",
            text.char_count(),
            self.timeout.as_secs()
        );

        let response = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(
            "Generative service answered {} in {}ms ({} bytes)",
            status,
            start.elapsed().as_millis(),
            body.len()
        );

        if !status.is_success() {
            let err = classify_status(status, &body);
            error!("Generative service error {}: {}", status, body);
            return Err(err);
        }

        candidate_text(&body).inspect_err(|e| {
            error!("Unexpected generative service response ({}): {}", e, body);
        })
    }
}
