//! Configuration types for the simplification pipeline.
//!
//! Two records live here:
//!
//! * [`GenerationConfig`]: the sampling constants sent with every upstream
//!   request. They are fixed for the pipeline, not per-call knobs, so the
//!   type is `Copy` and has no setters.
//! * [`PipelineConfig`]: credentials, endpoint and model, plus the timeout
//!   and upload ceiling. Built
//!   via [`PipelineConfigBuilder`] and injected into
//!   [`crate::orchestrator::Pipeline`].

use crate::error::ConfigError;
use serde::Serialize;
use std::fmt;

/// Default generative endpoint (API version root, no trailing slash).
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Upper bound on one upstream call, in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Sampling options sent as `generationConfig` on every request.
///
/// Serialises with the upstream's camelCase field names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Low temperature keeps the summary close to the source text.
    pub const LEGAL_SIMPLIFICATION: GenerationConfig = GenerationConfig {
        temperature: 0.3,
        top_k: 40,
        top_p: 0.8,
        max_output_tokens: 2048,
    };
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::LEGAL_SIMPLIFICATION
    }
}

/// Configuration for a [`crate::orchestrator::Pipeline`].
///
/// # Example
/// ```rust
/// use plainlegal::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .api_key("test-key")
///     .model("gemini-1.5-flash")
///     .api_timeout_secs(20)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-1.5-flash");
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Credential for the generative service. Never logged.
    pub api_key: String,

    /// API root, e.g. `https://generativelanguage.googleapis.com/v1`.
    ///
    /// The request URL is `{endpoint}/models/{model}:generateContent`.
    /// Tests point this at a local server.
    pub endpoint: String,

    /// Model identifier. Default: `gemini-1.5-pro`.
    pub model: String,

    /// Hard bound on one upstream call, connect through body. Default: 30.
    pub api_timeout_secs: u64,

    /// Largest accepted upload in bytes. Default: 10 MiB.
    pub max_upload_bytes: usize,

    /// Sampling constants. Always [`GenerationConfig::LEGAL_SIMPLIFICATION`]
    /// outside of tests.
    pub generation: GenerationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            generation: GenerationConfig::LEGAL_SIMPLIFICATION,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("generation", &self.generation)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full `generateContent` URL for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if c.api_timeout_secs == 0 {
            return Err(ConfigError::Invalid("API timeout must be ≥ 1s".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("Upload ceiling must be ≥ 1 byte".into()));
        }
        if c.model.trim().is_empty() {
            return Err(ConfigError::Invalid("Model must not be empty".into()));
        }
        if !(c.endpoint.starts_with("https://") || c.endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "Endpoint must be an HTTP(S) URL, got '{}'",
                c.endpoint
            )));
        }
        Ok(self.config)
    }
}
