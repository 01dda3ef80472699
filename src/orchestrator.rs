//! Pipeline orchestration: upload → text → simplified text.
//!
//! [`Pipeline::process`] is the library's main entry point. It runs the
//! three stages in a fixed order and stops at the first failure, so the
//! expensive stages never run when a cheap check has already failed:
//!
//! ```text
//! Idle ──▶ Validated ──▶ Extracted ──▶ Simplified ──▶ Done
//!   │          │             │              │
//!   └──────────┴─────────────┴──────────────┴──▶ Failed(kind)
//! ```
//!
//! A `Pipeline` holds no per-request state. It is cheap to clone and safe
//! to share across concurrent requests. Dropping the future returned by
//! `process` (for example when an HTTP client disconnects) abandons the
//! in-flight upstream call.

use crate::config::PipelineConfig;
use crate::error::{ConfigError, ErrorKind, PipelineError};
use crate::identity::Identity;
use crate::pipeline::extract::{self, PdfTextLayer, TextExtractor};
use crate::pipeline::simplify::{GeminiClient, Simplifier};
use crate::pipeline::upload::{BufferedBody, TransferError, UploadGate, UploadPart};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Successful outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplificationResult {
    /// Text as extracted from the PDF.
    pub original_text: String,
    /// First candidate returned by the model, untouched.
    pub simplified_text: String,
}

/// Where an invocation is in its linear progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validated,
    Extracted,
    Simplified,
    Done,
    Failed(ErrorKind),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => f.write_str("idle"),
            Stage::Validated => f.write_str("validated"),
            Stage::Extracted => f.write_str("extracted"),
            Stage::Simplified => f.write_str("simplified"),
            Stage::Done => f.write_str("done"),
            Stage::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// The document simplification pipeline.
#[derive(Clone)]
pub struct Pipeline {
    gate: UploadGate,
    extractor: Arc<dyn TextExtractor>,
    simplifier: Arc<dyn Simplifier>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("gate", &self.gate)
            .field("extractor", &"<dyn TextExtractor>")
            .field("simplifier", &"<dyn Simplifier>")
            .finish()
    }
}

impl Pipeline {
    /// Production pipeline: `pdf-extract` text layer + Gemini client.
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_components(
            config.max_upload_bytes,
            Arc::new(PdfTextLayer),
            Arc::new(GeminiClient::new(config)?),
        ))
    }

    /// Pipeline with caller-supplied stages (fakes in tests, alternative
    /// backends in embedders).
    pub fn with_components(
        max_upload_bytes: usize,
        extractor: Arc<dyn TextExtractor>,
        simplifier: Arc<dyn Simplifier>,
    ) -> Self {
        Self {
            gate: UploadGate::new(max_upload_bytes),
            extractor,
            simplifier,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.gate.max_bytes()
    }

    /// Run one invocation for an already-authenticated caller.
    ///
    /// `upload` is `None` when the request carried no file part. The
    /// identity is not checked here; resolving it is the caller's job.
    ///
    /// # Errors
    /// Exactly one [`PipelineError`], from the first stage that failed.
    pub async fn process<S, B>(
        &self,
        upload: Option<UploadPart<S>>,
        identity: &Identity,
    ) -> Result<SimplificationResult, PipelineError>
    where
        S: Stream<Item = Result<B, TransferError>> + Unpin,
        B: AsRef<[u8]>,
    {
        let span = info_span!("pipeline", user = %identity.user_id);
        self.run(upload).instrument(span).await
    }

    /// [`Pipeline::process`] for a body that is already in memory.
    pub async fn process_bytes(
        &self,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
        identity: &Identity,
    ) -> Result<SimplificationResult, PipelineError> {
        let part: UploadPart<BufferedBody> = UploadPart::from_bytes(file_name, content_type, bytes);
        self.process(Some(part), identity).await
    }

    async fn run<S, B>(
        &self,
        upload: Option<UploadPart<S>>,
    ) -> Result<SimplificationResult, PipelineError>
    where
        S: Stream<Item = Result<B, TransferError>> + Unpin,
        B: AsRef<[u8]>,
    {
        let total_start = Instant::now();
        let mut stage = Stage::Idle;

        // ── Step 1: Validate upload ──────────────────────────────────────
        let document = self
            .gate
            .validate(upload)
            .await
            .map_err(|e| failed(stage, e))?;
        advance(&mut stage, Stage::Validated);
        info!("Upload validated: {} bytes", document.len());

        // ── Step 2: Extract text ─────────────────────────────────────────
        let extract_start = Instant::now();
        let text = extract::extract(Arc::clone(&self.extractor), document)
            .await
            .map_err(|e| failed(stage, e))?;
        advance(&mut stage, Stage::Extracted);
        info!(
            "Extracted {} chars in {}ms",
            text.char_count(),
            extract_start.elapsed().as_millis()
        );

        // ── Step 3: Simplify ─────────────────────────────────────────────
        let llm_start = Instant::now();
        let simplified = self
            .simplifier
            .simplify(&text)
            .await
            .map_err(|e| failed(stage, e))?;
        advance(&mut stage, Stage::Simplified);
        info!(
            "Simplified to {} chars in {}ms",
            simplified.chars().count(),
            llm_start.elapsed().as_millis()
        );

        // ── Step 4: Assemble ─────────────────────────────────────────────
        let result = SimplificationResult {
            original_text: text.into_string(),
            simplified_text: simplified,
        };
        advance(&mut stage, Stage::Done);
        info!(
            "Pipeline complete in {}ms",
            total_start.elapsed().as_millis()
        );
        Ok(result)
    }
}

fn advance(stage: &mut Stage, to: Stage) {
    tracing::debug!("Stage {} → {}", stage, to);
    *stage = to;
}

fn failed(stage: Stage, e: PipelineError) -> PipelineError {
    let to = Stage::Failed(e.kind());
    warn!("Stage {} → {}: {}", stage, to, e);
    e
}
