//! # plainlegal
//!
//! Turn a legal PDF into plain English.
//!
//! A caller uploads one PDF. The crate checks it, pulls out its text layer,
//! asks a Gemini model for a plain-language rewrite, and hands back both the
//! original and the simplified text. Every failure comes back as exactly one
//! classified [`PipelineError`], which the HTTP layer maps to a status code
//! and a human-readable message.
//!
//! ## Pipeline Overview
//!
//! ```text
//! multipart upload
//!  │
//!  ├─ 1. Gate      presence, application/pdf, size ceiling (streamed)
//!  ├─ 2. Extract   text layer via pdf-extract (CPU-bound, spawn_blocking)
//!  ├─ 3. Simplify  one generateContent call, bounded by a deadline
//!  └─ 4. Output    { originalText, simplifiedText }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plainlegal::{Identity, Pipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     let pipeline = Pipeline::new(&config)?;
//!
//!     let bytes = std::fs::read("lease.pdf")?;
//!     let who = Identity::new("local", "Local operator", "");
//!     let result = pipeline
//!         .process_bytes(Some("lease.pdf".into()), Some("application/pdf".into()), bytes, &who)
//!         .await?;
//!     println!("{}", result.simplified_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `plainlegal` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when embedding the library or the router:
//! ```toml
//! plainlegal = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, PipelineConfig, PipelineConfigBuilder};
pub use error::{ConfigError, ErrorKind, InputRejection, PipelineError};
pub use identity::{Identity, IdentityError, IdentityGate, Role, StaticTokenGate};
pub use orchestrator::{Pipeline, SimplificationResult, Stage};
pub use pipeline::extract::{ExtractedText, PdfTextLayer, TextExtractor};
pub use pipeline::simplify::{GeminiClient, Simplifier};
pub use pipeline::upload::{UploadGate, UploadPart, UploadedDocument};
