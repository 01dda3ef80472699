//! HTTP API for the simplification pipeline.
//!
//! # Endpoints
//!
//! - `POST /api/upload-pdf` - simplify one uploaded PDF (multipart field `pdf`)
//! - `GET /api/auth/profile` - echo the authenticated caller
//! - `GET /api/dashboard` - caller plus case counters
//! - `GET /health` - liveness
//!
//! All `/api` routes require `Authorization: Bearer <token>`.
//!
//! # Example
//!
//! ```no_run
//! use plainlegal::api::{serve, ApiState};
//! use plainlegal::{Pipeline, PipelineConfig, StaticTokenGate};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::builder().api_key("key").build()?;
//! let gate = StaticTokenGate::from_table("dev-token=u1:Dev:dev@example.com")?;
//! let state = ApiState::new(Pipeline::new(&config)?, Arc::new(gate));
//! serve("127.0.0.1:5000".parse()?, state).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::{outward, ApiError};
pub use handlers::{
    dashboard_handler, health_handler, profile_handler, upload_pdf_handler, Authenticated,
};
pub use server::{create_router, serve, CORS_ORIGINS_ENV};
pub use types::{
    ApiState, DashboardResponse, DashboardStats, ErrorResponse, HealthResponse, UploadResponse,
    MULTIPART_OVERHEAD_BYTES, UPLOAD_FIELD,
};
