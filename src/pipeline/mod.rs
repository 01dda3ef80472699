//! Pipeline stages for PDF simplification.
//!
//! Each submodule implements exactly one step and can be tested on its own.
//! [`crate::orchestrator::Pipeline`] wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ extract ──▶ simplify
//! (gate)     (pdf-extract) (Gemini)
//! ```
//!
//! 1. [`upload`]   - admit the file part: present, `application/pdf`, under
//!    the ceiling. Works on the chunk stream so rejections happen mid-transfer
//! 2. [`extract`]  - text layer of the PDF; runs in `spawn_blocking` because
//!    parsing is CPU-bound
//! 3. [`simplify`] - one `generateContent` call under a deadline; the only
//!    stage with network I/O

pub mod extract;
pub mod simplify;
pub mod upload;
