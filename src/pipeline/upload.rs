//! Upload gate: admit a PDF body into memory, or refuse it early.
//!
//! The gate works on a *stream* of body chunks rather than a finished
//! buffer. The declared content type is checked before the first chunk is
//! pulled, and the running byte count is checked before each chunk is
//! appended, so a wrong-type or oversized upload is rejected mid-transfer
//! instead of being absorbed and measured afterwards.

use crate::error::{InputRejection, PipelineError};
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

/// The only accepted content type.
pub const PDF_MIME: &str = "application/pdf";

/// Failure reported by the transport while the body is being received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The transport's own body limit fired.
    LimitExceeded,
    /// The stream broke off or was not valid multipart.
    Interrupted(String),
}

/// A body that is already fully in memory (CLI, tests).
pub type BufferedBody = stream::Iter<std::iter::Once<Result<Vec<u8>, TransferError>>>;

/// One file part as it arrives: metadata plus a chunk stream.
pub struct UploadPart<S> {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: S,
}

impl UploadPart<BufferedBody> {
    /// Wrap an in-memory buffer as a single-chunk upload.
    pub fn from_bytes(
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        UploadPart {
            file_name,
            content_type,
            body: stream::iter(std::iter::once(Ok(bytes))),
        }
    }
}

/// A validated upload. Lives only for the duration of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    bytes: Vec<u8>,
    content_type: String,
    file_name: Option<String>,
}

impl UploadedDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// True when `content_type` names a PDF, ignoring case and parameters.
pub fn is_pdf_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME))
        .unwrap_or(false)
}

/// Content type for a local file, judged by its leading bytes.
///
/// Used where no transport declares a type (the CLI). Anything without the
/// `%PDF` signature is reported as `application/octet-stream` and is then
/// refused by the gate like any other non-PDF upload.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"%PDF") {
        PDF_MIME
    } else {
        "application/octet-stream"
    }
}

/// Presence, type and size checks for an incoming file.
#[derive(Debug, Clone, Copy)]
pub struct UploadGate {
    max_bytes: usize,
}

impl UploadGate {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Admit `part` or fail with [`PipelineError::InvalidInput`].
    ///
    /// No body chunk is read when the part is missing or mistyped, and no
    /// chunk that would push the total past the ceiling is ever appended.
    pub async fn validate<S, B>(
        &self,
        part: Option<UploadPart<S>>,
    ) -> Result<UploadedDocument, PipelineError>
    where
        S: Stream<Item = Result<B, TransferError>> + Unpin,
        B: AsRef<[u8]>,
    {
        let Some(part) = part else {
            warn!("Upload rejected: no file part");
            return Err(PipelineError::missing_file());
        };

        if !is_pdf_type(part.content_type.as_deref()) {
            warn!(
                "Upload rejected: content type {:?} is not {}",
                part.content_type, PDF_MIME
            );
            return Err(PipelineError::unsupported_type(part.content_type.as_deref()));
        }

        let mut body = part.body;
        let mut buf: Vec<u8> = Vec::new();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(TransferError::LimitExceeded) => {
                    warn!("Upload rejected: transport body limit reached");
                    return Err(PipelineError::too_large(self.max_bytes));
                }
                Err(TransferError::Interrupted(detail)) => {
                    warn!("Upload rejected: transfer interrupted: {}", detail);
                    return Err(PipelineError::InvalidInput(InputRejection::Malformed {
                        detail,
                    }));
                }
            };
            let chunk = chunk.as_ref();
            if buf.len() + chunk.len() > self.max_bytes {
                warn!(
                    "Upload rejected: exceeds {} bytes after {} bytes received",
                    self.max_bytes,
                    buf.len() + chunk.len()
                );
                return Err(PipelineError::too_large(self.max_bytes));
            }
            buf.extend_from_slice(chunk);
        }

        debug!(
            "Upload accepted: {} bytes ({:?})",
            buf.len(),
            part.file_name.as_deref().unwrap_or("<unnamed>")
        );

        Ok(UploadedDocument {
            bytes: buf,
            content_type: PDF_MIME.to_string(),
            file_name: part.file_name,
        })
    }
}
