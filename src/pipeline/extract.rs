//! Text extraction: pull the text layer out of a validated PDF.
//!
//! ## Why spawn_blocking?
//!
//! PDF parsing is CPU-bound and `pdf-extract` has no async API. Running it
//! on Tokio's blocking pool keeps the async workers free to serve other
//! requests while a large contract is parsed. The parser is also known to
//! panic on some malformed inputs; the blocking task contains the panic and
//! it surfaces here as `ExtractionFailed` rather than killing the worker.

use crate::error::PipelineError;
use crate::pipeline::upload::UploadedDocument;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// The parser's own error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PdfParseError(pub String);

/// A PDF text-extraction routine.
///
/// Implementations are synchronous and may be slow; the pipeline calls
/// them from a blocking thread.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, pdf: &[u8]) -> Result<String, PdfParseError>;
}

/// Production extractor backed by the `pdf-extract` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextLayer;

impl TextExtractor for PdfTextLayer {
    fn extract_text(&self, pdf: &[u8]) -> Result<String, PdfParseError> {
        pdf_extract::extract_text_from_mem(pdf).map_err(|e| PdfParseError(e.to_string()))
    }
}

/// Text pulled from a document. Never blank.
///
/// Holds the text exactly as extracted; only the emptiness check trims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// `None` when `text` is empty or whitespace-only.
    pub fn new(text: String) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run `extractor` over the document on the blocking pool.
///
/// Consumes the document so its buffer is released as soon as parsing ends.
pub async fn extract(
    extractor: Arc<dyn TextExtractor>,
    document: UploadedDocument,
) -> Result<ExtractedText, PipelineError> {
    let size = document.len();

    let raw = tokio::task::spawn_blocking(move || extractor.extract_text(document.bytes()))
        .await
        .map_err(|e| {
            warn!("PDF parser task failed: {}", e);
            PipelineError::ExtractionFailed {
                detail: format!("PDF parser aborted: {e}"),
            }
        })?
        .map_err(|e| {
            warn!("PDF parse error on {} byte document: {}", size, e);
            PipelineError::ExtractionFailed { detail: e.0 }
        })?;

    match ExtractedText::new(raw) {
        Some(text) => {
            debug!("Extracted {} chars from {} bytes", text.char_count(), size);
            Ok(text)
        }
        None => {
            warn!("PDF of {} bytes has no extractable text", size);
            Err(PipelineError::EmptyContent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::upload::{UploadGate, UploadPart, PDF_MIME};

    struct Fixed(Result<String, PdfParseError>);

    impl TextExtractor for Fixed {
        fn extract_text(&self, _pdf: &[u8]) -> Result<String, PdfParseError> {
            self.0.clone()
        }
    }

    struct Panics;

    impl TextExtractor for Panics {
        fn extract_text(&self, _pdf: &[u8]) -> Result<String, PdfParseError> {
            panic!("unexpected token in content stream")
        }
    }

    async fn document(bytes: &[u8]) -> UploadedDocument {
        UploadGate::new(64 * 1024)
            .validate(Some(UploadPart::from_bytes(
                None,
                Some(PDF_MIME.into()),
                bytes.to_vec(),
            )))
            .await
            .unwrap()
    }

    #[test]
    fn extracted_text_rejects_blank() {
        assert!(ExtractedText::new(String::new()).is_none());
        assert!(ExtractedText::new(" \n\t \r\n".into()).is_none());
        let t = ExtractedText::new("  Clause 1. \n".into()).unwrap();
        assert_eq!(t.as_str(), "  Clause 1. \n");
    }

    #[tokio::test]
    async fn returns_text_untouched() {
        let ex: Arc<dyn TextExtractor> = Arc::new(Fixed(Ok(
            "This Agreement shall terminate upon breach.".into(),
        )));
        let text = extract(ex, document(b"%PDF-1.4").await).await.unwrap();
        assert_eq!(text.as_str(), "This Agreement shall terminate upon breach.");
    }

    #[tokio::test]
    async fn whitespace_only_is_empty_content() {
        let ex: Arc<dyn TextExtractor> = Arc::new(Fixed(Ok("\n\n   \n".into())));
        let err = extract(ex, document(b"%PDF-1.4").await).await.unwrap_err();
        assert_eq!(err, PipelineError::EmptyContent);
    }

    #[tokio::test]
    async fn parse_error_keeps_message() {
        let ex: Arc<dyn TextExtractor> =
            Arc::new(Fixed(Err(PdfParseError("invalid cross-reference table".into()))));
        let err = extract(ex, document(b"%PDF-1.4").await).await.unwrap_err();
        assert_eq!(
            err,
            PipelineError::ExtractionFailed {
                detail: "invalid cross-reference table".into()
            }
        );
    }

    #[tokio::test]
    async fn parser_panic_is_extraction_failure() {
        let ex: Arc<dyn TextExtractor> = Arc::new(Panics);
        let err = extract(ex, document(b"%PDF-1.4").await).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExtractionFailed);
    }

    /// One-page PDF whose content stream is `content`, Helvetica as `/F1`.
    fn one_page_pdf(content: &str) -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for off in offsets {
            pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref
            )
            .as_bytes(),
        );
        pdf
    }

    #[tokio::test]
    async fn real_parser_reads_text_layer() {
        let pdf = one_page_pdf("BT /F1 12 Tf 72 720 Td (This Agreement shall terminate upon breach.) Tj ET");
        let ex: Arc<dyn TextExtractor> = Arc::new(PdfTextLayer);
        let text = extract(ex, document(&pdf).await).await.unwrap();
        assert!(
            text.as_str().contains("This Agreement shall terminate upon breach."),
            "got: {:?}",
            text.as_str()
        );
    }

    #[tokio::test]
    async fn real_parser_blank_page_is_empty_content() {
        let pdf = one_page_pdf("BT /F1 12 Tf 72 720 Td () Tj ET");
        let ex: Arc<dyn TextExtractor> = Arc::new(PdfTextLayer);
        let err = extract(ex, document(&pdf).await).await.unwrap_err();
        assert_eq!(err, PipelineError::EmptyContent);
    }

    #[tokio::test]
    async fn real_parser_rejects_garbage() {
        let ex: Arc<dyn TextExtractor> = Arc::new(PdfTextLayer);
        let err = extract(ex, document(b"this is not a pdf at all").await)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ExtractionFailed);
    }
}
