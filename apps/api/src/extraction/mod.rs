//! Document extraction — turns an uploaded resume into plain text.
//!
//! PDF goes through `pdf-extract` on the blocking pool; plain text is decoded as
//! UTF-8. Word documents are rejected: they have to be exported to PDF first.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";
const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0}")]
    Unsupported(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Text document is not valid UTF-8")]
    Encoding,

    #[error("No text could be extracted from the document")]
    Empty,

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// A resume file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Detects the document kind from magic bytes, then file extension, then
    /// declared content type.
    pub fn detect(document: &UploadedDocument) -> Result<Self, ExtractionError> {
        if document.bytes.starts_with(PDF_MAGIC) {
            return Ok(Self::Pdf);
        }

        let extension = document
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let content_type = document
            .content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_deref() {
            Some("pdf") => return Ok(Self::Pdf),
            Some("txt") | Some("md") | Some("text") => return Ok(Self::PlainText),
            Some("doc") | Some("docx") | Some("odt") | Some("rtf") => {
                return Err(ExtractionError::Unsupported(
                    "Word documents are not supported; export the resume as PDF".to_string(),
                ))
            }
            _ => {}
        }

        if content_type == "application/pdf" {
            Ok(Self::Pdf)
        } else if content_type.starts_with("text/") {
            Ok(Self::PlainText)
        } else if content_type.contains("word") || content_type.contains("officedocument") {
            Err(ExtractionError::Unsupported(
                "Word documents are not supported; export the resume as PDF".to_string(),
            ))
        } else {
            Err(ExtractionError::Unsupported(format!(
                "expected a PDF or plain-text resume (file: {}, content type: {})",
                document.file_name.as_deref().unwrap_or("unnamed"),
                if content_type.is_empty() { "none" } else { &content_type }
            )))
        }
    }
}

/// The extraction collaborator. Carried in session orchestration as `Arc<dyn DocumentExtractor>`.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError>;
}

/// In-process extractor for PDF and plain-text resumes.
pub struct LocalExtractor;

#[async_trait]
impl DocumentExtractor for LocalExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError> {
        let kind = DocumentKind::detect(document)?;
        debug!(
            "Extracting {:?} document ({} bytes)",
            kind,
            document.bytes.len()
        );

        let raw = match kind {
            DocumentKind::Pdf => {
                let bytes = document.bytes.clone();
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await
                    .map_err(|e| ExtractionError::Task(e.to_string()))?
                    .map_err(|e| ExtractionError::Pdf(e.to_string()))?
            }
            DocumentKind::PlainText => {
                let text = std::str::from_utf8(&document.bytes)
                    .map_err(|_| ExtractionError::Encoding)?;
                text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string()
            }
        };

        let text = normalize_line_endings(&raw);
        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(text)
    }
}

/// Converts CRLF and lone CR to LF so later line-grain matching sees one convention.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: Option<&str>, content_type: Option<&str>, bytes: &'static [u8]) -> UploadedDocument {
        UploadedDocument {
            file_name: file_name.map(String::from),
            content_type: content_type.map(String::from),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_detect_pdf_by_magic_regardless_of_name() {
        let doc = upload(Some("resume.bin"), None, b"%PDF-1.7\n...");
        assert_eq!(DocumentKind::detect(&doc).unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_detect_by_extension_and_content_type() {
        let by_ext = upload(Some("Resume.TXT"), None, b"hello");
        assert_eq!(DocumentKind::detect(&by_ext).unwrap(), DocumentKind::PlainText);

        let by_type = upload(None, Some("text/plain; charset=utf-8"), b"hello");
        assert_eq!(DocumentKind::detect(&by_type).unwrap(), DocumentKind::PlainText);
    }

    #[test]
    fn test_detect_rejects_word_documents() {
        let doc = upload(Some("resume.docx"), None, b"PK\x03\x04");
        assert!(matches!(
            DocumentKind::detect(&doc),
            Err(ExtractionError::Unsupported(msg)) if msg.contains("Word")
        ));

        let by_type = upload(
            None,
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            b"PK\x03\x04",
        );
        assert!(matches!(
            DocumentKind::detect(&by_type),
            Err(ExtractionError::Unsupported(_))
        ));
    }

    #[test]
    fn test_detect_rejects_unknown() {
        let doc = upload(Some("photo.png"), Some("image/png"), b"\x89PNG");
        assert!(matches!(
            DocumentKind::detect(&doc),
            Err(ExtractionError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_plain_text_strips_bom_and_crlf() {
        let doc = upload(Some("resume.txt"), None, b"\xef\xbb\xbfLine one\r\nLine two\r");
        let text = LocalExtractor.extract(&doc).await.unwrap();
        assert_eq!(text, "Line one\nLine two\n");
    }

    #[tokio::test]
    async fn test_extract_rejects_invalid_utf8() {
        let doc = upload(Some("resume.txt"), None, b"\xff\xfe\xfd");
        assert!(matches!(
            LocalExtractor.extract(&doc).await,
            Err(ExtractionError::Encoding)
        ));
    }

    #[tokio::test]
    async fn test_extract_rejects_blank_text() {
        let doc = upload(Some("resume.txt"), None, b"  \n\t ");
        assert!(matches!(
            LocalExtractor.extract(&doc).await,
            Err(ExtractionError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_extract_reports_corrupt_pdf() {
        let doc = upload(Some("resume.pdf"), None, b"%PDF-1.4 this is not really a pdf");
        assert!(LocalExtractor.extract(&doc).await.is_err());
    }
}
