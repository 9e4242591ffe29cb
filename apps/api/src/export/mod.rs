// Document export: renders the live resume text as a paginated PDF.
// Rendering is CPU-bound; callers run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod pdf;

use thiserror::Error;

pub use pdf::{PageLayout, PdfExporter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// The export collaborator: plain text in, document bytes out.
pub trait DocumentExporter: Send + Sync {
    /// MIME type of the produced document.
    fn content_type(&self) -> &'static str;

    fn render(&self, text: &str) -> Result<Vec<u8>, ExportError>;
}
