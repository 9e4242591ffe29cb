//! Session Orchestrator — the only mutator of session state.
//!
//! Flow: validate input → extract text → analyze → create session.
//! Afterwards: apply_rewrite / view / export / reset against that session.
//!
//! Nothing is stored for a failed submission: the session is created only after
//! extraction and analysis have both succeeded.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::Analyzer;
use crate::errors::AppError;
use crate::export::DocumentExporter;
use crate::extraction::{normalize_line_endings, DocumentExtractor, UploadedDocument};
use crate::reconcile::{MatchRange, MatchTier};
use crate::session::models::{Session, SessionView};
use crate::session::store::SessionStore;

/// What the client submitted for analysis.
#[derive(Debug, Clone)]
pub enum ResumeSource {
    Document(UploadedDocument),
    Text(String),
}

/// Result of an apply, with enough state for the client to re-render.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyResponse {
    pub index: usize,
    pub tier: MatchTier,
    pub match_range: MatchRange,
    pub live_text: String,
    pub applied: Vec<usize>,
}

/// An exported document and its MIME type.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct Orchestrator {
    extractor: Arc<dyn DocumentExtractor>,
    analyzer: Arc<dyn Analyzer>,
    exporter: Arc<dyn DocumentExporter>,
    store: SessionStore,
    highlight_for: Duration,
}

impl Orchestrator {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        analyzer: Arc<dyn Analyzer>,
        exporter: Arc<dyn DocumentExporter>,
        store: SessionStore,
        highlight_for: Duration,
    ) -> Self {
        Self {
            extractor,
            analyzer,
            exporter,
            store,
            highlight_for,
        }
    }

    /// Validates, extracts, analyzes, and opens a new session.
    pub async fn submit(
        &self,
        source: ResumeSource,
        job_description: &str,
    ) -> Result<SessionView, AppError> {
        validate_submission(&source, job_description)?;

        let resume_text = match source {
            ResumeSource::Document(document) => self.extractor.extract(&document).await?,
            ResumeSource::Text(text) => normalize_line_endings(&text),
        };
        info!("Resume text ready ({} chars)", resume_text.chars().count());

        let analysis = self
            .analyzer
            .analyze(&resume_text, job_description.trim())
            .await?;

        let now = Utc::now();
        let session = Session::new(analysis, resume_text, now);
        let view = session.view(now);
        self.store.insert(session, now).await;

        info!("Opened session {}", view.session_id);
        Ok(view)
    }

    /// Applies rewrite `index` to the session's live text.
    pub async fn apply_rewrite(&self, id: Uuid, index: usize) -> Result<ApplyResponse, AppError> {
        let now = Utc::now();
        let highlight_for = self.highlight_for;

        let response = self
            .store
            .update(id, now, |session| {
                session
                    .apply_rewrite(index, now, highlight_for)
                    .map(|applied| ApplyResponse {
                        index: applied.index,
                        tier: applied.tier,
                        match_range: applied.match_range,
                        live_text: session.live_text().to_string(),
                        applied: session.view(now).applied,
                    })
            })
            .await
            .ok_or_else(|| session_not_found(id))?;

        match &response {
            Ok(applied) => info!(
                "Session {id}: applied rewrite {index} via {:?} tier",
                applied.tier
            ),
            Err(e) => warn!("Session {id}: rewrite {index} not applied: {e}"),
        }
        Ok(response?)
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, AppError> {
        let now = Utc::now();
        self.store
            .read(id, now, |session| session.view(now))
            .await
            .ok_or_else(|| session_not_found(id))
    }

    /// Discards all state for the session.
    pub async fn reset(&self, id: Uuid) -> Result<(), AppError> {
        if self.store.remove(id).await {
            info!("Session {id} reset");
            Ok(())
        } else {
            Err(session_not_found(id))
        }
    }

    /// Renders the session's current live text with the export collaborator.
    pub async fn export(&self, id: Uuid) -> Result<ExportedDocument, AppError> {
        let live_text = self
            .store
            .read(id, Utc::now(), |session| session.live_text().to_string())
            .await
            .ok_or_else(|| session_not_found(id))?;

        let exporter = Arc::clone(&self.exporter);
        let bytes = tokio::task::spawn_blocking(move || exporter.render(&live_text))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))?
            .map_err(|e| AppError::Internal(e.into()))?;

        info!("Session {id}: exported {} bytes", bytes.len());
        Ok(ExportedDocument {
            content_type: self.exporter.content_type(),
            bytes,
        })
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found or expired"))
}

/// Rejects a submission before any collaborator is called.
fn validate_submission(source: &ResumeSource, job_description: &str) -> Result<(), AppError> {
    match source {
        ResumeSource::Document(document) if document.bytes.is_empty() => {
            return Err(AppError::Validation("resume file is empty".to_string()))
        }
        ResumeSource::Text(text) if text.trim().is_empty() => {
            return Err(AppError::Validation("resume_text cannot be empty".to_string()))
        }
        _ => {}
    }

    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use bytes::Bytes;

    use super::test_support::{orchestrator, FakeAnalyzer};
    use super::*;
    use crate::analysis::models::fixtures::RESUME_TEXT;
    use crate::llm_client::LlmError;

    fn text_source() -> ResumeSource {
        ResumeSource::Text(RESUME_TEXT.to_string())
    }

    #[tokio::test]
    async fn test_submit_opens_session_with_live_copy() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let view = orch.submit(text_source(), "Senior engineer").await.unwrap();

        assert_eq!(view.live_text, RESUME_TEXT);
        assert!(view.applied.is_empty());
        assert_eq!(view.analysis.rewrites.len(), 3);
        assert_eq!(orch.view(view.session_id).await.unwrap().live_text, RESUME_TEXT);
    }

    #[tokio::test]
    async fn test_submit_extracts_uploaded_document() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let document = UploadedDocument {
            file_name: Some("resume.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::from_static(b"Managed a team of engineers.\r\nUsed Python."),
        };

        let view = orch
            .submit(ResumeSource::Document(document), "Senior engineer")
            .await
            .unwrap();
        assert_eq!(view.live_text, "Managed a team of engineers.\nUsed Python.");
    }

    #[tokio::test]
    async fn test_text_submission_normalizes_line_endings() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let pasted = "Managed a team of engineers.\rUsed Python for automation.\r\nWrote documentation.";

        let view = orch
            .submit(ResumeSource::Text(pasted.to_string()), "Senior engineer")
            .await
            .unwrap();
        assert_eq!(view.live_text, RESUME_TEXT);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_external_call() {
        let analyzer = Arc::new(FakeAnalyzer::ok());
        let orch = orchestrator(Arc::clone(&analyzer));

        let empty_jd = orch.submit(text_source(), "  \n").await;
        assert!(matches!(empty_jd, Err(AppError::Validation(_))));

        let empty_doc = orch
            .submit(
                ResumeSource::Document(UploadedDocument {
                    file_name: Some("resume.pdf".to_string()),
                    content_type: None,
                    bytes: Bytes::new(),
                }),
                "Senior engineer",
            )
            .await;
        assert!(matches!(empty_doc, Err(AppError::Validation(_))));

        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unsupported_document_never_reaches_analyzer() {
        let analyzer = Arc::new(FakeAnalyzer::ok());
        let orch = orchestrator(Arc::clone(&analyzer));
        let document = UploadedDocument {
            file_name: Some("resume.docx".to_string()),
            content_type: None,
            bytes: Bytes::from_static(b"PK\x03\x04"),
        };

        let result = orch.submit(ResumeSource::Document(document), "JD").await;
        assert!(matches!(result, Err(AppError::Extraction(_))));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_analysis_creates_no_session() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::failing(|| {
            LlmError::SafetyRejected("flagged".to_string())
        })));

        let result = orch.submit(text_source(), "Senior engineer").await;
        assert!(matches!(result, Err(AppError::ContentRejected(_))));
        assert_eq!(orch.store.count().await, 0);
    }

    #[tokio::test]
    async fn test_apply_twice_changes_text_once() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let id = orch.submit(text_source(), "JD").await.unwrap().session_id;

        let first = orch.apply_rewrite(id, 0).await.unwrap();
        assert_eq!(first.tier, MatchTier::Exact);
        assert_eq!(first.applied, vec![0]);

        let second = orch.apply_rewrite(id, 0).await;
        assert!(matches!(second, Err(AppError::AlreadyApplied(_))));
        assert_eq!(orch.view(id).await.unwrap().live_text, first.live_text);
    }

    #[tokio::test]
    async fn test_apply_not_located_is_recoverable() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let id = orch.submit(text_source(), "JD").await.unwrap().session_id;

        let result = orch.apply_rewrite(id, 2).await;
        assert!(matches!(result, Err(AppError::RewriteNotLocated(_))));

        // The session survives and other rewrites still apply.
        let view = orch.view(id).await.unwrap();
        assert_eq!(view.live_text, RESUME_TEXT);
        assert!(orch.apply_rewrite(id, 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_apply_sets_highlight_on_view() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let id = orch.submit(text_source(), "JD").await.unwrap().session_id;

        let applied = orch.apply_rewrite(id, 0).await.unwrap();
        assert_eq!(orch.view(id).await.unwrap().highlight, Some(applied.match_range));
    }

    #[tokio::test]
    async fn test_reset_discards_session() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let id = orch.submit(text_source(), "JD").await.unwrap().session_id;

        orch.reset(id).await.unwrap();
        assert!(matches!(orch.view(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(orch.apply_rewrite(id, 0).await, Err(AppError::NotFound(_))));
        assert!(matches!(orch.reset(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_export_renders_live_text() {
        let orch = orchestrator(Arc::new(FakeAnalyzer::ok()));
        let id = orch.submit(text_source(), "JD").await.unwrap().session_id;
        orch.apply_rewrite(id, 0).await.unwrap();

        let exported = orch.export(id).await.unwrap();
        assert_eq!(exported.content_type, "application/pdf");
        assert!(exported.bytes.starts_with(b"%PDF"));
    }
}
