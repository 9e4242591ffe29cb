//! Per-session state: the analysis, the live resume text, the applied set, and
//! the transient highlight.
//!
//! `Session` is the only writer of its live text. All mutation goes through
//! [`Session::apply_rewrite`], which delegates the text surgery to
//! `crate::reconcile`.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::reconcile::{self, MatchRange, MatchTier};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("Rewrite suggestion {0} does not exist")]
    UnknownSuggestion(usize),

    #[error("Rewrite suggestion {0} has already been applied")]
    AlreadyApplied(usize),

    #[error(
        "Could not find the original text for suggestion {0} in your resume. \
         It may have been changed by an earlier rewrite."
    )]
    NotLocated(usize),
}

/// The most recently replaced region, visible until `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub range: MatchRange,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a successful apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRewrite {
    pub index: usize,
    pub tier: MatchTier,
    pub match_range: MatchRange,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub analysis: AnalysisResult,
    /// Text as extracted at submission time. Never mutated.
    pub extracted_text: String,
    live_text: String,
    applied: BTreeSet<usize>,
    highlight: Option<Highlight>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(analysis: AnalysisResult, extracted_text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            analysis,
            live_text: extracted_text.clone(),
            extracted_text,
            applied: BTreeSet::new(),
            highlight: None,
            created_at: now,
            last_active: now,
        }
    }

    pub fn live_text(&self) -> &str {
        &self.live_text
    }

    pub fn is_applied(&self, index: usize) -> bool {
        self.applied.contains(&index)
    }

    /// Applies rewrite `index` against the current live text.
    ///
    /// Every failure leaves the session untouched.
    pub fn apply_rewrite(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
        highlight_for: Duration,
    ) -> Result<AppliedRewrite, ApplyError> {
        let rewrite = self
            .analysis
            .rewrite(index)
            .ok_or(ApplyError::UnknownSuggestion(index))?;

        if self.is_applied(index) {
            return Err(ApplyError::AlreadyApplied(index));
        }

        let reconciled =
            reconcile::locate_and_replace(&self.live_text, &rewrite.original, &rewrite.suggested)
                .map_err(|_| ApplyError::NotLocated(index))?;

        self.live_text = reconciled.new_text;
        self.applied.insert(index);
        self.highlight = Some(Highlight {
            range: reconciled.match_range,
            expires_at: now + highlight_for,
        });

        Ok(AppliedRewrite {
            index,
            tier: reconciled.tier,
            match_range: reconciled.match_range,
        })
    }

    /// The highlight range, if it has not yet expired at `now`.
    pub fn active_highlight(&self, now: DateTime<Utc>) -> Option<MatchRange> {
        self.highlight
            .filter(|h| now < h.expires_at)
            .map(|h| h.range)
    }

    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        SessionView {
            session_id: self.id,
            analysis: self.analysis.clone(),
            extracted_text: self.extracted_text.clone(),
            live_text: self.live_text.clone(),
            applied: self.applied.iter().copied().collect(),
            highlight: self.active_highlight(now),
            created_at: self.created_at,
        }
    }
}

/// Observable session state handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub analysis: AnalysisResult,
    pub extracted_text: String,
    pub live_text: String,
    pub applied: Vec<usize>,
    pub highlight: Option<MatchRange>,
    pub created_at: DateTime<Utc>,
}
