//! Analyzer — pluggable collaborator that turns (resume, job description) into
//! an `AnalysisResult`.
//!
//! Default: `LlmAnalyzer` over the shared `LlmClient`.
//! `AppState` carries an `Arc<dyn Analyzer>`, so tests swap in fakes.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::analysis::models::AnalysisResult;
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::prompts::{
    JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION, VERBATIM_INSTRUCTION,
};
use crate::llm_client::{LlmClient, LlmError};
use crate::reconcile;

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, LlmError>;
}

/// Analyzer backed by the Claude Messages API.
pub struct LlmAnalyzer {
    llm: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<AnalysisResult, LlmError> {
        let prompt = build_analysis_prompt(resume_text, job_description);
        let system = format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}");

        let analysis: AnalysisResult = self.llm.call_json(&prompt, &system).await?;
        analysis
            .validate()
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        info!(
            "Analysis complete: overall={}, missing_keywords={}, unverified_skills={}",
            analysis.scores.overall,
            analysis.missing_keywords.len(),
            analysis.unverified_skills.len()
        );
        log_unlocatable_rewrites(&analysis, resume_text);

        Ok(analysis)
    }
}

fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    render_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("verbatim_instruction", VERBATIM_INSTRUCTION),
            ("fabrication_instruction", NO_FABRICATION_INSTRUCTION),
            ("job_description", job_description),
            ("resume_text", resume_text),
        ],
    )
}

/// Substitutes `{name}` placeholders in one left-to-right pass.
/// Substituted values are never rescanned; unknown braces are copied through.
fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];

        let hit = values.iter().find(|(name, _)| {
            tail.strip_prefix(name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Flags rewrites whose `original` the model did not quote verbatim.
/// Advisory only: the fuzzy tiers may still locate them at apply time.
fn log_unlocatable_rewrites(analysis: &AnalysisResult, resume_text: &str) {
    for (index, rewrite) in analysis.rewrites.iter().enumerate() {
        match reconcile::locate(resume_text, &rewrite.original) {
            Some(located) if located.tier == reconcile::MatchTier::Exact => {}
            Some(located) => warn!(
                "Rewrite {index} original is not verbatim; resolvable via {:?} tier",
                located.tier
            ),
            None => warn!(
                "Rewrite {index} original not found in resume: {:?}",
                rewrite.original.chars().take(60).collect::<String>()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_inputs_and_instructions() {
        let prompt = build_analysis_prompt("RESUME BODY", "JD BODY");
        assert!(prompt.contains("RESUME BODY"));
        assert!(prompt.contains("JD BODY"));
        assert!(prompt.contains("character-for-character"));
        assert!(!prompt.contains("{resume_text}"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_placeholder_text_inside_resume_is_not_reexpanded() {
        let prompt = build_analysis_prompt("I wrote {job_description} once", "JD BODY");
        assert!(prompt.contains("I wrote {job_description} once"));
        assert_eq!(prompt.matches("JD BODY").count(), 1);
    }

    #[test]
    fn test_placeholder_text_inside_job_description_is_not_reexpanded() {
        let prompt = build_analysis_prompt("RESUME BODY", "Paste your {resume_text} here");
        assert!(prompt.contains("Paste your {resume_text} here"));
        assert_eq!(prompt.matches("RESUME BODY").count(), 1);
    }

    #[test]
    fn test_render_template_copies_unknown_braces() {
        let rendered = render_template(r#"{"a": {x}} {y"#, &[("x", "1")]);
        assert_eq!(rendered, r#"{"a": 1} {y"#);
    }
}
