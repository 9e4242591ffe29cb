//! Analysis Result — the structured match report returned by the analyzer.
//!
//! Produced once per submission and never mutated afterwards. Rewrite
//! suggestions are identified by their index in `rewrites`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rewrite suggestions the analyzer must return.
pub const REWRITE_COUNT: usize = 3;

const MAX_SCORE: u32 = 100;

/// Sub-scores, each an integer in 0..=100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub overall: u32,
    pub skills: u32,
    pub experience: u32,
    pub keywords: u32,
    pub achievements: u32,
}

impl Scores {
    fn named(&self) -> [(&'static str, u32); 5] {
        [
            ("overall", self.overall),
            ("skills", self.skills),
            ("experience", self.experience),
            ("keywords", self.keywords),
            ("achievements", self.achievements),
        ]
    }
}

/// A skill the resume claims but does not back up with evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnverifiedSkill {
    pub skill: String,
    pub reason: String,
}

/// An AI-suggested before/after bullet rewrite.
///
/// `original` is meant to be a verbatim passage of the resume, but it comes from
/// an untrusted generator and may be paraphrased or reformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSuggestion {
    pub original: String,
    pub suggested: String,
    #[serde(rename = "why", alias = "rationale")]
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scores: Scores,
    pub summary: String,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub unverified_skills: Vec<UnverifiedSkill>,
    pub rewrites: Vec<RewriteSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisValidationError {
    #[error("score '{name}' is {value}, expected 0-100")]
    ScoreOutOfRange { name: &'static str, value: u32 },

    #[error("expected exactly {REWRITE_COUNT} rewrites, got {0}")]
    RewriteCount(usize),

    #[error("rewrite {index} has an empty '{field}' field")]
    EmptyRewriteField { index: usize, field: &'static str },
}

impl AnalysisResult {
    /// Checks the parts of the contract that serde cannot express.
    pub fn validate(&self) -> Result<(), AnalysisValidationError> {
        if let Some((name, value)) = self
            .scores
            .named()
            .into_iter()
            .find(|(_, value)| *value > MAX_SCORE)
        {
            return Err(AnalysisValidationError::ScoreOutOfRange { name, value });
        }

        if self.rewrites.len() != REWRITE_COUNT {
            return Err(AnalysisValidationError::RewriteCount(self.rewrites.len()));
        }

        for (index, rewrite) in self.rewrites.iter().enumerate() {
            for (field, value) in [
                ("original", &rewrite.original),
                ("suggested", &rewrite.suggested),
            ] {
                if value.trim().is_empty() {
                    return Err(AnalysisValidationError::EmptyRewriteField { index, field });
                }
            }
        }

        Ok(())
    }

    /// Returns the rewrite at `index`, if any.
    pub fn rewrite(&self, index: usize) -> Option<&RewriteSuggestion> {
        self.rewrites.get(index)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_analysis_deserializes_with_why_field() {
        let json = r#"{
            "scores": {"overall": 72, "skills": 80, "experience": 65, "keywords": 70, "achievements": 40},
            "summary": "Good fit.",
            "missing_keywords": ["Kubernetes"],
            "unverified_skills": [{"skill": "Go", "reason": "Listed only in skills section"}],
            "rewrites": [
                {"original": "a b c", "suggested": "A B C", "why": "one"},
                {"original": "d e f", "suggested": "D E F", "why": "two"},
                {"original": "g h i", "suggested": "G H I", "why": "three"}
            ]
        }"#;
        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.scores.overall, 72);
        assert_eq!(parsed.rewrites[1].rationale, "two");
        assert_eq!(parsed.unverified_skills[0].skill, "Go");
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_unverified_skills_is_optional() {
        let json = r#"{
            "scores": {"overall": 1, "skills": 2, "experience": 3, "keywords": 4, "achievements": 5},
            "summary": "",
            "missing_keywords": [],
            "rewrites": []
        }"#;
        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(parsed.unverified_skills.is_empty());
    }

    #[test]
    fn test_rationale_alias_accepted() {
        let json = r#"{"original": "x", "suggested": "y", "rationale": "z"}"#;
        let parsed: RewriteSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.rationale, "z");
    }

    #[test]
    fn test_negative_score_fails_deserialization() {
        let json = r#"{"overall": -1, "skills": 2, "experience": 3, "keywords": 4, "achievements": 5}"#;
        assert!(serde_json::from_str::<Scores>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_score_above_100() {
        let mut analysis = fixtures::analysis();
        analysis.scores.keywords = 101;
        assert_eq!(
            analysis.validate(),
            Err(AnalysisValidationError::ScoreOutOfRange {
                name: "keywords",
                value: 101
            })
        );
    }

    #[test]
    fn test_validate_rejects_wrong_rewrite_count() {
        let mut analysis = fixtures::analysis();
        analysis.rewrites.pop();
        assert_eq!(
            analysis.validate(),
            Err(AnalysisValidationError::RewriteCount(2))
        );
    }

    #[test]
    fn test_validate_rejects_blank_original() {
        let mut analysis = fixtures::analysis();
        analysis.rewrites[2].original = "   ".to_string();
        assert_eq!(
            analysis.validate(),
            Err(AnalysisValidationError::EmptyRewriteField {
                index: 2,
                field: "original"
            })
        );
    }

    #[test]
    fn test_serializes_rationale_as_why() {
        let value = serde_json::to_value(&fixtures::analysis()).unwrap();
        assert_eq!(value["rewrites"][0]["why"], "Quantifies scope and impact.");
    }
}
