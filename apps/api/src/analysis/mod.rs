// Resume/JD analysis: the structured report and the collaborator that produces it.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod analyzer;
pub mod models;
pub mod prompts;

pub use analyzer::{Analyzer, LlmAnalyzer};
pub use models::AnalysisResult;
