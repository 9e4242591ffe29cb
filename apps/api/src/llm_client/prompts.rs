// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps quoted resume passages locatable in the source text.
pub const VERBATIM_INSTRUCTION: &str = "\
    CRITICAL: Every `original` value you return must be copied character-for-character \
    from the resume text, including punctuation and capitalization. \
    Do NOT paraphrase, shorten, merge, or reformat the quoted passage. \
    Quote a single bullet or sentence, never text spanning two bullets.";

/// Instruction to keep suggested rewrites honest.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Suggested rewrites may sharpen wording and surface metrics already implied \
    by the resume, but must NOT invent employers, titles, technologies, or numbers. \
    Where a metric would help but is not in the resume, use a placeholder such as [X%].";
