// All LLM prompt constants for the Analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for resume analysis. Append `JSON_ONLY_SYSTEM` before sending.
pub const ANALYSIS_SYSTEM: &str = "You are an expert technical recruiter and resume reviewer. \
    Compare a resume against a job description and return a structured match report.";

/// Analysis prompt template.
/// Replace: {verbatim_instruction}, {fabrication_instruction}, {resume_text}, {job_description}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{verbatim_instruction}

{fabrication_instruction}

Compare the RESUME against the JOB DESCRIPTION and return a JSON object with this EXACT schema:
{
  "scores": {
    "overall": 0,
    "skills": 0,
    "experience": 0,
    "keywords": 0,
    "achievements": 0
  },
  "summary": "Two or three sentences on overall fit.",
  "missing_keywords": ["keyword from the job description absent from the resume"],
  "unverified_skills": [
    {"skill": "Kubernetes", "reason": "Listed in skills but never used in any role"}
  ],
  "rewrites": [
    {
      "original": "exact passage copied from the resume",
      "suggested": "stronger version of that passage",
      "why": "one sentence on what the rewrite improves"
    }
  ]
}

RULES:
1. Every score is an integer from 0 to 100.
2. `rewrites` contains EXACTLY 3 entries, targeting the weakest bullets for this role.
3. `missing_keywords` lists only terms that matter for the role, most important first.
4. `unverified_skills` may be an empty array.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;
