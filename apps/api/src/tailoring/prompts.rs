// All prompt constants for the tailoring module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// The generation provider model, shared by both tailoring calls.
pub const TAILOR_MODEL: &str = "gpt-4.1-mini";

pub const RESUME_TEMPERATURE: f32 = 0.4;
pub const RESUME_MAX_TOKENS: u32 = 2000;
pub const MESSAGE_TEMPERATURE: f32 = 0.5;
pub const MESSAGE_MAX_TOKENS: u32 = 600;

pub const RESUME_SYSTEM: &str = "You are an expert resume writer. \
    You rewrite a candidate's existing resume so it speaks directly to one job posting. \
    You output GitHub-flavored Markdown only, with no commentary before or after.";

/// Tailored resume prompt template.
/// Replace: {truthfulness}, {profile_summary}, {resume_text}, {job_block}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"{truthfulness}

CANDIDATE SUMMARY:
{profile_summary}

BASE RESUME (raw text):
"""
{resume_text}
"""

TARGET JOB:
{job_block}

Produce a tailored resume in Markdown:
1. Keep every truthful fact; reorder sections and bullets so the most relevant come first
2. Mirror the job's vocabulary where the candidate genuinely has the skill
3. Merge or tighten bullets for impact; keep it to one or two pages of text
4. Output ONLY the resume"#;

pub const MESSAGE_SYSTEM: &str = "You write concise, friendly job application emails. \
    Plain text or light Markdown, no commentary before or after.";

/// Outreach message prompt template.
/// Replace: {truthfulness}, {profile_summary}, {must_have}, {job_block}
pub const MESSAGE_PROMPT_TEMPLATE: &str = r#"{truthfulness}

CANDIDATE SUMMARY:
{profile_summary}

CANDIDATE STRENGTHS TO EMPHASIZE:
{must_have}

TARGET JOB:
{job_block}

Write a short application email that:
1. Greets the hiring manager (generic greeting if no name is known)
2. Names the role and the company
3. Highlights three to five points from the candidate's background that match the job
4. Ends with a clear call to action
Do not mention visa or work authorization status."#;
