// Cross-cutting prompt fragments shared by the search and tailoring prompts.
// Each module that calls a provider keeps its own prompts.rs alongside it.

/// Appended to generation prompts so the model never pads a resume with fiction.
pub const TRUTHFULNESS_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the candidate's resume and profile. \
    Do NOT invent employers, degrees, dates, metrics, or technologies. \
    Rewording and reordering are allowed; fabrication is not.";

/// Appended to prompts whose reply is parsed as JSON.
pub const JSON_ARRAY_ONLY: &str = "\
    Your ENTIRE reply must be a single JSON array. \
    Do NOT include explanations, reasoning, <think> blocks, or markdown fences.";
