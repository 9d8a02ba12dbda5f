// Tailoring: per-posting resume + message generation and record assembly.
// All provider calls go through llm_client.

pub mod assembler;
pub mod prompts;
pub mod tailor;
