// Job discovery: prompt → one provider call → tolerant parse → filter.

pub mod client;
pub mod filters;
pub mod parser;
pub mod prompts;
