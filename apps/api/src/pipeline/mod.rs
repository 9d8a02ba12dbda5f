// Session pipeline: per-session state, the scan/tailor orchestrator, the
// in-memory session store, and its HTTP handlers.

pub mod handlers;
pub mod orchestrator;
pub mod session;
pub mod store;

#[cfg(test)]
pub mod testing;
