use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::orchestrator::Pipeline;
use crate::pipeline::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    /// Scan/tailor orchestrator. Provider clients are swappable behind traits.
    pub pipeline: Pipeline,
    pub config: Config,
}
