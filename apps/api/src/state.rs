use crate::config::Config;
use crate::session::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns every session; handlers never touch session state directly.
    pub orchestrator: Orchestrator,
    pub config: Config,
}
