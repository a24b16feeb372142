use crate::analysis::ComparisonEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stateless engine shared by every request. Default classifier: KeywordSectionClassifier.
    pub engine: ComparisonEngine,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: ComparisonEngine::default(),
        }
    }
}
