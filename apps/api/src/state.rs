use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::ContentGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The generation pipeline, wired with its LLM client, persona store and policy.
    pub generator: Arc<ContentGenerator>,
    pub config: Config,
}
