use std::sync::Arc;

use crate::config::Config;
use crate::jobs::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Data access. `PgJobStore` in production, swappable for tests.
    pub store: Arc<dyn JobStore>,
    pub config: Config,
}
