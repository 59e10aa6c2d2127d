use std::sync::Arc;

use warden_auth::Auth;
use warden_observability::Metrics;

/// Shared, read-only state handed to route handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(auth: Auth, metrics: Arc<Metrics>) -> Self {
        Self {
            auth: Arc::new(auth),
            metrics,
        }
    }
}
