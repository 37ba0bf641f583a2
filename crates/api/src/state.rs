use std::sync::Arc;

use services::AppServices;

/// Which pieces of configuration were present at startup.
///
/// Only presence is recorded; values never reach a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvStatus {
    pub db_url_set: bool,
    pub db_name_set: bool,
    pub ai_key_set: bool,
}

/// Process-scoped resources shared by every handler.
pub struct AppState {
    pub services: AppServices,
    pub env: EnvStatus,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices, env: EnvStatus) -> Arc<Self> {
        Arc::new(Self { services, env })
    }
}
