//! Shared application state injected into the Actix handlers as `web::Data`.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<dyn SessionStore>,
}
