use std::sync::Arc;

use crate::config::Config;
use crate::mail::EmailService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub email: Arc<EmailService>,
}

impl AppState {
    pub fn new(config: Config, email: EmailService) -> Self {
        Self {
            config: Arc::new(config),
            email: Arc::new(email),
        }
    }
}
