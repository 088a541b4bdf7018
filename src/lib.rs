pub mod api;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
