use std::env;
use std::time::Duration;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub bulk_concurrency: usize,
    pub smtp: SmtpConfig,
}

/// Upstream SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise.
    pub secure: bool,
    pub user: String,
    pub password: String,
    pub default_from: String,
    pub send_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server_port = var("PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort("PORT"))?;

        let smtp_port: u16 = var("SMTP_PORT")
            .unwrap_or_else(|| "587".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort("SMTP_PORT"))?;

        let secure = match var("SMTP_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue("SMTP_SECURE"))?,
            None => smtp_port == 465,
        };

        let user = var("SMTP_USER").ok_or(ConfigError::Missing("SMTP_USER"))?;
        let password = var("SMTP_PASS").ok_or(ConfigError::Missing("SMTP_PASS"))?;
        let default_from = var("SMTP_FROM").unwrap_or_else(|| user.clone());

        let timeout_secs = var("SMTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("SMTP_TIMEOUT_SECS"))?;

        Ok(Config {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            bulk_concurrency: var("BULK_CONCURRENCY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(4usize)
                .max(1),
            smtp: SmtpConfig {
                host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: smtp_port,
                secure,
                user,
                password,
                default_from,
                send_timeout: Duration::from_secs(timeout_secs.max(1)),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port in {0}")]
    InvalidPort(&'static str),
    #[error("Invalid value for {0}")]
    InvalidValue(&'static str),
    #[error("{0} environment variable is required")]
    Missing(&'static str),
}
