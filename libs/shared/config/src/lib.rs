use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|raw| {
                    raw.parse().map_err(|_| warn!("PORT is not a number, using default")).ok()
                })
                .unwrap_or(3000),
            allowed_origin: env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| {
                warn!("ALLOWED_ORIGIN not set, allowing any origin");
                "*".to_string()
            }),
        }
    }
}
