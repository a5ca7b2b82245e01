//! Connection configuration loaded from the environment: `DATABASE_URL`
//! plus optional pool-size overrides.

use once_cell::sync::Lazy;
use std::env;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let min_connections = env::var("DATABASE_MIN_CONNECTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(2);
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(16);
        Self { url, min_connections, max_connections }
    }
}

/// Forces early `.env` loading for callers that don't otherwise touch
/// `DbConfig` first (e.g. standalone migration runners).
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
