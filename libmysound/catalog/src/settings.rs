use std::env;
use std::time::Duration;

use tracing::info;

pub const BASE_URL_VAR: &str = "MYSOUND_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct CatalogSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Retries for transient failures, with exponential backoff between attempts.
    pub max_retries: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(15),
            max_retries: 3,
        }
    }
}

impl CatalogSettings {
    /// Defaults, with the backend location overridable through `MYSOUND_BASE_URL` (a `.env` file in
    /// the working directory is honored too).
    pub fn from_env() -> Self {
        dotenvy::from_path("./.env").unwrap_or_default();
        let mut settings = Self::default();
        if let Ok(base_url) = env::var(BASE_URL_VAR)
            && !base_url.trim().is_empty()
        {
            info!("Using base url from environment: {base_url}");
            settings.base_url = base_url.trim().to_owned();
        }
        settings
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
