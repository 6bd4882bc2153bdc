use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PHOTO_DIR: &str = "./photos";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
}

/// Server settings read from the environment (and `.env`, via dotenv).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Compared against the `X-API-Key` header on admin requests.
    pub admin_secret: String,
    pub database_url: String,
    pub photo_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Self {
            admin_secret: required("ADMIN_SECRET")?,
            database_url: required("DATABASE_URL")?,
            photo_dir: lookup("PHOTO_DIR")
                .filter(|dir| !dir.is_empty())
                .unwrap_or_else(|| DEFAULT_PHOTO_DIR.to_string())
                .into(),
        })
    }
}
