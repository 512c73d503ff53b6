//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;

const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";
const DEFAULT_PLATFORM: &str = "com.daddycoders.ev_charging_finder";
const DEFAULT_LIST_LIMIT: u32 = 100;
const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Remote service coordinates and client tuning, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// API endpoint including the version prefix (e.g. `https://host/v1`)
    pub endpoint: String,
    /// Application/bundle identifier, sent as the user agent
    pub platform: String,
    pub project_id: String,
    /// Storage bucket holding station thumbnails
    pub storage_id: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub stations_collection_id: String,
    pub visited_collection_id: String,
    /// Page size requested from list queries
    pub list_limit: u32,
    /// Upper bound on in-flight detail fetches in visit-history joins
    pub max_concurrent_fetches: usize,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/v1".to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            project_id: "test-project".to_string(),
            storage_id: "test-bucket".to_string(),
            database_id: "test-db".to_string(),
            user_collection_id: "users".to_string(),
            stations_collection_id: "stations".to_string(),
            visited_collection_id: "visited".to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            endpoint: env::var("APPWRITE_ENDPOINT")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            platform: env::var("APPWRITE_PLATFORM")
                .unwrap_or_else(|_| DEFAULT_PLATFORM.to_string()),
            project_id: required("APPWRITE_PROJECT_ID")?,
            storage_id: env::var("APPWRITE_STORAGE_ID").unwrap_or_default(),
            database_id: required("APPWRITE_DATABASE_ID")?,
            user_collection_id: required("APPWRITE_USER_COLLECTION_ID")?,
            stations_collection_id: required("APPWRITE_STATIONS_COLLECTION_ID")?,
            visited_collection_id: required("APPWRITE_VISITED_COLLECTION_ID")?,
            list_limit: parsed("APPWRITE_LIST_LIMIT", DEFAULT_LIST_LIMIT)?,
            max_concurrent_fetches: parsed(
                "APPWRITE_MAX_CONCURRENT_FETCHES",
                DEFAULT_MAX_CONCURRENT_FETCHES,
            )?
            .max(1),
        })
    }

    /// Same settings against a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
