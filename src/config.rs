use serde::Deserialize;
use std::time::Duration;

use crate::services::{BasicCredentials, RetryPolicy, UpstreamRequest};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Movie catalog endpoint proxied by `GET /api/v1/movies`
    pub movie_api_url: String,

    /// Basic-auth username for the movie catalog
    #[serde(default)]
    pub api_client: Option<String>,

    /// Basic-auth password for the movie catalog
    #[serde(default)]
    pub api_client_secret: Option<String>,

    /// Verify the catalog's TLS certificate. Turning this off weakens transport security.
    #[serde(default = "default_verify_tls")]
    pub movie_api_verify_tls: bool,

    /// Per-attempt timeout for catalog requests
    #[serde(default = "default_timeout_secs")]
    pub movie_api_timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub movie_api_max_retries: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub movie_api_backoff_base_ms: u64,

    #[serde(default = "default_backoff_max_secs")]
    pub movie_api_backoff_max_secs: u64,

    /// PostgreSQL connection URL. Collections are kept in memory when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL. The request counter is kept in memory when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// How many favourite genres the collection listing reports
    #[serde(default = "default_favourite_genre_count")]
    pub favourite_genre_count: usize,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    4
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_max_secs() -> u64 {
    120
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_favourite_genre_count() -> usize {
    3
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.movie_api_max_retries,
            base_delay: Duration::from_millis(self.movie_api_backoff_base_ms),
            max_delay: Duration::from_secs(self.movie_api_backoff_max_secs),
        }
    }

    pub fn movie_api_timeout(&self) -> Duration {
        Duration::from_secs(self.movie_api_timeout_secs)
    }

    /// The upstream request issued for every movie catalog fetch
    pub fn movie_catalog_request(&self) -> UpstreamRequest {
        let credentials = self.api_client.as_ref().map(|username| BasicCredentials {
            username: username.clone(),
            password: self.api_client_secret.clone(),
        });

        UpstreamRequest {
            url: self.movie_api_url.clone(),
            credentials,
            verify_tls: self.movie_api_verify_tls,
        }
    }
}
