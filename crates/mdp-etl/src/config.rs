//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Default OMDb endpoint.
pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Default maximum attempts per title lookup.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between retry attempts in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;

/// Default number of concurrent enrichment lookups.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 10;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/mdp";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    pub omdb: OmdbConfig,
    pub fetch: FetchConfig,
    pub database: DatabaseConfig,
}

/// Configuration for the OMDb enrichment service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    /// Base URL of the metadata service
    pub base_url: String,

    /// Static API credential sent with every lookup
    pub api_key: String,

    /// HTTP timeout per request, in seconds
    pub timeout_secs: u64,

    /// Maximum attempts per title before degrading to an empty result
    pub max_retries: u32,

    /// Fixed delay between attempts, in seconds
    pub retry_delay_secs: u64,
}

/// Fetch coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Number of lookups in flight at once
    pub concurrency: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl EtlConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = EtlConfig {
            omdb: OmdbConfig {
                base_url: std::env::var("OMDB_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_OMDB_BASE_URL.to_string()),
                api_key: std::env::var("OMDB_API_KEY").unwrap_or_default(),
                timeout_secs: std::env::var("OMDB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
                max_retries: std::env::var("OMDB_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_RETRIES),
                retry_delay_secs: std::env::var("OMDB_RETRY_DELAY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_DELAY_SECS),
            },
            fetch: FetchConfig {
                concurrency: std::env::var("ETL_FETCH_CONCURRENCY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_FETCH_CONCURRENCY),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.fetch.concurrency == 0 {
            anyhow::bail!("Fetch concurrency must be greater than 0");
        }

        if self.omdb.max_retries == 0 {
            anyhow::bail!("OMDb max_retries must be greater than 0");
        }

        Ok(())
    }
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            omdb: OmdbConfig::default(),
            fetch: FetchConfig {
                concurrency: DEFAULT_FETCH_CONCURRENCY,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OMDB_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
        }
    }
}

impl OmdbConfig {
    /// Validate service configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("OMDb base URL cannot be empty".to_string());
        }

        if self.api_key.is_empty() {
            return Err("OMDb API key cannot be empty (set OMDB_API_KEY)".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }

        Ok(())
    }
}
