//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use crate::models::Subscriber;
use crate::{AppError, AppResult};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default subscriber pool seeded into an empty directory
pub const DEFAULT_SEED_MSISDNS: [&str; 10] = [
    "79001112233",
    "79002223344",
    "79003334455",
    "79004445566",
    "79005556677",
    "79006667788",
    "79007778899",
    "79008889900",
    "79009990011",
    "79000001122",
];

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

/// Which record store backs the engine
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process store, lost on restart
    #[default]
    Memory,
    /// PostgreSQL via sqlx
    Postgres,
}

/// Storage selection
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL, required for the postgres backend
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Directory CDR reports are written to
    #[serde(default = "default_reports_dir")]
    pub directory: PathBuf,
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: default_reports_dir(),
        }
    }
}

/// Subscriber seed configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Numbers inserted when the directory is empty
    #[serde(default = "default_seed_msisdns")]
    pub msisdns: Vec<String>,
}

fn default_seed_msisdns() -> Vec<String> {
    DEFAULT_SEED_MSISDNS.iter().map(|s| s.to_string()).collect()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            msisdns: default_seed_msisdns(),
        }
    }
}

impl SeedConfig {
    /// Parse the configured numbers into subscribers
    pub fn subscribers(&self) -> AppResult<Vec<Subscriber>> {
        Subscriber::from_numbers(&self.msisdns)
            .map_err(|e| AppError::Config(format!("Invalid seed subscriber: {}", e)))
    }
}

/// Synthetic traffic generator configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Lower bound of the batch size (inclusive)
    #[serde(default = "default_min_records")]
    pub min_records: usize,

    /// Upper bound of the batch size (inclusive)
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Shortest call in seconds (inclusive)
    #[serde(default = "default_min_call_seconds")]
    pub min_call_seconds: i64,

    /// Longest call in seconds (inclusive)
    #[serde(default = "default_max_call_seconds")]
    pub max_call_seconds: i64,

    /// Length of the trailing window call starts are drawn from
    #[serde(default = "default_window_months")]
    pub window_months: u32,

    /// Generate one batch at process start
    #[serde(default = "default_on_startup")]
    pub on_startup: bool,
}

fn default_min_records() -> usize {
    500
}

fn default_max_records() -> usize {
    1000
}

fn default_min_call_seconds() -> i64 {
    10
}

fn default_max_call_seconds() -> i64 {
    1800
}

fn default_window_months() -> u32 {
    12
}

fn default_on_startup() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_records: default_min_records(),
            max_records: default_max_records(),
            min_call_seconds: default_min_call_seconds(),
            max_call_seconds: default_max_call_seconds(),
            window_months: default_window_months(),
            on_startup: default_on_startup(),
        }
    }
}

impl GeneratorConfig {
    /// Reject empty or inverted ranges
    pub fn validate(&self) -> AppResult<()> {
        if self.min_records == 0 || self.min_records > self.max_records {
            return Err(AppError::Config(format!(
                "generator record range [{}, {}] is invalid",
                self.min_records, self.max_records
            )));
        }
        if self.min_call_seconds <= 0 || self.min_call_seconds > self.max_call_seconds {
            return Err(AppError::Config(format!(
                "generator call duration range [{}, {}] is invalid",
                self.min_call_seconds, self.max_call_seconds
            )));
        }
        if self.window_months == 0 {
            return Err(AppError::Config(
                "generator window must be at least one month".to_string(),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("storage.backend", "memory")?
            .set_default("database.max_connections", 10)?
            .set_default("reports.directory", "reports")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with TELEUSAGE_ prefix
            .add_source(
                Environment::with_prefix("TELEUSAGE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("seed.msisdns")
                    .try_parsing(true),
            )
            .build()?;

        tracing::debug!("Configuration loaded for run mode {}", run_mode);

        config.try_deserialize()
    }

    /// Check cross-field constraints the deserializer cannot express
    pub fn validate(&self) -> AppResult<()> {
        self.generator.validate()?;
        self.seed.subscribers()?;

        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(AppError::Config(
                "database.url must be set for the postgres backend".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
