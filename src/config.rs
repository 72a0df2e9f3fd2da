//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded once in `main` and shared through the application state.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CONTEST_DATA, DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_JUDGE_CONNECT_TIMEOUT_SECONDS,
    DEFAULT_JUDGE_URL, DEFAULT_LOG_LEVEL, DEFAULT_MAX_CODE_BYTES, DEFAULT_RELAY_BUFFER_CHUNKS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub judge: JudgeConfig,
    pub catalog: CatalogConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT verification configuration
///
/// Tokens are issued by the identity service; only the shared secret is needed here.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// Upstream judge configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub url: String,
    pub connect_timeout_secs: u64,
    /// Chunks buffered towards a slow caller before upstream reads pause
    pub relay_buffer_chunks: usize,
}

/// Contest catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub contest_data: PathBuf,
    pub max_code_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_source(&get)?,
            database: DatabaseConfig::from_source(&get)?,
            jwt: JwtConfig::from_source(&get)?,
            judge: JudgeConfig::from_source(&get)?,
            catalog: CatalogConfig::from_source(&get)?,
        })
    }
}

impl ServerConfig {
    fn from_source(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or(get, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format: parse_or(get, "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }
}

impl DatabaseConfig {
    fn from_source(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: require(get, "DATABASE_URL")?,
            max_connections: parse_or(get, "DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl JwtConfig {
    fn from_source(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: require(get, "JWT_SECRET")?,
        })
    }
}

impl JudgeConfig {
    fn from_source(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let relay_buffer_chunks = parse_or(get, "RELAY_BUFFER_CHUNKS", DEFAULT_RELAY_BUFFER_CHUNKS)?;
        if relay_buffer_chunks == 0 {
            return Err(ConfigError::InvalidValue("RELAY_BUFFER_CHUNKS".to_string()));
        }

        Ok(Self {
            url: get("JUDGE_URL").unwrap_or_else(|| DEFAULT_JUDGE_URL.to_string()),
            connect_timeout_secs: parse_or(
                get,
                "JUDGE_CONNECT_TIMEOUT_SECONDS",
                DEFAULT_JUDGE_CONNECT_TIMEOUT_SECONDS,
            )?,
            relay_buffer_chunks,
        })
    }
}

impl CatalogConfig {
    fn from_source(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            contest_data: PathBuf::from(
                get("CONTEST_DATA").unwrap_or_else(|| DEFAULT_CONTEST_DATA.to_string()),
            ),
            max_code_bytes: parse_or(get, "MAX_CODE_BYTES", DEFAULT_MAX_CODE_BYTES)?,
        })
    }
}

fn require(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
