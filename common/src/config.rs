//! Service configuration.
//!
//! Values come from environment variables; anything missing or unparsable
//! falls back to a default.

use std::env;
use std::str::FromStr;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default upper bound on pooled database connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Default pool connect/acquire timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration shared by every service binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name, used in logs and response metadata.
    pub service_name: String,
    /// Address to bind the HTTP listener to.
    pub host: String,
    /// Port to bind the HTTP listener to.
    pub port: u16,
    /// Maximum connections held by the shared database pool.
    pub max_connections: u32,
    /// Timeout for opening the pool and for acquiring a connection from it.
    pub connect_timeout_secs: u64,
}

impl AppConfig {
    /// Loads configuration for the named service from the environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SERVER_HOST` | `0.0.0.0` |
    /// | `SERVER_PORT` | `0` (callers override with their own default) |
    /// | `DB_MAX_CONNECTIONS` | `5` |
    /// | `DB_CONNECT_TIMEOUT_SECS` | `10` |
    pub fn load_with_service(service_name: &str) -> Self {
        Self::from_lookup(service_name, |key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service_name: service_name.to_string(),
            host: lookup("SERVER_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(&lookup, "SERVER_PORT").unwrap_or(0),
            max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            connect_timeout_secs: parse_var(&lookup, "DB_CONNECT_TIMEOUT_SECS")
                .filter(|n: &u64| *n > 0)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Returns the `host:port` string to bind to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Loads a `.env` file from the working directory (best-effort, no error if missing).
///
/// Variables already present in the environment win over the file.
pub fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    let Ok(content) = std::fs::read_to_string(env_path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(key, value);
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
