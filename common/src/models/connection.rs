//! Connection parameter models.
//!
//! Contains the credentials a client supplies to open the shared pool.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Parameters for the shared PostgreSQL pool.
///
/// All-or-nothing: a record is only usable when every field is non-empty.
/// The port travels as a string, exactly as clients send it.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Validate, ToSchema)]
pub struct ConnectionParams {
    /// Database host.
    #[validate(length(min = 1, message = "host is required"))]
    pub host: String,
    /// Database port.
    #[validate(length(min = 1, message = "port is required"))]
    pub port: String,
    /// Database username.
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Database password (never serialized or logged).
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Database name.
    #[validate(length(min = 1, message = "database is required"))]
    pub database: String,
}

impl ConnectionParams {
    /// Creates a parameter record.
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            username: username.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Returns true when every field is non-empty. Matches the `validate` rules.
    pub fn is_complete(&self) -> bool {
        [
            &self.host,
            &self.port,
            &self.username,
            &self.password,
            &self.database,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }

    /// `host:port/database`, safe to log.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Connection status reported to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectionStatus {
    /// Whether the last lifecycle check found a live pool.
    pub connected: bool,
}

/// Acknowledgement for a successful explicit connect.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectResult {
    /// Always `"success"`.
    pub status: String,
    /// Human-readable message.
    pub message: String,
}

impl ConnectResult {
    /// The acknowledgement returned after a verified connect.
    pub fn connected() -> Self {
        Self {
            status: "success".to_string(),
            message: "Connected to database successfully".to_string(),
        }
    }
}
