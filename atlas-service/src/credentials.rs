//! In-memory store for the last connection parameters that produced a live pool.

use common::models::ConnectionParams;
use tokio::sync::RwLock;

/// Holds at most one complete `ConnectionParams` record.
#[derive(Default)]
pub struct CredentialStore {
    params: RwLock<Option<ConnectionParams>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored record. Incomplete records are ignored.
    pub async fn store(&self, params: ConnectionParams) {
        if params.is_complete() {
            *self.params.write().await = Some(params);
        }
    }

    /// Returns a copy of the stored record, if any.
    pub async fn snapshot(&self) -> Option<ConnectionParams> {
        self.params.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.params.write().await = None;
    }
}
