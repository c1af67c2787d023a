//! Shared database pool lifecycle.
//!
//! The service owns exactly one pool. Every request goes through
//! `PoolManager::acquire_pool`, which probes the current pool, rebuilds it from
//! cached credentials when it is gone, and never hands out a pool that has not
//! just passed its liveness probe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::ConnectionParams;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};

use crate::credentials::CredentialStore;

/// Query used to confirm a pool is usable.
const LIVENESS_PROBE: &str = "SELECT 1";

/// Characters left as-is in the userinfo part of the URL (RFC 3986 unreserved).
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Opens, probes and closes pools of one concrete kind.
#[async_trait]
pub trait PoolConnector: Send + Sync + 'static {
    /// Cheaply cloneable pool handle.
    type Pool: Clone + Send + Sync + 'static;

    /// Opens a new pool for the given connection URL.
    async fn open(&self, url: &str) -> AppResult<Self::Pool>;

    /// Runs the liveness probe against the pool.
    async fn probe(&self, pool: &Self::Pool) -> AppResult<()>;

    /// Closes the pool and all its connections.
    async fn close(&self, pool: &Self::Pool);
}

/// PostgreSQL connector backed by `sqlx`.
pub struct PgConnector {
    max_connections: u32,
    timeout: Duration,
}

impl PgConnector {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

#[async_trait]
impl PoolConnector for PgConnector {
    type Pool = PgPool;

    async fn open(&self, url: &str) -> AppResult<PgPool> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.timeout)
            .connect(url)
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))
    }

    async fn probe(&self, pool: &PgPool) -> AppResult<()> {
        sqlx::query(LIVENESS_PROBE)
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))
    }

    async fn close(&self, pool: &PgPool) {
        pool.close().await;
    }
}

/// Builds a `postgres://` URL with percent-encoded credentials.
pub fn build_postgres_url(params: &ConnectionParams) -> String {
    format!(
        "postgres://{}:{}@{}:{}/{}",
        utf8_percent_encode(&params.username, USERINFO),
        utf8_percent_encode(&params.password, USERINFO),
        params.host,
        params.port,
        params.database
    )
}

/// Current pool plus a counter bumped on every swap or recovery attempt.
struct Slot<P> {
    generation: u64,
    pool: Option<P>,
}

/// Owns the single shared pool and its liveness flag.
///
/// Readers clone the handle under a short `slot` lock and probe it without
/// holding any lock. Replacement, reconnection and release are single-flight
/// under `transition`.
pub struct PoolManager<C: PoolConnector = PgConnector> {
    connector: C,
    credentials: CredentialStore,
    slot: RwLock<Slot<C::Pool>>,
    transition: Mutex<()>,
    connected: AtomicBool,
}

impl<C: PoolConnector> PoolManager<C> {
    /// Creates a manager with no pool and no stored credentials.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            credentials: CredentialStore::new(),
            slot: RwLock::new(Slot {
                generation: 0,
                pool: None,
            }),
            transition: Mutex::new(()),
            connected: AtomicBool::new(false),
        }
    }

    /// Returns a freshly verified pool, or `None` when none can be obtained.
    ///
    /// - Complete `params`: replace the current pool with a new one built from
    ///   them. Failures are returned to the caller.
    /// - Otherwise: probe the current pool; if it is gone or dead, rebuild it
    ///   from the stored credentials. Failures are logged and yield `Ok(None)`.
    pub async fn acquire_pool(
        &self,
        params: Option<ConnectionParams>,
    ) -> AppResult<Option<C::Pool>> {
        if let Some(params) = params.filter(ConnectionParams::is_complete) {
            return self.replace(params).await.map(Some);
        }

        let (observed, current) = self.snapshot().await;
        if let Some(pool) = current {
            match self.connector.probe(&pool).await {
                Ok(()) => {
                    self.set_connected(true);
                    return Ok(Some(pool));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Existing pool failed liveness probe, discarding it");
                }
            }
        }

        Ok(self.recover(observed).await)
    }

    /// Explicit connect with user-supplied credentials.
    pub async fn connect(&self, params: ConnectionParams) -> AppResult<C::Pool> {
        if !params.is_complete() {
            return Err(AppError::Validation(
                "host, port, username, password and database are all required".into(),
            ));
        }
        self.replace(params).await
    }

    /// Returns a live pool or `ServiceUnavailable`.
    pub async fn require_pool(&self) -> AppResult<C::Pool> {
        self.acquire_pool(None)
            .await?
            .ok_or_else(|| AppError::ServiceUnavailable("Database not connected".into()))
    }

    /// Result of the most recent lifecycle check. Does not probe.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Closes the pool, forgets the stored credentials and marks the manager
    /// disconnected. Safe to call repeatedly.
    pub async fn release_all(&self) {
        let _guard = self.transition.lock().await;
        let old = self.swap(None).await;
        self.credentials.clear().await;
        self.set_connected(false);
        if let Some(pool) = old {
            self.connector.close(&pool).await;
            tracing::info!("Database pool closed");
        }
    }

    async fn snapshot(&self) -> (u64, Option<C::Pool>) {
        let slot = self.slot.read().await;
        (slot.generation, slot.pool.clone())
    }

    /// Installs `pool` and returns the previous one.
    async fn swap(&self, pool: Option<C::Pool>) -> Option<C::Pool> {
        let mut slot = self.slot.write().await;
        slot.generation += 1;
        std::mem::replace(&mut slot.pool, pool)
    }

    async fn replace(&self, params: ConnectionParams) -> AppResult<C::Pool> {
        let _guard = self.transition.lock().await;

        if let Some(old) = self.swap(None).await {
            self.connector.close(&old).await;
        }
        self.set_connected(false);

        tracing::info!(
            target_db = %params.target(),
            username = %params.username,
            "Connecting to database"
        );
        let pool = match self.open_verified(&params).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(target_db = %params.target(), error = %e, "Database connection failed");
                return Err(e);
            }
        };

        self.credentials.store(params).await;
        self.swap(Some(pool.clone())).await;
        self.set_connected(true);
        tracing::info!("Database connection established");
        Ok(pool)
    }

    /// Rebuilds the pool from stored credentials unless another task already
    /// handled the state seen at `observed`.
    async fn recover(&self, observed: u64) -> Option<C::Pool> {
        let _guard = self.transition.lock().await;

        let (generation, current) = self.snapshot().await;
        if generation != observed {
            self.set_connected(current.is_some());
            return current;
        }

        if let Some(dead) = self.swap(None).await {
            self.connector.close(&dead).await;
        }
        self.set_connected(false);

        let params = self
            .credentials
            .snapshot()
            .await
            .filter(ConnectionParams::is_complete)?;

        tracing::info!(
            target_db = %params.target(),
            username = %params.username,
            "Reconnecting with stored credentials"
        );
        match self.open_verified(&params).await {
            Ok(pool) => {
                self.swap(Some(pool.clone())).await;
                self.set_connected(true);
                tracing::info!("Reconnection successful");
                Some(pool)
            }
            Err(e) => {
                tracing::warn!(target_db = %params.target(), error = %e, "Reconnection failed");
                None
            }
        }
    }

    async fn open_verified(&self, params: &ConnectionParams) -> AppResult<C::Pool> {
        let url = build_postgres_url(params);
        let pool = self.connector.open(&url).await?;
        if let Err(e) = self.connector.probe(&pool).await {
            self.connector.close(&pool).await;
            return Err(e);
        }
        Ok(pool)
    }

    fn set_connected(&self, value: bool) {
        self.connected.store(value, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub(crate) async fn stored_credentials(&self) -> Option<ConnectionParams> {
        self.credentials.snapshot().await
    }
}
