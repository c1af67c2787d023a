//! Application state for the atlas service.

use std::sync::Arc;

use common::config::AppConfig;
use common::errors::AppResult;

use crate::catalog::CatalogService;
use crate::hierarchy::HierarchyService;
use crate::pool_manager::{PgConnector, PoolManager};
use crate::repository::PgAtlasRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool_manager: Arc<PoolManager>,
}

impl AppState {
    /// Creates the state with a disconnected pool manager.
    pub fn new(config: AppConfig) -> Self {
        Self {
            pool_manager: Arc::new(PoolManager::new(PgConnector::new(&config))),
            config,
        }
    }

    /// Repository bound to a freshly verified pool.
    pub async fn repository(&self) -> AppResult<PgAtlasRepository> {
        let pool = self.pool_manager.require_pool().await?;
        Ok(PgAtlasRepository::new(pool))
    }

    pub async fn catalog(&self) -> AppResult<CatalogService<PgAtlasRepository>> {
        Ok(CatalogService::new(self.repository().await?))
    }

    pub async fn hierarchy(&self) -> AppResult<HierarchyService<PgAtlasRepository>> {
        Ok(HierarchyService::new(self.repository().await?))
    }
}
