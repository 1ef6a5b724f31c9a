use std::sync::Arc;

use crate::{buffer_pool::BufferPool, catalog::Catalog, config, log_file::LogManager};

/// Owns one storage engine instance: a catalog, a buffer pool, and a log
/// manager, wired together explicitly at construction. There is no global
/// instance to reach for; every caller holds (or is handed) an
/// `Arc<Database>` and threads it through.
pub struct Database {
    catalog: Arc<Catalog>,
    buffer_pool: Arc<BufferPool>,
    log_manager: Arc<LogManager>,
}

impl Database {
    pub fn new() -> Database {
        Self::with_pool_size(config::DEFAULT_NUM_PAGES)
    }

    pub fn with_pool_size(num_pages: usize) -> Database {
        let catalog = Arc::new(Catalog::new());
        let log_manager = Arc::new(LogManager::new());
        let buffer_pool = Arc::new(BufferPool::new(num_pages, catalog.clone(), log_manager.clone()));
        Database {
            catalog,
            buffer_pool,
            log_manager,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.buffer_pool
    }

    pub fn log_manager(&self) -> &Arc<LogManager> {
        &self.log_manager
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
