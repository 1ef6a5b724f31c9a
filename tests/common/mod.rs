use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Once,
};

use small_heap_db::{init_log, Database};

static INIT: Once = Once::new();
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Log init once per process, fresh state per test otherwise: a new
/// `Database` rather than a cleared global one, since there is no global
/// instance here.
pub fn setup() -> Arc<Database> {
    INIT.call_once(init_log);
    Arc::new(Database::with_pool_size(50))
}

pub fn setup_with_pool_size(num_pages: usize) -> Arc<Database> {
    INIT.call_once(init_log);
    Arc::new(Database::with_pool_size(num_pages))
}

/// A fresh, process-unique path under the system temp dir. Avoids a
/// `tempfile` dependency for something this disposable.
pub fn temp_db_path(label: &str) -> std::path::PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("small_heap_db_it_{}_{}.db", label, n))
}
