//! Process-wide knobs. `PAGE_SIZE` is settable at process start (for tests
//! that want a tiny page) and resettable to the default.

use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEFAULT_PAGE_SIZE: usize = 4096;
pub const DEFAULT_NUM_PAGES: usize = 50;

/// Lock-wait timeout range, in milliseconds, randomized per `getPage` call.
pub const LOCK_TIMEOUT_MS_RANGE: (u64, u64) = (0, 2000);

static PAGE_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_PAGE_SIZE);

pub fn page_size() -> usize {
    PAGE_SIZE.load(Ordering::Relaxed)
}

pub fn set_page_size(size: usize) {
    PAGE_SIZE.store(size, Ordering::Relaxed);
}

pub fn reset_page_size() {
    set_page_size(DEFAULT_PAGE_SIZE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_round_trip() {
        assert_eq!(page_size(), DEFAULT_PAGE_SIZE);
        set_page_size(1024);
        assert_eq!(page_size(), 1024);
        reset_page_size();
        assert_eq!(page_size(), DEFAULT_PAGE_SIZE);
    }
}
