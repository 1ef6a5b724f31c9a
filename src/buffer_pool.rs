use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockWriteGuard},
    time::{Duration, Instant},
};

use rand::Rng;

use crate::{
    catalog::Catalog,
    config,
    error::{DbError, DbExceptionKind, DbResult},
    lock_manager::LockManager,
    log_file::LogManager,
    page_id::HeapPageID,
    permissions::Permissions,
    transaction_id::TransactionID,
    tuple::Tuple,
    types::Pod,
    util::HandyRwLock,
};

/// Page cache with a hard capacity, transactional page-level locking, and
/// a no-steal eviction policy: a dirty page is never written out except
/// through `flush_page`, so an evicted page is always clean. Every
/// operation on a row or a page passes through here.
pub struct BufferPool {
    num_pages: usize,
    catalog: Arc<Catalog>,
    log_manager: Arc<LogManager>,
    lock_manager: LockManager,
    pages: RwLock<HashMap<HeapPageID, Pod<crate::heap_page::HeapPage>>>,
}

impl BufferPool {
    pub fn new(num_pages: usize, catalog: Arc<Catalog>, log_manager: Arc<LogManager>) -> BufferPool {
        BufferPool {
            num_pages,
            catalog,
            log_manager,
            lock_manager: LockManager::new(),
            pages: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Acquires the lock the permission implies, retrying with a randomized
    /// per-call timeout. The lock manager only ever makes one atomic
    /// attempt; the retry loop and its deadline live here. The deadline is
    /// computed only after the first attempt fails, so a lock already free
    /// is granted with no sleep at all. If the subsequent fetch fails (miss
    /// with no room to evict, no table registered, disk error), the lock
    /// just granted is released before the error is returned, so the
    /// caller's transaction is never left holding a lock on a page it was
    /// never handed.
    pub fn get_page(
        &self,
        tid: TransactionID,
        pid: HeapPageID,
        perm: Permissions,
    ) -> DbResult<Pod<crate::heap_page::HeapPage>> {
        let mode = perm.to_lock_mode();
        if !self.lock_manager.acquire_lock(tid, pid, mode) {
            let (lo, hi) = config::LOCK_TIMEOUT_MS_RANGE;
            let timeout_ms = rand::thread_rng().gen_range(lo, hi);
            let deadline = Instant::now() + Duration::from_millis(timeout_ms);
            loop {
                std::thread::sleep(Duration::from_millis(10));
                if self.lock_manager.acquire_lock(tid, pid, mode) {
                    break;
                }
                if Instant::now() >= deadline {
                    return Err(DbError::transaction_aborted(format!(
                        "timed out waiting for lock on {}",
                        pid
                    )));
                }
            }
        }
        self.fetch_or_load(pid).map_err(|e| {
            self.lock_manager.release_lock(tid, pid);
            e
        })
    }

    fn fetch_or_load(&self, pid: HeapPageID) -> DbResult<Pod<crate::heap_page::HeapPage>> {
        if let Some(page) = self.pages.rl().get(&pid) {
            return Ok(page.clone());
        }

        let file = self
            .catalog
            .get_database_file(pid.table_id)
            .ok_or_else(|| DbError::illegal_argument(format!("no table registered for {}", pid)))?;
        let page = file.read_page(pid)?;

        let mut pages = self.pages.wl();
        if let Some(existing) = pages.get(&pid) {
            return Ok(existing.clone());
        }
        if pages.len() >= self.num_pages {
            self.evict_one(&mut pages)?;
        }
        let pod: Pod<crate::heap_page::HeapPage> = Arc::new(RwLock::new(page));
        pages.insert(pid, pod.clone());
        Ok(pod)
    }

    fn evict_one(
        &self,
        pages: &mut RwLockWriteGuard<HashMap<HeapPageID, Pod<crate::heap_page::HeapPage>>>,
    ) -> DbResult<()> {
        let victim = pages
            .iter()
            .find(|(_, p)| p.read().unwrap().is_dirty().is_none())
            .map(|(k, _)| *k);
        match victim {
            Some(pid) => {
                pages.remove(&pid);
                Ok(())
            }
            None => Err(DbError::db_exception(
                DbExceptionKind::AllDirty,
                "no clean page available for eviction",
            )),
        }
    }

    pub fn insert_tuple(&self, tid: TransactionID, table_id: i32, t: Tuple) -> DbResult<()> {
        let file = self
            .catalog
            .get_database_file(table_id)
            .ok_or_else(|| DbError::illegal_argument(format!("no table with id {}", table_id)))?;
        let touched = file.insert_tuple(tid, t, self)?;
        for pid in touched {
            if let Some(p) = self.pages.rl().get(&pid) {
                p.write().unwrap().mark_dirty(Some(tid));
            }
        }
        Ok(())
    }

    pub fn delete_tuple(&self, tid: TransactionID, t: &Tuple) -> DbResult<()> {
        let rid = t
            .record_id()
            .ok_or_else(|| DbError::illegal_argument("tuple has no record id"))?;
        let file = self
            .catalog
            .get_database_file(rid.page_id.table_id)
            .ok_or_else(|| DbError::illegal_argument(format!("no table with id {}", rid.page_id.table_id)))?;
        let pid = file.delete_tuple(tid, t, self)?;
        if let Some(p) = self.pages.rl().get(&pid) {
            p.write().unwrap().mark_dirty(Some(tid));
        }
        Ok(())
    }

    /// Writes a dirty page's current image to disk, after logging the
    /// before/after images and forcing the log. A clean page is a no-op.
    fn flush_page(&self, pid: HeapPageID) -> DbResult<()> {
        let pod = match self.pages.rl().get(&pid) {
            Some(p) => p.clone(),
            None => return Ok(()),
        };
        let mut page = pod.write().unwrap();
        if let Some(tid) = page.is_dirty() {
            let before = page.get_before_image().page_data();
            let after = page.page_data();
            self.log_manager.log_write(tid, before, after)?;
            self.log_manager.force()?;

            let file = self
                .catalog
                .get_database_file(pid.table_id)
                .ok_or_else(|| DbError::illegal_argument(format!("no table registered for {}", pid)))?;
            file.write_page(&page)?;
            page.mark_dirty(None);
            page.set_before_image();
        }
        Ok(())
    }

    /// On commit, flushes every page the transaction dirtied, then takes a
    /// fresh before-image checkpoint of every resident page. On abort,
    /// reverts each dirtied page in the cache to its before-image, so the
    /// next reader sees pre-transaction state without ever touching disk.
    pub fn transaction_complete(&self, tid: TransactionID, commit: bool) -> DbResult<()> {
        let dirty_pids: Vec<HeapPageID> = self
            .pages
            .rl()
            .iter()
            .filter(|(_, p)| p.read().unwrap().is_dirty() == Some(tid))
            .map(|(k, _)| *k)
            .collect();

        if commit {
            for pid in dirty_pids {
                self.flush_page(pid)?;
            }
            for pod in self.pages.rl().values() {
                pod.read().unwrap().set_before_image();
            }
        } else {
            for pid in dirty_pids {
                let pod = self.pages.rl().get(&pid).cloned();
                if let Some(pod) = pod {
                    let restored = pod.read().unwrap().get_before_image();
                    *pod.write().unwrap() = restored;
                }
            }
        }

        self.lock_manager.release_all(tid);
        Ok(())
    }

    pub fn discard_page(&self, pid: HeapPageID) {
        self.pages.wl().remove(&pid);
    }

    #[cfg(test)]
    pub fn holds_lock(&self, tid: TransactionID, pid: HeapPageID) -> bool {
        self.lock_manager.holds_lock(tid, pid)
    }
}
