use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use log::debug;

use crate::{page_id::HeapPageID, transaction_id::TransactionID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

struct LockState {
    // one map entry per page; the state per-page is serialized by the
    // outer `Mutex` in `LockManager`.
    holders: HashMap<HeapPageID, Vec<(TransactionID, LockMode)>>,
    held_by_tx: HashMap<TransactionID, HashSet<HeapPageID>>,
}

/// Per-page shared/exclusive locking with upgrade. Access to the map is
/// serialized; every `acquire`/`release`/`holds` call is atomic with
/// respect to every other such call. No wait-for graph: callers retry
/// `acquire` themselves and impose their own timeout.
pub struct LockManager {
    state: Mutex<LockState>,
}

impl LockManager {
    pub fn new() -> LockManager {
        LockManager {
            state: Mutex::new(LockState {
                holders: HashMap::new(),
                held_by_tx: HashMap::new(),
            }),
        }
    }

    /// One atomic acquisition attempt. Returns `true` if the lock is now
    /// held (granted, upgraded, or already idempotently held), `false` if
    /// the request must be retried later.
    pub fn acquire_lock(&self, tid: TransactionID, pid: HeapPageID, mode: LockMode) -> bool {
        let mut state = self.state.lock().unwrap();
        let entry = state.holders.entry(pid).or_insert_with(Vec::new);

        let granted = match entry.iter().position(|(t, _)| *t == tid) {
            Some(idx) => {
                let held_mode = entry[idx].1;
                match (held_mode, mode) {
                    (LockMode::Exclusive, _) => true,
                    (LockMode::Shared, LockMode::Shared) => true,
                    (LockMode::Shared, LockMode::Exclusive) => {
                        if entry.len() == 1 {
                            entry[idx] = (tid, LockMode::Exclusive);
                            true
                        } else {
                            false
                        }
                    }
                }
            }
            None => {
                if entry.is_empty() {
                    entry.push((tid, mode));
                    true
                } else {
                    let any_exclusive = entry.iter().any(|(_, m)| *m == LockMode::Exclusive);
                    if any_exclusive {
                        false
                    } else {
                        match mode {
                            LockMode::Shared => {
                                entry.push((tid, mode));
                                true
                            }
                            LockMode::Exclusive => false,
                        }
                    }
                }
            }
        };

        if granted {
            state
                .held_by_tx
                .entry(tid)
                .or_insert_with(HashSet::new)
                .insert(pid);
            debug!("lock granted: tx={}, mode={:?}, page={}", tid, mode, pid);
        }
        granted
    }

    pub fn release_lock(&self, tid: TransactionID, pid: HeapPageID) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.holders.get_mut(&pid) {
            if let Some(idx) = entry.iter().position(|(t, _)| *t == tid) {
                entry.remove(idx);
            }
            if entry.is_empty() {
                state.holders.remove(&pid);
            }
        }
        if let Some(pages) = state.held_by_tx.get_mut(&tid) {
            pages.remove(&pid);
            if pages.is_empty() {
                state.held_by_tx.remove(&tid);
            }
        }
    }

    pub fn holds_lock(&self, tid: TransactionID, pid: HeapPageID) -> bool {
        let state = self.state.lock().unwrap();
        state
            .holders
            .get(&pid)
            .map(|entry| entry.iter().any(|(t, _)| *t == tid))
            .unwrap_or(false)
    }

    /// Releases every lock held by `tid`; used on transaction completion.
    pub fn release_all(&self, tid: TransactionID) {
        let pages: Vec<HeapPageID> = {
            let state = self.state.lock().unwrap();
            state
                .held_by_tx
                .get(&tid)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default()
        };
        for pid in pages {
            self.release_lock(tid, pid);
        }
    }
}
