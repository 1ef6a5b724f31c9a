use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque unique identifier for a transaction. Value equality only; a
/// `TransactionID` carries no state of its own, just an identity that the
/// lock manager and buffer pool key their bookkeeping on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionID {
    id: u64,
}

impl TransactionID {
    pub fn new() -> TransactionID {
        let id = NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed);
        TransactionID { id }
    }
}

impl Default for TransactionID {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tx_{}", self.id)
    }
}
