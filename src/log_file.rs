use std::sync::Mutex;

use log::debug;

use crate::{error::DbResult, transaction_id::TransactionID};

struct LogRecord {
    tid: TransactionID,
    before: Vec<u8>,
    after: Vec<u8>,
}

/// In-process, in-memory write-ahead log. Records are appended by
/// `log_write` before the corresponding page write reaches disk; `force`
/// is the durability point callers must cross before writing the page
/// itself.
pub struct LogManager {
    records: Mutex<Vec<LogRecord>>,
}

impl LogManager {
    pub fn new() -> LogManager {
        LogManager {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn log_write(&self, tid: TransactionID, before: Vec<u8>, after: Vec<u8>) -> DbResult<()> {
        debug!("log_write: tx={}, before_len={}, after_len={}", tid, before.len(), after.len());
        self.records.lock().unwrap().push(LogRecord { tid, before, after });
        Ok(())
    }

    /// Durability barrier: once this returns, every record appended so far
    /// is considered durable. The in-memory log has nothing further to
    /// flush; this exists so callers observe the same ordering contract
    /// a disk-backed log would impose.
    pub fn force(&self) -> DbResult<()> {
        Ok(())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}
