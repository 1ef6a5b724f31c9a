use std::sync::Arc;

use crate::{
    buffer_pool::BufferPool, error::DbResult, heap_file::HeapFile, page_id::HeapPageID,
    permissions::Permissions, transaction_id::TransactionID, tuple::Tuple,
};

/// Sequential tuple scan through the buffer pool. Opens by fetching page 0
/// with `ReadOnly`, then walks page tuples; when a page is exhausted,
/// advances and fetches the next page until `numPages()` is reached.
/// Internal page iteration is single-pass; `rewind` is `close` then
/// `open`.
pub struct HeapFileIterator {
    tid: TransactionID,
    file: Arc<HeapFile>,
    buffer_pool: Arc<BufferPool>,
    num_pages: usize,
    page_number: usize,
    current: Vec<Tuple>,
    index: usize,
    opened: bool,
}

impl HeapFileIterator {
    pub fn new(tid: TransactionID, file: Arc<HeapFile>, buffer_pool: Arc<BufferPool>) -> Self {
        HeapFileIterator {
            tid,
            file,
            buffer_pool,
            num_pages: 0,
            page_number: 0,
            current: Vec::new(),
            index: 0,
            opened: false,
        }
    }

    pub fn open(&mut self) -> DbResult<()> {
        self.num_pages = self.file.num_pages();
        self.page_number = 0;
        self.index = 0;
        self.current = self.load_page(0)?;
        self.opened = true;
        Ok(())
    }

    pub fn close(&mut self) {
        self.current.clear();
        self.index = 0;
        self.opened = false;
    }

    pub fn rewind(&mut self) -> DbResult<()> {
        self.close();
        self.open()
    }

    fn load_page(&self, page_number: usize) -> DbResult<Vec<Tuple>> {
        if page_number >= self.num_pages {
            return Ok(Vec::new());
        }
        let pid = HeapPageID::new(self.file.table_id(), page_number);
        let page_lock = self
            .buffer_pool
            .get_page(self.tid, pid, Permissions::ReadOnly)?;
        let page = page_lock.read().unwrap();
        Ok(page.iter().cloned().collect())
    }

    /// Returns `None` once every page has been scanned; an error from a
    /// failed page fetch aborts the iteration.
    pub fn try_next(&mut self) -> DbResult<Option<Tuple>> {
        if !self.opened {
            self.open()?;
        }
        loop {
            if self.index < self.current.len() {
                let t = self.current[self.index].clone();
                self.index += 1;
                return Ok(Some(t));
            }
            self.page_number += 1;
            if self.page_number >= self.num_pages {
                return Ok(None);
            }
            self.current = self.load_page(self.page_number)?;
            self.index = 0;
        }
    }
}

impl Iterator for HeapFileIterator {
    type Item = DbResult<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_next() {
            Ok(Some(t)) => Some(Ok(t)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
