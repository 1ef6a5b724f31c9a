use std::{
    collections::hash_map::DefaultHasher,
    fs::{File, OpenOptions},
    hash::{Hash, Hasher},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::debug;

use crate::{
    buffer_pool::BufferPool,
    config,
    error::{DbError, DbResult},
    heap_file_iterator::HeapFileIterator,
    heap_page::HeapPage,
    page_id::HeapPageID,
    permissions::Permissions,
    transaction_id::TransactionID,
    tuple::Tuple,
    tuple_desc::TupleDesc,
};

/// One operating-system file whose length is a multiple of `PAGE_SIZE`;
/// page `i` occupies bytes `[i*PAGE_SIZE, (i+1)*PAGE_SIZE)`.
pub struct HeapFile {
    table_id: i32,
    desc: Arc<TupleDesc>,
    path: PathBuf,
    file: Mutex<File>,
    page_size: usize,
}

impl HeapFile {
    pub fn new<P: AsRef<Path>>(path: P, desc: Arc<TupleDesc>) -> DbResult<HeapFile> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let absolute = path
            .canonicalize()
            .unwrap_or_else(|_| path.clone());
        let table_id = hash_path(&absolute);

        debug!("opened heap file {:?} with table_id {}", path, table_id);

        Ok(HeapFile {
            table_id,
            desc,
            path,
            file: Mutex::new(file),
            page_size: config::page_size(),
        })
    }

    pub fn table_id(&self) -> i32 {
        self.table_id
    }

    pub fn tuple_desc(&self) -> Arc<TupleDesc> {
        self.desc.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_pages(&self) -> usize {
        let len = self.file.lock().unwrap().metadata().map(|m| m.len()).unwrap_or(0);
        ((len as usize) + self.page_size - 1) / self.page_size
    }

    /// Opens for read, seeks, and reads exactly `PAGE_SIZE` bytes. Must
    /// close the handle on all exits (the `Mutex` guard does that for us
    /// when it drops).
    pub fn read_page(&self, pid: HeapPageID) -> DbResult<HeapPage> {
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start((pid.page_number * self.page_size) as u64))?;

        let mut buf = vec![0u8; self.page_size];
        file.read_exact(&mut buf).map_err(|e| {
            DbError::illegal_argument(format!(
                "short read for page {}: {}",
                pid, e
            ))
        })?;

        HeapPage::new(pid, self.desc.clone(), &buf, self.page_size)
    }

    /// Opens for read-write, seeks, and writes exactly `PAGE_SIZE` bytes.
    /// Grows the file implicitly when writing beyond current length.
    pub fn write_page(&self, page: &HeapPage) -> DbResult<()> {
        let mut file = self.file.lock().unwrap();
        let pid = page.page_id();
        file.seek(SeekFrom::Start((pid.page_number * self.page_size) as u64))?;
        file.write_all(&page.page_data())?;
        file.flush()?;
        Ok(())
    }

    fn extend_with_empty_page(&self) -> DbResult<usize> {
        let mut file = self.file.lock().unwrap();
        let new_page_number = {
            let len = file.metadata()?.len() as usize;
            len / self.page_size
        };
        file.seek(SeekFrom::Start((new_page_number * self.page_size) as u64))?;
        file.write_all(&vec![0u8; self.page_size])?;
        file.flush()?;
        Ok(new_page_number)
    }

    /// Scans pages `0..numPages()`, acquiring each through the buffer pool
    /// with write permission; the first page with a free slot receives the
    /// tuple. If all pages are full, extends the file by one zero page on
    /// disk, fetches it, and places the tuple there. Returns the pages
    /// that were modified.
    pub fn insert_tuple(
        &self,
        tid: TransactionID,
        t: Tuple,
        buffer_pool: &BufferPool,
    ) -> DbResult<Vec<HeapPageID>> {
        let num_pages = self.num_pages();
        for page_number in 0..num_pages {
            let pid = HeapPageID::new(self.table_id, page_number);
            let page_lock = buffer_pool.get_page(tid, pid, Permissions::ReadWrite)?;
            let has_room = page_lock.read().unwrap().num_empty_slots() > 0;
            if has_room {
                page_lock.write().unwrap().insert_tuple(t)?;
                return Ok(vec![pid]);
            }
        }

        let new_page_number = self.extend_with_empty_page()?;
        let pid = HeapPageID::new(self.table_id, new_page_number);
        let page_lock = buffer_pool.get_page(tid, pid, Permissions::ReadWrite)?;
        page_lock.write().unwrap().insert_tuple(t)?;
        Ok(vec![pid])
    }

    /// Fetches `t.recordId.pageId` with write permission, deletes, and
    /// returns that page.
    pub fn delete_tuple(
        &self,
        tid: TransactionID,
        t: &Tuple,
        buffer_pool: &BufferPool,
    ) -> DbResult<HeapPageID> {
        let rid = t
            .record_id()
            .ok_or_else(|| DbError::illegal_argument("tuple has no record id"))?;
        let page_lock = buffer_pool.get_page(tid, rid.page_id, Permissions::ReadWrite)?;
        page_lock.write().unwrap().delete_tuple(t)?;
        Ok(rid.page_id)
    }

    pub fn iterator(
        self: &Arc<Self>,
        tid: TransactionID,
        buffer_pool: Arc<BufferPool>,
    ) -> HeapFileIterator {
        HeapFileIterator::new(tid, self.clone(), buffer_pool)
    }
}

fn hash_path(path: &Path) -> i32 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish() as i32
}
