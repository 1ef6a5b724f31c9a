use std::{collections::HashMap, sync::Arc};

use crate::{heap_file::HeapFile, tuple_desc::TupleDesc, util::HandyRwLock};
use std::sync::RwLock;

/// Maps a table id to the open `HeapFile` backing it. Tables are added
/// once, at startup; lookups happen on every buffer pool miss.
pub struct Catalog {
    tables: RwLock<HashMap<i32, Arc<HeapFile>>>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog {
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_table(&self, file: Arc<HeapFile>) {
        self.tables.wl().insert(file.table_id(), file);
    }

    pub fn get_database_file(&self, table_id: i32) -> Option<Arc<HeapFile>> {
        self.tables.rl().get(&table_id).cloned()
    }

    pub fn get_tuple_desc(&self, table_id: i32) -> Option<Arc<TupleDesc>> {
        self.get_database_file(table_id).map(|f| f.tuple_desc())
    }
}
