mod aggregator;
mod buffer_pool;
mod catalog;
mod config;
mod database;
mod error;
mod field;
mod heap_file;
mod heap_file_iterator;
mod heap_page;
mod histogram;
mod lock_manager;
mod log;
mod log_file;
mod page_id;
mod permissions;
mod transaction_id;
mod tuple;
mod tuple_desc;
mod types;
mod util;

pub use aggregator::{AggregateOp, IntegerAggregator, StringAggregator};
pub use buffer_pool::BufferPool;
pub use catalog::Catalog;
pub use config::{page_size, reset_page_size, set_page_size, DEFAULT_NUM_PAGES, DEFAULT_PAGE_SIZE};
pub use database::Database;
pub use error::{DbError, DbExceptionKind, DbResult};
pub use field::{Field, FieldItem, FieldType};
pub use heap_file::HeapFile;
pub use heap_file_iterator::HeapFileIterator;
pub use heap_page::HeapPage;
pub use histogram::{IntHistogram, PredicateOp};
pub use lock_manager::LockMode;
pub use log_file::LogManager;
pub use page_id::{HeapPageID, RecordID};
pub use permissions::Permissions;
pub use transaction_id::TransactionID;
pub use tuple::Tuple;
pub use tuple_desc::TupleDesc;
pub use util::init_log;
