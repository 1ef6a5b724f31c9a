mod common;

use std::sync::Arc;

use small_heap_db::{reset_page_size, DbExceptionKind, Field, FieldItem, FieldType, HeapPageID, Permissions, HeapFile, TupleDesc, TransactionID};

fn int_schema(width: usize) -> Arc<TupleDesc> {
    let fields = (0..width)
        .map(|i| FieldItem::new(FieldType::Int, Some(format!("f{}", i))))
        .collect();
    Arc::new(TupleDesc::new(fields))
}

#[test]
fn single_slot_pool_evicts_clean_pages_across_files() {
    reset_page_size();
    let db = common::setup_with_pool_size(1);
    let desc = int_schema(1);

    let file_a = Arc::new(HeapFile::new(common::temp_db_path("evict_a"), desc.clone()).unwrap());
    let file_b = Arc::new(HeapFile::new(common::temp_db_path("evict_b"), desc.clone()).unwrap());
    db.catalog().add_table(file_a.clone());
    db.catalog().add_table(file_b.clone());

    let tid = TransactionID::new();
    let pid_a = HeapPageID::new(file_a.table_id(), 0);
    let pid_b = HeapPageID::new(file_b.table_id(), 0);

    db.buffer_pool().get_page(tid, pid_a, Permissions::ReadOnly).unwrap();
    // page A is clean, so fetching B must evict it rather than fail.
    db.buffer_pool().get_page(tid, pid_b, Permissions::ReadOnly).unwrap();
    db.buffer_pool().transaction_complete(tid, true).unwrap();
}

#[test]
fn dirty_page_cannot_be_evicted() {
    reset_page_size();
    let db = common::setup_with_pool_size(1);
    let desc = int_schema(1);

    let file_a = Arc::new(HeapFile::new(common::temp_db_path("evict_dirty_a"), desc.clone()).unwrap());
    let file_b = Arc::new(HeapFile::new(common::temp_db_path("evict_dirty_b"), desc.clone()).unwrap());
    db.catalog().add_table(file_a.clone());
    db.catalog().add_table(file_b.clone());

    let tid = TransactionID::new();
    let t = make_tuple(&desc, 1);
    db.buffer_pool().insert_tuple(tid, file_a.table_id(), t).unwrap();

    let pid_b = HeapPageID::new(file_b.table_id(), 0);
    let err = db
        .buffer_pool()
        .get_page(tid, pid_b, Permissions::ReadOnly)
        .unwrap_err();
    assert_eq!(err.kind(), Some(DbExceptionKind::AllDirty));

    db.buffer_pool().transaction_complete(tid, false).unwrap();
}

fn make_tuple(desc: &Arc<TupleDesc>, v: i32) -> small_heap_db::Tuple {
    small_heap_db::Tuple::new(desc.clone(), vec![Field::Int(v)]).unwrap()
}
