mod common;

use std::sync::Arc;

use small_heap_db::{reset_page_size, DbError, FieldItem, FieldType, HeapFile, HeapPageID, Permissions, TupleDesc, TransactionID};

fn int_schema(width: usize) -> Arc<TupleDesc> {
    let fields = (0..width)
        .map(|i| FieldItem::new(FieldType::Int, Some(format!("f{}", i))))
        .collect();
    Arc::new(TupleDesc::new(fields))
}

#[test]
fn sole_shared_holder_upgrades_without_blocking() {
    reset_page_size();
    let db = common::setup();
    let desc = int_schema(1);
    let path = common::temp_db_path("lock_upgrade");
    let file = Arc::new(HeapFile::new(&path, desc).unwrap());
    db.catalog().add_table(file.clone());

    // force page 0 into existence first.
    let warm = TransactionID::new();
    let pid = HeapPageID::new(file.table_id(), 0);
    db.buffer_pool().get_page(warm, pid, Permissions::ReadWrite).unwrap();
    db.buffer_pool().transaction_complete(warm, true).unwrap();

    let t1 = TransactionID::new();
    db.buffer_pool().get_page(t1, pid, Permissions::ReadOnly).unwrap();
    // no other holder: upgrade must succeed immediately.
    db.buffer_pool().get_page(t1, pid, Permissions::ReadWrite).unwrap();
    db.buffer_pool().transaction_complete(t1, true).unwrap();
}

#[test]
fn contended_upgrade_times_out_and_aborts() {
    reset_page_size();
    let db = common::setup();
    let desc = int_schema(1);
    let path = common::temp_db_path("lock_upgrade_contended");
    let file = Arc::new(HeapFile::new(&path, desc).unwrap());
    db.catalog().add_table(file.clone());

    let pid = HeapPageID::new(file.table_id(), 0);
    let warm = TransactionID::new();
    db.buffer_pool().get_page(warm, pid, Permissions::ReadWrite).unwrap();
    db.buffer_pool().transaction_complete(warm, true).unwrap();

    let t1 = TransactionID::new();
    let t2 = TransactionID::new();
    db.buffer_pool().get_page(t1, pid, Permissions::ReadOnly).unwrap();
    db.buffer_pool().get_page(t2, pid, Permissions::ReadOnly).unwrap();

    let err = db
        .buffer_pool()
        .get_page(t1, pid, Permissions::ReadWrite)
        .unwrap_err();
    assert!(matches!(err, DbError::TransactionAborted { .. }));

    db.buffer_pool().transaction_complete(t1, false).unwrap();
    db.buffer_pool().transaction_complete(t2, false).unwrap();
}
