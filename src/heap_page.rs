use std::sync::{Arc, Mutex};

use log::debug;

use crate::{
    error::{DbError, DbExceptionKind, DbResult},
    page_id::{HeapPageID, RecordID},
    transaction_id::TransactionID,
    tuple::Tuple,
    tuple_desc::TupleDesc,
};

/// In-memory image of one disk page of fixed width `page_size`. Slot `i`
/// is `tupleSize` bytes wide; the header is a bitmap of occupancy, bit
/// `i` LSB-first within byte `i/8`.
pub struct HeapPage {
    pid: HeapPageID,
    desc: Arc<TupleDesc>,
    page_size: usize,
    num_slots: usize,
    header: Vec<u8>,
    slots: Vec<Option<Tuple>>,
    before_image: Mutex<Vec<u8>>,
    dirty: Option<TransactionID>,
}

impl HeapPage {
    pub fn num_slots_for(desc: &TupleDesc, page_size: usize) -> usize {
        let tuple_bits = desc.get_size() * 8 + 1;
        (page_size * 8) / tuple_bits
    }

    pub fn header_bytes_for(num_slots: usize) -> usize {
        (num_slots + 7) / 8
    }

    fn is_bit_set(header: &[u8], slot: usize) -> bool {
        let byte = header[slot / 8];
        (byte & (1 << (slot % 8))) != 0
    }

    fn set_bit(header: &mut [u8], slot: usize, value: bool) {
        let mask = 1u8 << (slot % 8);
        if value {
            header[slot / 8] |= mask;
        } else {
            header[slot / 8] &= !mask;
        }
    }

    /// Parses the header, then reads slots in order; occupied slots decode
    /// each field via its type parser, empty slots skip `tupleSize` bytes.
    pub fn new(
        pid: HeapPageID,
        desc: Arc<TupleDesc>,
        bytes: &[u8],
        page_size: usize,
    ) -> DbResult<HeapPage> {
        if bytes.len() != page_size {
            return Err(DbError::illegal_argument(format!(
                "expected {} bytes, got {}",
                page_size,
                bytes.len()
            )));
        }

        let tuple_size = desc.get_size();
        let num_slots = Self::num_slots_for(&desc, page_size);
        let header_len = Self::header_bytes_for(num_slots);
        let header = bytes[0..header_len].to_vec();

        debug!(
            "decoding page {}: num_slots={}, header_len={}, tuple_size={}",
            pid, num_slots, header_len, tuple_size
        );

        let mut slots = Vec::with_capacity(num_slots);
        let mut offset = header_len;
        for slot in 0..num_slots {
            let slot_bytes = &bytes[offset..offset + tuple_size];
            if Self::is_bit_set(&header, slot) {
                let mut tuple = Tuple::decode(desc.clone(), slot_bytes);
                tuple.set_record_id(RecordID::new(pid, slot));
                slots.push(Some(tuple));
            } else {
                slots.push(None);
            }
            offset += tuple_size;
        }

        let page = HeapPage {
            pid,
            desc,
            page_size,
            num_slots,
            header,
            slots,
            before_image: Mutex::new(bytes.to_vec()),
            dirty: None,
        };
        Ok(page)
    }

    /// Builds an empty page (all slots free) — used when a heap file grows.
    pub fn empty(pid: HeapPageID, desc: Arc<TupleDesc>, page_size: usize) -> HeapPage {
        let num_slots = Self::num_slots_for(&desc, page_size);
        let header_len = Self::header_bytes_for(num_slots);
        HeapPage {
            pid,
            desc,
            page_size,
            num_slots,
            header: vec![0u8; header_len],
            slots: vec![None; num_slots],
            before_image: Mutex::new(vec![0u8; page_size]),
            dirty: None,
        }
    }

    pub fn page_id(&self) -> HeapPageID {
        self.pid
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    pub fn num_empty_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn is_slot_used(&self, slot: usize) -> bool {
        self.slots[slot].is_some()
    }

    /// The inverse of `new`; must satisfy the round-trip invariant.
    pub fn page_data(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.page_size);
        out.extend_from_slice(&self.header);

        let tuple_size = self.desc.get_size();
        for slot in &self.slots {
            match slot {
                Some(t) => out.extend(t.encode().expect("resident tuple must encode")),
                None => out.extend(std::iter::repeat(0u8).take(tuple_size)),
            }
        }

        out.resize(self.page_size, 0);
        out
    }

    pub fn insert_tuple(&mut self, mut t: Tuple) -> DbResult<()> {
        if t.desc() != &*self.desc {
            return Err(DbError::db_exception(
                DbExceptionKind::SchemaMismatch,
                "tuple descriptor does not match page schema",
            ));
        }

        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or_else(|| DbError::db_exception(DbExceptionKind::PageFull, "no empty slot"))?;

        t.set_record_id(RecordID::new(self.pid, slot));
        Self::set_bit(&mut self.header, slot, true);
        self.slots[slot] = Some(t);
        debug!("inserted tuple into {} slot {}", self.pid, slot);
        Ok(())
    }

    pub fn delete_tuple(&mut self, t: &Tuple) -> DbResult<()> {
        let rid = t.record_id().ok_or_else(|| {
            DbError::db_exception(DbExceptionKind::TupleMismatch, "tuple has no record id")
        })?;

        if rid.page_id != self.pid {
            return Err(DbError::db_exception(
                DbExceptionKind::TupleMismatch,
                "tuple belongs to a different page",
            ));
        }
        if rid.slot_index >= self.num_slots || self.slots[rid.slot_index].is_none() {
            return Err(DbError::db_exception(
                DbExceptionKind::SlotEmpty,
                "slot is not occupied",
            ));
        }

        let occupant_rid = self.slots[rid.slot_index].as_ref().unwrap().record_id();
        if occupant_rid != Some(rid) {
            return Err(DbError::db_exception(
                DbExceptionKind::TupleMismatch,
                "occupant record id does not match",
            ));
        }

        self.slots[rid.slot_index] = None;
        Self::set_bit(&mut self.header, rid.slot_index, false);
        debug!("deleted tuple from {} slot {}", self.pid, rid.slot_index);
        Ok(())
    }

    pub fn mark_dirty(&mut self, dirty_tid: Option<TransactionID>) {
        self.dirty = dirty_tid;
    }

    pub fn is_dirty(&self) -> Option<TransactionID> {
        self.dirty
    }

    pub fn set_before_image(&self) {
        let bytes = self.page_data();
        *self.before_image.lock().unwrap() = bytes;
    }

    pub fn get_before_image(&self) -> HeapPage {
        let bytes = self.before_image.lock().unwrap().clone();
        HeapPage::new(self.pid, self.desc.clone(), &bytes, self.page_size)
            .expect("before-image bytes must be well-formed")
    }

    /// Lazy, finite, not-restartable sequence of occupied tuples in
    /// ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }
}

impl PartialEq for HeapPage {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid && self.header == other.header && self.slots == other.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DEFAULT_PAGE_SIZE, field::Field, tuple_desc::int_tuple_desc};

    fn make_desc() -> Arc<TupleDesc> {
        Arc::new(int_tuple_desc(2, "t"))
    }

    #[test]
    fn test_slot_count_law() {
        let desc = make_desc();
        let num_slots = HeapPage::num_slots_for(&desc, DEFAULT_PAGE_SIZE);
        let tuple_bits = desc.get_size() * 8 + 1;
        assert!(num_slots * tuple_bits <= DEFAULT_PAGE_SIZE * 8);
        assert!(DEFAULT_PAGE_SIZE * 8 < (num_slots + 1) * tuple_bits);
    }

    #[test]
    fn test_round_trip_after_inserts_and_deletes() {
        let desc = make_desc();
        let pid = HeapPageID::new(7, 0);
        let mut page = HeapPage::empty(pid, desc.clone(), DEFAULT_PAGE_SIZE);

        for i in 0..5 {
            let t = Tuple::new(desc.clone(), vec![Field::Int(i), Field::Int(i * 10)]).unwrap();
            page.insert_tuple(t).unwrap();
        }
        // delete the third inserted tuple
        let victim = page.iter().nth(2).unwrap().clone();
        page.delete_tuple(&victim).unwrap();

        let bytes = page.page_data();
        let decoded = HeapPage::new(pid, desc, &bytes, DEFAULT_PAGE_SIZE).unwrap();

        assert_eq!(page.header, decoded.header);
        for slot in 0..page.num_slots() {
            assert_eq!(page.is_slot_used(slot), decoded.is_slot_used(slot));
        }
        let expect: Vec<&Tuple> = page.iter().collect();
        let actual: Vec<&Tuple> = decoded.iter().collect();
        assert_eq!(expect, actual);
    }

    #[test]
    fn test_insert_into_full_page_fails() {
        let desc = make_desc();
        let pid = HeapPageID::new(1, 0);
        let mut page = HeapPage::empty(pid, desc.clone(), DEFAULT_PAGE_SIZE);
        let num_slots = page.num_slots();
        for i in 0..num_slots {
            let t = Tuple::new(desc.clone(), vec![Field::Int(i as i32), Field::Int(0)]).unwrap();
            page.insert_tuple(t).unwrap();
        }
        let overflow = Tuple::new(desc, vec![Field::Int(999), Field::Int(0)]).unwrap();
        let err = page.insert_tuple(overflow).unwrap_err();
        assert_eq!(err.kind(), Some(DbExceptionKind::PageFull));
    }

    #[test]
    fn test_delete_empty_slot_fails() {
        let desc = make_desc();
        let pid = HeapPageID::new(1, 0);
        let mut page = HeapPage::empty(pid, desc.clone(), DEFAULT_PAGE_SIZE);
        let t = Tuple::new(desc, vec![Field::Int(1), Field::Int(2)]).unwrap();
        let mut ghost = t.clone();
        ghost.set_record_id(RecordID::new(pid, 0));
        let err = page.delete_tuple(&ghost).unwrap_err();
        assert_eq!(err.kind(), Some(DbExceptionKind::SlotEmpty));
    }

    #[test]
    fn test_before_image_checkpoint() {
        let desc = make_desc();
        let pid = HeapPageID::new(1, 0);
        let mut page = HeapPage::empty(pid, desc.clone(), DEFAULT_PAGE_SIZE);
        page.set_before_image();
        let clean_image = page.get_before_image();
        assert_eq!(clean_image.num_empty_slots(), page.num_slots());

        let t = Tuple::new(desc, vec![Field::Int(1), Field::Int(2)]).unwrap();
        page.insert_tuple(t).unwrap();

        // before image still reflects the pre-mutation snapshot
        let stale_image = page.get_before_image();
        assert_eq!(stale_image.num_empty_slots(), page.num_slots());

        page.set_before_image();
        let fresh_image = page.get_before_image();
        assert_eq!(fresh_image.num_empty_slots(), page.num_slots() - 1);
    }

    #[test]
    fn test_header_consistency() {
        let desc = make_desc();
        let pid = HeapPageID::new(1, 0);
        let mut page = HeapPage::empty(pid, desc.clone(), DEFAULT_PAGE_SIZE);
        let t = Tuple::new(desc, vec![Field::Int(1), Field::Int(2)]).unwrap();
        page.insert_tuple(t).unwrap();
        for slot in 0..page.num_slots() {
            assert_eq!(page.is_slot_used(slot), slot == 0);
        }
    }
}
