use std::{fmt, sync::Arc};

use crate::{
    error::{DbError, DbResult},
    field::Field,
    page_id::RecordID,
    tuple_desc::TupleDesc,
};

/// An array of fields matching a `TupleDesc`; carries an optional
/// `RecordID` once placed on a page.
#[derive(Clone, Debug)]
pub struct Tuple {
    desc: Arc<TupleDesc>,
    fields: Vec<Field>,
    record_id: Option<RecordID>,
}

impl Tuple {
    pub fn new(desc: Arc<TupleDesc>, fields: Vec<Field>) -> DbResult<Tuple> {
        if fields.len() != desc.num_fields() {
            return Err(DbError::illegal_argument(format!(
                "expected {} fields, got {}",
                desc.num_fields(),
                fields.len()
            )));
        }
        for (i, field) in fields.iter().enumerate() {
            let matches_kind = match (field, desc.field_type(i)) {
                (Field::Int(_), crate::field::FieldType::Int) => true,
                (Field::Str(_), crate::field::FieldType::Str(_)) => true,
                _ => false,
            };
            if !matches_kind {
                return Err(DbError::illegal_argument(format!(
                    "field {} has type {:?}, expected {}",
                    i,
                    field,
                    desc.field_type(i)
                )));
            }
        }
        Ok(Tuple {
            desc,
            fields,
            record_id: None,
        })
    }

    /// Decode a tuple from its on-disk bytes for the given schema.
    pub fn decode(desc: Arc<TupleDesc>, bytes: &[u8]) -> Tuple {
        let mut fields = Vec::with_capacity(desc.num_fields());
        let mut offset = 0;
        for i in 0..desc.num_fields() {
            let ty = desc.field_type(i);
            let width = ty.byte_len();
            fields.push(ty.decode(&bytes[offset..offset + width]));
            offset += width;
        }
        Tuple {
            desc,
            fields,
            record_id: None,
        }
    }

    pub fn encode(&self) -> DbResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.desc.get_size());
        for (i, field) in self.fields.iter().enumerate() {
            out.extend(self.desc.field_type(i).encode(field)?);
        }
        Ok(out)
    }

    pub fn desc(&self) -> &TupleDesc {
        &self.desc
    }

    pub fn get_field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    pub fn set_field(&mut self, i: usize, field: Field) {
        self.fields[i] = field;
    }

    pub fn record_id(&self) -> Option<RecordID> {
        self.record_id
    }

    pub fn set_record_id(&mut self, record_id: RecordID) {
        self.record_id = Some(record_id);
    }

    pub fn clear_record_id(&mut self) {
        self.record_id = None;
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rendered: Vec<String> = self.fields.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", rendered.join(", "))
    }
}
