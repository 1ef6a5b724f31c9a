use crate::field::{FieldItem, FieldType};

/// Ordered sequence of (field-type, optional-name). `get_size` returns the
/// fixed on-disk tuple width.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TupleDesc {
    fields: Vec<FieldItem>,
}

impl TupleDesc {
    pub fn new(fields: Vec<FieldItem>) -> TupleDesc {
        TupleDesc { fields }
    }

    pub fn fields(&self) -> &[FieldItem] {
        &self.fields
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field_type(&self, i: usize) -> FieldType {
        self.fields[i].field_type
    }

    pub fn field_name(&self, i: usize) -> Option<&str> {
        self.fields[i].field_name.as_deref()
    }

    pub fn get_size(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.byte_len()).sum()
    }
}

/// Build a schema of `width` INT columns, named `{prefix}-{i}`. Used
/// throughout tests in place of hand-rolled per-test schemas.
pub fn int_tuple_desc(width: usize, prefix: &str) -> TupleDesc {
    let fields = (0..width)
        .map(|i| FieldItem::new(FieldType::Int, Some(format!("{}-{}", prefix, i))))
        .collect();
    TupleDesc::new(fields)
}
