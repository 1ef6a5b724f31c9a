use std::sync::Arc;

use crate::{
    error::{DbError, DbResult},
    field::{Field, FieldItem, FieldType},
    tuple::Tuple,
    tuple_desc::TupleDesc,
};

pub const NO_GROUPING_KEY: &str = "NO_GROUPING_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

#[derive(Clone)]
struct AggState {
    min: i32,
    max: i32,
    sum: i64,
    count: i64,
}

impl AggState {
    fn first(v: i32) -> AggState {
        AggState {
            min: v,
            max: v,
            sum: v as i64,
            count: 1,
        }
    }

    fn merge(&mut self, v: i32) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.sum += v as i64;
        self.count += 1;
    }

    fn value(&self, op: AggregateOp) -> i32 {
        match op {
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
            AggregateOp::Sum => self.sum as i32,
            AggregateOp::Count => self.count as i32,
            AggregateOp::Avg => (self.sum / self.count) as i32,
        }
    }
}

struct Group {
    key: String,
    group_field: Option<Field>,
    state: AggState,
}

/// MIN/MAX/SUM/AVG/COUNT over an integer field, optionally grouped by
/// another field's value. Groups are kept in first-seen order so output
/// tuples come back deterministically.
pub struct IntegerAggregator {
    gbfield: Option<usize>,
    gbfieldtype: Option<FieldType>,
    afield: usize,
    op: AggregateOp,
    groups: Vec<Group>,
}

impl IntegerAggregator {
    pub fn new(
        gbfield: Option<usize>,
        gbfieldtype: Option<FieldType>,
        afield: usize,
        op: AggregateOp,
    ) -> IntegerAggregator {
        IntegerAggregator {
            gbfield,
            gbfieldtype,
            afield,
            op,
            groups: Vec::new(),
        }
    }

    pub fn merge(&mut self, t: &Tuple) -> DbResult<()> {
        let (key, group_field) = self.group_of(t)?;
        let v = t
            .get_field(self.afield)
            .as_int()
            .ok_or_else(|| DbError::illegal_argument("aggregate field is not INT"))?;

        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(g) => g.state.merge(v),
            None => self.groups.push(Group {
                key,
                group_field,
                state: AggState::first(v),
            }),
        }
        Ok(())
    }

    fn group_of(&self, t: &Tuple) -> DbResult<(String, Option<Field>)> {
        match self.gbfield {
            None => Ok((NO_GROUPING_KEY.to_string(), None)),
            Some(gbfield) => {
                let field = t.get_field(gbfield);
                if Some(field.field_type()) != self.gbfieldtype
                    && !matches!(
                        (field.field_type(), self.gbfieldtype),
                        (FieldType::Str(_), Some(FieldType::Str(_)))
                    )
                {
                    return Err(DbError::illegal_argument(
                        "group-by field type does not match configured type",
                    ));
                }
                Ok((field.group_key(), Some(field.clone())))
            }
        }
    }

    pub fn iterator(&self) -> DbResult<Vec<Tuple>> {
        let desc = self.output_desc();
        let mut out = Vec::with_capacity(self.groups.len());
        for g in &self.groups {
            let fields = match &g.group_field {
                Some(gf) => vec![gf.clone(), Field::Int(g.state.value(self.op))],
                None => vec![Field::Int(g.state.value(self.op))],
            };
            out.push(Tuple::new(desc.clone(), fields)?);
        }
        Ok(out)
    }

    fn output_desc(&self) -> Arc<TupleDesc> {
        let mut fields = Vec::new();
        if let Some(ty) = self.gbfieldtype {
            fields.push(FieldItem::new(ty, Some("groupVal".to_string())));
        }
        fields.push(FieldItem::new(FieldType::Int, Some("aggregateVal".to_string())));
        Arc::new(TupleDesc::new(fields))
    }
}

/// COUNT-only aggregator over a string field; any other op is rejected at
/// construction.
pub struct StringAggregator {
    gbfield: Option<usize>,
    gbfieldtype: Option<FieldType>,
    groups: Vec<(String, Option<Field>, i64)>,
}

impl StringAggregator {
    pub fn new(
        gbfield: Option<usize>,
        gbfieldtype: Option<FieldType>,
        op: AggregateOp,
    ) -> DbResult<StringAggregator> {
        if op != AggregateOp::Count {
            return Err(DbError::unsupported_operation(
                "string aggregator only supports COUNT",
            ));
        }
        Ok(StringAggregator {
            gbfield,
            gbfieldtype,
            groups: Vec::new(),
        })
    }

    pub fn merge(&mut self, t: &Tuple, afield: usize) -> DbResult<()> {
        let (key, group_field) = match self.gbfield {
            None => (NO_GROUPING_KEY.to_string(), None),
            Some(gbfield) => {
                let field = t.get_field(gbfield);
                if Some(field.field_type()) != self.gbfieldtype
                    && !matches!(
                        (field.field_type(), self.gbfieldtype),
                        (FieldType::Str(_), Some(FieldType::Str(_)))
                    )
                {
                    return Err(DbError::illegal_argument(
                        "group-by field type does not match configured type",
                    ));
                }
                (field.group_key(), Some(field.clone()))
            }
        };
        // the aggregated field itself only needs to exist; COUNT ignores its value.
        let _ = t.get_field(afield);

        match self.groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, count)) => *count += 1,
            None => self.groups.push((key, group_field, 1)),
        }
        Ok(())
    }

    pub fn iterator(&self) -> DbResult<Vec<Tuple>> {
        let desc = self.output_desc();
        let mut out = Vec::with_capacity(self.groups.len());
        for (_, group_field, count) in &self.groups {
            let fields = match group_field {
                Some(gf) => vec![gf.clone(), Field::Int(*count as i32)],
                None => vec![Field::Int(*count as i32)],
            };
            out.push(Tuple::new(desc.clone(), fields)?);
        }
        Ok(out)
    }

    fn output_desc(&self) -> Arc<TupleDesc> {
        let mut fields = Vec::new();
        if let Some(ty) = self.gbfieldtype {
            fields.push(FieldItem::new(ty, Some("groupVal".to_string())));
        }
        fields.push(FieldItem::new(FieldType::Int, Some("aggregateVal".to_string())));
        Arc::new(TupleDesc::new(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple_desc::int_tuple_desc;

    #[test]
    fn test_group_by_avg() {
        let desc = Arc::new(int_tuple_desc(2, "t"));
        let mut agg = IntegerAggregator::new(Some(0), Some(FieldType::Int), 1, AggregateOp::Avg);
        for (g, v) in [(1, 10), (1, 20), (2, 30), (2, 40)] {
            let t = Tuple::new(desc.clone(), vec![Field::Int(g), Field::Int(v)]).unwrap();
            agg.merge(&t).unwrap();
        }
        let mut results: Vec<(i32, i32)> = agg
            .iterator()
            .unwrap()
            .iter()
            .map(|t| (t.get_field(0).as_int().unwrap(), t.get_field(1).as_int().unwrap()))
            .collect();
        results.sort();
        assert_eq!(results, vec![(1, 15), (2, 35)]);
    }

    #[test]
    fn test_no_grouping_count() {
        let desc = Arc::new(int_tuple_desc(1, "t"));
        let mut agg = IntegerAggregator::new(None, None, 0, AggregateOp::Count);
        for i in 0..5 {
            let t = Tuple::new(desc.clone(), vec![Field::Int(i)]).unwrap();
            agg.merge(&t).unwrap();
        }
        let results = agg.iterator().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get_field(0).as_int().unwrap(), 5);
    }

    #[test]
    fn test_string_aggregator_rejects_non_count() {
        let err = StringAggregator::new(None, None, AggregateOp::Sum).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_string_aggregator_counts_by_group() {
        let desc = Arc::new(TupleDesc::new(vec![
            FieldItem::new(FieldType::Str(8), Some("name".into())),
            FieldItem::new(FieldType::Str(8), Some("city".into())),
        ]));
        let mut agg = StringAggregator::new(Some(1), Some(FieldType::Str(8)), AggregateOp::Count).unwrap();
        let rows = [("a", "nyc"), ("b", "nyc"), ("c", "sf")];
        for (name, city) in rows {
            let t = Tuple::new(
                desc.clone(),
                vec![Field::Str(name.to_string()), Field::Str(city.to_string())],
            )
            .unwrap();
            agg.merge(&t, 0).unwrap();
        }
        let results = agg.iterator().unwrap();
        assert_eq!(results.len(), 2);
        let total: i32 = results.iter().map(|t| t.get_field(1).as_int().unwrap()).sum();
        assert_eq!(total, 3);
    }
}
