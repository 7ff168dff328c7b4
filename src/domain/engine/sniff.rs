use crate::domain::engine::value::cell_number;
use crate::domain::entities::dataset::{as_record, cell, CellValue, Record};
use crate::domain::entities::view::ColumnKind;

/// Share of non-empty values that must parse as numbers, exclusive.
pub const NUMERIC_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSample<'a> {
    pub values: Vec<&'a CellValue>,
    pub numeric: Vec<f64>,
}

impl<'a> ColumnSample<'a> {
    pub fn collect<I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let values: Vec<&CellValue> = values.into_iter().filter(|v| !v.is_empty()).collect();
        let numeric = values.iter().filter_map(|v| cell_number(v)).collect();
        Self { values, numeric }
    }

    pub fn from_rows<R>(rows: &'a [R], column: &str) -> Self
    where
        R: std::borrow::Borrow<Record>,
    {
        Self::collect(rows.iter().map(|row| cell(as_record(row), column)))
    }

    pub fn total(&self) -> usize {
        self.values.len()
    }

    pub fn kind(&self) -> ColumnKind {
        let total = self.total();
        if total > 0 && self.numeric.len() as f64 > NUMERIC_THRESHOLD * total as f64 {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }
}

/// Classifies a column from its raw values. Null and empty strings are ignored;
/// a column with nothing left is text.
pub fn sniff_column<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a CellValue>,
{
    ColumnSample::collect(values).kind()
}
