use std::borrow::Borrow;
use std::collections::HashSet;

use crate::domain::entities::dataset::{as_record, cell, Record};
use crate::domain::entities::view::ActiveFilters;

pub const DISTINCT_VALUE_LIMIT: usize = 20;

/// A row survives when some field contains `search_term` (case-insensitive)
/// and, for each filter, its value at that column contains the filter value
/// (case-insensitive). Null and absent cells read as the empty string. The
/// output keeps the input order.
pub fn filter_rows<'a, R: Borrow<Record>>(
    rows: &'a [R],
    search_term: &str,
    filters: &ActiveFilters,
) -> Vec<&'a Record> {
    let matcher = RowMatcher::new(search_term, filters);
    rows.iter()
        .map(as_record)
        .filter(|row| matcher.matches(row))
        .collect()
}

pub fn filter_indices<R: Borrow<Record>>(
    rows: &[R],
    search_term: &str,
    filters: &ActiveFilters,
) -> Vec<usize> {
    let matcher = RowMatcher::new(search_term, filters);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| matcher.matches(as_record(*row)))
        .map(|(idx, _)| idx)
        .collect()
}

struct RowMatcher {
    search: Option<String>,
    columns: Vec<(String, String)>,
}

impl RowMatcher {
    fn new(search_term: &str, filters: &ActiveFilters) -> Self {
        let search = (!search_term.is_empty()).then(|| search_term.to_lowercase());
        let columns = filters
            .constraining()
            .map(|(column, value)| (column.to_string(), value.to_lowercase()))
            .collect();
        Self { search, columns }
    }

    fn matches(&self, row: &Record) -> bool {
        if let Some(needle) = &self.search {
            let hit = row
                .values()
                .any(|value| value.to_display_string().to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }

        self.columns.iter().all(|(column, needle)| {
            cell(row, column)
                .to_display_string()
                .to_lowercase()
                .contains(needle)
        })
    }
}

pub fn distinct_values<R: Borrow<Record>>(rows: &[R], column: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for row in rows {
        if values.len() >= limit {
            break;
        }
        let value = cell(as_record(row), column).to_display_string();
        if value.is_empty() || seen.contains(&value) {
            continue;
        }
        seen.insert(value.clone());
        values.push(value);
    }
    values
}
