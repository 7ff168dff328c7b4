use std::borrow::Borrow;
use std::collections::HashSet;

use crate::domain::engine::sniff::ColumnSample;
use crate::domain::engine::value::{safe_div, to_fixed};
use crate::domain::entities::dataset::Record;
use crate::domain::entities::view::{ColumnKind, ColumnStats};

/// `fill_rate` is measured against every row in `rows`, not only the rows that
/// hold a value, so it reports how sparse the column is in the current view.
/// Unknown columns produce an empty text summary.
pub fn column_stats<R: Borrow<Record>>(column: &str, rows: &[R]) -> ColumnStats {
    let sample = ColumnSample::from_rows(rows, column);
    let total = sample.total();
    let unique = sample
        .values
        .iter()
        .map(|value| value.to_display_string())
        .collect::<HashSet<_>>()
        .len();

    if sample.kind() == ColumnKind::Numeric && !sample.numeric.is_empty() {
        let count = sample.numeric.len() as f64;
        let sum: f64 = sample.numeric.iter().sum();
        let min = sample.numeric.iter().copied().fold(f64::INFINITY, f64::min);
        let max = sample
            .numeric
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        return ColumnStats {
            kind: ColumnKind::Numeric,
            total,
            unique,
            average: Some(to_fixed(safe_div(sum, count), 2)),
            min: Some(to_fixed(min, 2)),
            max: Some(to_fixed(max, 2)),
            fill_rate: None,
        };
    }

    let fill_rate = safe_div(total as f64, rows.len() as f64) * 100.0;
    ColumnStats {
        kind: ColumnKind::Text,
        total,
        unique,
        average: None,
        min: None,
        max: None,
        fill_rate: Some(to_fixed(fill_rate, 1)),
    }
}

pub fn summary_stats<R: Borrow<Record>>(
    columns: &[String],
    rows: &[R],
    limit: usize,
) -> Vec<(String, ColumnStats)> {
    columns
        .iter()
        .take(limit)
        .map(|column| (column.clone(), column_stats(column, rows)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::dataset::CellValue;

    fn rows_for(column: &str, values: Vec<CellValue>) -> Vec<Record> {
        values
            .into_iter()
            .map(|value| Record::from([(column.to_string(), value)]))
            .collect()
    }

    #[test]
    fn numeric_column_reports_average_and_range() {
        let rows = rows_for(
            "score",
            vec![10_i64.into(), 20_i64.into(), 30_i64.into()],
        );

        let stats = column_stats("score", &rows);

        assert_eq!(stats.kind, ColumnKind::Numeric);
        assert_eq!(stats.average.as_deref(), Some("20.00"));
        assert_eq!(stats.min.as_deref(), Some("10.00"));
        assert_eq!(stats.max.as_deref(), Some("30.00"));
        assert_eq!(stats.unique, 3);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.fill_rate, None);
    }

    #[test]
    fn text_column_fill_rate_uses_all_rows_in_view() {
        let mut values: Vec<CellValue> = vec!["a".into(), "b".into(), "a".into()];
        values.extend(std::iter::repeat(CellValue::Null).take(4));
        values.extend(std::iter::repeat(CellValue::from("")).take(3));
        let rows = rows_for("name", values);

        let stats = column_stats("name", &rows);

        assert_eq!(stats.kind, ColumnKind::Text);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.unique, 2);
        assert_eq!(stats.fill_rate.as_deref(), Some("30.0"));
    }

    #[test]
    fn zero_rows_give_zero_fill_rate() {
        let rows: Vec<Record> = Vec::new();

        let stats = column_stats("anything", &rows);

        assert_eq!(stats.kind, ColumnKind::Text);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.fill_rate.as_deref(), Some("0.0"));
    }

    #[test]
    fn unique_compares_coerced_strings() {
        let rows = rows_for(
            "code",
            vec![CellValue::Number(1.0), CellValue::from("1"), CellValue::from("2")],
        );

        let stats = column_stats("code", &rows);

        assert_eq!(stats.unique, 2, "number 1 and text \"1\" coerce to the same value");
    }

    #[test]
    fn numeric_stats_ignore_unparseable_minority() {
        let rows = rows_for(
            "price",
            ["1.5", "2.5", "3", "4", "5", "n/a"]
                .into_iter()
                .map(CellValue::from)
                .collect(),
        );

        let stats = column_stats("price", &rows);

        assert_eq!(stats.kind, ColumnKind::Numeric);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.average.as_deref(), Some("3.20"));
        assert_eq!(stats.min.as_deref(), Some("1.50"));
        assert_eq!(stats.max.as_deref(), Some("5.00"));
    }

    #[test]
    fn summary_covers_leading_columns_only() {
        let columns: Vec<String> = ["a", "b", "c"].iter().map(|c| c.to_string()).collect();
        let rows: Vec<Record> = Vec::new();

        let summary = summary_stats(&columns, &rows, 2);

        let names: Vec<&str> = summary.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
