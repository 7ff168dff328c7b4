use std::borrow::Borrow;

use crate::domain::entities::dataset::{as_record, cell, Record};

/// The header line is `columns` joined verbatim. Every data field is the cell's
/// string form written as a JSON string literal, so embedded commas, quotes and
/// newlines stay inside one quoted field. Lines are joined with `\n` and there
/// is no trailing newline.
pub fn export_csv<R: Borrow<Record>>(columns: &[String], rows: &[R]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(columns.join(","));
    for row in rows {
        let row = as_record(row);
        let fields: Vec<String> = columns
            .iter()
            .map(|column| quote_field(&cell(row, column).to_display_string()))
            .collect();
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

pub fn export_file_name(dataset_name: &str) -> String {
    format!("{dataset_name}_filtered.csv")
}

fn quote_field(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
