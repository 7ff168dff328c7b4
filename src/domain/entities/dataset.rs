use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::engine::value::number_to_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub i64);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(text) => text.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// String coercion used by search, filters, sorting and export.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(number) => number_to_string(*number),
            CellValue::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

pub type Record = BTreeMap<String, CellValue>;

pub fn as_record<R: std::borrow::Borrow<Record>>(row: &R) -> &Record {
    row.borrow()
}

pub fn cell<'a>(row: &'a Record, column: &str) -> &'a CellValue {
    static MISSING: CellValue = CellValue::Null;
    row.get(column).unwrap_or(&MISSING)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl Analysis {
    pub fn top_insights(&self, limit: usize) -> &[String] {
        &self.insights[..self.insights.len().min(limit)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    pub columns: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<Record>,
    pub row_count: i64,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

impl Dataset {
    pub fn from_draft(id: DatasetId, draft: DatasetDraft, created_date: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            file_name: draft.file_name,
            file_url: draft.file_url,
            columns: draft.columns,
            rows: draft.rows,
            row_count: draft.row_count,
            created_date,
            analysis: draft.analysis,
        }
    }

    pub fn category_label(&self) -> String {
        category_label(&self.category)
    }
}

pub fn category_label(category: &str) -> String {
    category.replacen('_', " ", 1)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    pub columns: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<Record>,
    pub row_count: i64,
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetSort {
    #[default]
    Unsorted,
    CreatedDateAsc,
    CreatedDateDesc,
}

impl FromStr for DatasetSort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" => Ok(DatasetSort::Unsorted),
            "created_date" => Ok(DatasetSort::CreatedDateAsc),
            "-created_date" => Ok(DatasetSort::CreatedDateDesc),
            other => Err(format!("unsupported dataset sort: {other}")),
        }
    }
}

impl DatasetSort {
    /// Orders a listing in place; the sort is stable so equal dates keep insertion order.
    pub fn apply(self, datasets: &mut [Dataset]) {
        match self {
            DatasetSort::Unsorted => {}
            DatasetSort::CreatedDateAsc => datasets.sort_by_key(|d| d.created_date),
            DatasetSort::CreatedDateDesc => {
                datasets.sort_by(|a, b| b.created_date.cmp(&a.created_date))
            }
        }
    }
}
