use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::domain::entities::dataset::{
    Analysis, CellValue, Dataset, DatasetDraft, DatasetId, DatasetSort, Record,
};
use crate::infra::sqlite::schema::{init_db, open_connection};

pub fn insert_header_names(
    tx: &rusqlite::Transaction<'_>,
    dataset_id: i64,
    headers: &[String],
) -> Result<()> {
    let mut insert_header = tx
        .prepare("INSERT INTO column_name(dataset_id, col_idx, name) VALUES (?1, ?2, ?3)")
        .context("failed to prepare header insert")?;

    for (col_idx, name) in headers.iter().enumerate() {
        insert_header
            .execute(params![dataset_id, col_idx as i64, name])
            .context("failed to insert header")?;
    }

    Ok(())
}

fn cell_to_sql(value: &CellValue) -> Value {
    match value {
        CellValue::Null => Value::Null,
        CellValue::Number(number) => Value::Real(*number),
        CellValue::Text(text) => Value::Text(text.clone()),
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(number) => CellValue::Number(number as f64),
        ValueRef::Real(number) => CellValue::Number(number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn format_created(created: &DateTime<Utc>) -> String {
    created.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn create_dataset_from_draft(
    db_path: &Path,
    draft: &DatasetDraft,
    created_date: DateTime<Utc>,
) -> Result<i64> {
    init_db(db_path)?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start dataset create transaction")?;

    tx.execute(
        "INSERT INTO dataset(name, description, category, file_name, file_url,
                             row_count, stored_rows, created_date, analysis)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            draft.name,
            draft.description,
            draft.category,
            draft.file_name,
            draft.file_url,
            draft.row_count,
            draft.rows.len() as i64,
            format_created(&created_date),
            draft.analysis.as_ref().map(|analysis| analysis.summary.clone()),
        ],
    )
    .context("failed to insert dataset")?;
    let dataset_id = tx.last_insert_rowid();

    insert_header_names(&tx, dataset_id, &draft.columns)?;

    let mut insert_cell = tx
        .prepare("INSERT INTO cell(dataset_id, row_idx, col_idx, value) VALUES (?1, ?2, ?3, ?4)")
        .context("failed to prepare cell insert")?;
    for (row_idx, row) in draft.rows.iter().enumerate() {
        for (col_idx, column) in draft.columns.iter().enumerate() {
            let Some(value) = row.get(column) else {
                continue;
            };
            insert_cell
                .execute(params![
                    dataset_id,
                    row_idx as i64,
                    col_idx as i64,
                    cell_to_sql(value)
                ])
                .context("failed to insert dataset cell")?;
        }
    }
    drop(insert_cell);

    if let Some(analysis) = &draft.analysis {
        let mut insert_insight = tx
            .prepare(
                "INSERT INTO analysis_insight(dataset_id, position, text) VALUES (?1, ?2, ?3)",
            )
            .context("failed to prepare insight insert")?;
        for (position, insight) in analysis.insights.iter().enumerate() {
            insert_insight
                .execute(params![dataset_id, position as i64, insight])
                .context("failed to insert insight")?;
        }
    }

    tx.commit().context("failed to commit dataset create")?;
    Ok(dataset_id)
}

struct DatasetHeader {
    id: i64,
    name: String,
    description: String,
    category: String,
    file_name: String,
    file_url: String,
    row_count: i64,
    stored_rows: i64,
    created_date: String,
    analysis: Option<String>,
}

const HEADER_COLUMNS: &str = "id, name, description, category, file_name, file_url,
                              row_count, stored_rows, created_date, analysis";

fn read_header(row: &rusqlite::Row<'_>) -> rusqlite::Result<DatasetHeader> {
    Ok(DatasetHeader {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        file_name: row.get(4)?,
        file_url: row.get(5)?,
        row_count: row.get(6)?,
        stored_rows: row.get(7)?,
        created_date: row.get(8)?,
        analysis: row.get(9)?,
    })
}

fn hydrate_dataset(conn: &Connection, header: DatasetHeader) -> Result<Dataset> {
    let dataset_id = header.id;

    let mut columns_stmt = conn
        .prepare(
            "SELECT name
             FROM column_name
             WHERE dataset_id = ?1
             ORDER BY col_idx ASC",
        )
        .context("failed to prepare columns query")?;
    let columns = columns_stmt
        .query_map([dataset_id], |row| row.get::<_, String>(0))
        .context("failed to query columns")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect columns")?;
    drop(columns_stmt);

    let mut rows = vec![Record::new(); header.stored_rows.max(0) as usize];
    let mut cell_stmt = conn
        .prepare(
            "SELECT row_idx, col_idx, value
             FROM cell
             WHERE dataset_id = ?1
             ORDER BY row_idx ASC, col_idx ASC",
        )
        .context("failed to prepare cell query")?;
    let mut cell_rows = cell_stmt
        .query([dataset_id])
        .context("failed to run cell query")?;
    while let Some(row) = cell_rows.next().context("failed to read cell row")? {
        let row_idx: i64 = row.get(0).context("failed to read row_idx")?;
        let col_idx: i64 = row.get(1).context("failed to read col_idx")?;
        let value = cell_from_sql(row.get_ref(2).context("failed to read value")?);

        let column = usize::try_from(col_idx)
            .ok()
            .and_then(|idx| columns.get(idx));
        let record = usize::try_from(row_idx)
            .ok()
            .and_then(|idx| rows.get_mut(idx));
        match (column, record) {
            (Some(column), Some(record)) => {
                record.insert(column.clone(), value);
            }
            _ => warn!(dataset_id, row_idx, col_idx, "skipping cell outside stored shape"),
        }
    }
    drop(cell_rows);
    drop(cell_stmt);

    let analysis = match header.analysis {
        Some(summary) => {
            let mut insight_stmt = conn
                .prepare(
                    "SELECT text
                     FROM analysis_insight
                     WHERE dataset_id = ?1
                     ORDER BY position ASC",
                )
                .context("failed to prepare insight query")?;
            let insights = insight_stmt
                .query_map([dataset_id], |row| row.get::<_, String>(0))
                .context("failed to query insights")?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("failed to collect insights")?;
            Some(Analysis { summary, insights })
        }
        None => None,
    };

    let created_date = DateTime::parse_from_rfc3339(&header.created_date)
        .with_context(|| {
            format!(
                "invalid created_date for dataset #{dataset_id}: {}",
                header.created_date
            )
        })?
        .with_timezone(&Utc);

    Ok(Dataset {
        id: DatasetId(dataset_id),
        name: header.name,
        description: header.description,
        category: header.category,
        file_name: header.file_name,
        file_url: header.file_url,
        columns,
        rows,
        row_count: header.row_count,
        created_date,
        analysis,
    })
}

pub fn list_datasets(db_path: &Path, sort: DatasetSort) -> Result<Vec<Dataset>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let order = match sort {
        DatasetSort::Unsorted => "id ASC",
        DatasetSort::CreatedDateAsc => "created_date ASC, id ASC",
        DatasetSort::CreatedDateDesc => "created_date DESC, id ASC",
    };
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {HEADER_COLUMNS}
             FROM dataset
             ORDER BY {order}"
        ))
        .context("failed to prepare datasets query")?;

    let headers = stmt
        .query_map([], read_header)
        .context("failed to query datasets")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect datasets")?;
    drop(stmt);

    headers
        .into_iter()
        .map(|header| hydrate_dataset(&conn, header))
        .collect()
}

pub fn load_dataset(db_path: &Path, dataset_id: i64) -> Result<Option<Dataset>> {
    init_db(db_path)?;
    let conn = open_connection(db_path)?;
    let header = conn
        .query_row(
            &format!("SELECT {HEADER_COLUMNS} FROM dataset WHERE id = ?1"),
            [dataset_id],
            read_header,
        )
        .optional()
        .with_context(|| format!("failed to query dataset #{dataset_id}"))?;

    header
        .map(|header| hydrate_dataset(&conn, header))
        .transpose()
}
