use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::Connection;

use crate::config::ExplorerConfig;
use crate::domain::engine::{export_csv, filter_rows, sort_rows};
use crate::domain::entities::dataset::{
    Analysis, CellValue, DatasetDraft, DatasetId, DatasetSort, Record,
};
use crate::domain::entities::view::{ActiveFilters, SortDirection, SortSpec};
use crate::infra::memory::repo::{sample_drafts, InMemoryRepo};
use crate::infra::sqlite::repo::SqliteRepo;
use crate::infra::sqlite::schema::init_db;
use crate::ui::state::explorer_state::ExplorerState;
use crate::usecase::ports::repo::{DatasetRepository, RepoError};
use crate::usecase::services::catalog_service::CatalogService;
use crate::usecase::services::explore_service::{build_view, ExploreQuery};

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("tabscope-{prefix}-{nanos}"))
}

fn record(pairs: Vec<(&str, CellValue)>) -> Record {
    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

fn product_sales_draft() -> DatasetDraft {
    DatasetDraft {
        name: "Sales".to_string(),
        category: "marketing".to_string(),
        columns: vec!["product".to_string(), "sales".to_string()],
        rows: vec![
            record(vec![("product", "A".into()), ("sales", 100_i64.into())]),
            record(vec![("product", "B".into()), ("sales", 150_i64.into())]),
        ],
        row_count: 2,
        ..DatasetDraft::default()
    }
}

#[test]
fn init_db_creates_required_tables() {
    let temp_dir = unique_test_dir("init-db");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let db_path = temp_dir.join("catalog.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('dataset','column_name','cell','analysis_insight')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 4, "required tables should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_repo_round_trips_values_and_metadata() {
    let temp_dir = unique_test_dir("sqlite-round-trip");
    let repo = SqliteRepo::new(temp_dir.join("catalog.sqlite"));
    repo.init().expect("init should succeed");

    let draft = DatasetDraft {
        name: "Mixed".to_string(),
        description: "values of every kind".to_string(),
        category: "web_scraping".to_string(),
        file_name: "mixed.csv".to_string(),
        file_url: "http://example.com/mixed.csv".to_string(),
        columns: vec!["name".to_string(), "score".to_string(), "note".to_string()],
        rows: vec![
            record(vec![
                ("name", "Ada".into()),
                ("score", 1.5_f64.into()),
                ("note", CellValue::Null),
            ]),
            record(vec![("name", "Grace".into())]),
            Record::new(),
        ],
        row_count: 10,
        analysis: Some(Analysis {
            summary: "mostly complete".to_string(),
            insights: vec!["first".to_string(), "second".to_string()],
        }),
    };

    let created = repo.create(draft.clone()).expect("create should succeed");
    let loaded = repo.get(created.id).expect("get should succeed");

    assert_eq!(loaded, created);
    assert_eq!(loaded.columns, draft.columns);
    assert_eq!(loaded.rows, draft.rows, "null and absent cells should stay distinct");
    assert_eq!(loaded.row_count, 10, "declared count is stored as given");
    assert_eq!(loaded.analysis, draft.analysis);
    assert_eq!(loaded.file_url, "http://example.com/mixed.csv");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_repo_lists_by_created_date() {
    let temp_dir = unique_test_dir("sqlite-list");
    let repo = SqliteRepo::new(temp_dir.join("catalog.sqlite"));
    repo.init().expect("init should succeed");

    let mut ids = Vec::new();
    for draft in sample_drafts() {
        ids.push(repo.create(draft).expect("create should succeed").id);
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let oldest_first: Vec<DatasetId> = repo
        .list(DatasetSort::CreatedDateAsc)
        .expect("list should succeed")
        .iter()
        .map(|dataset| dataset.id)
        .collect();
    let newest_first: Vec<DatasetId> = repo
        .list(DatasetSort::CreatedDateDesc)
        .expect("list should succeed")
        .iter()
        .map(|dataset| dataset.id)
        .collect();

    assert_eq!(oldest_first, ids);
    assert_eq!(newest_first, ids.iter().rev().copied().collect::<Vec<_>>());

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_repo_reports_missing_dataset() {
    let temp_dir = unique_test_dir("sqlite-missing");
    let repo = SqliteRepo::new(temp_dir.join("catalog.sqlite"));
    repo.init().expect("init should succeed");

    let err = repo.get(DatasetId(42)).expect_err("missing id should fail");

    assert_eq!(err, RepoError::NotFound(DatasetId(42)));
    assert_eq!(err.to_string(), "dataset #42 not found");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn in_memory_repo_assigns_sequential_ids() {
    let repo = InMemoryRepo::with_samples();

    let created = repo
        .create(product_sales_draft())
        .expect("create should succeed");
    let listed = repo.list(DatasetSort::Unsorted).expect("list should succeed");
    let newest = repo
        .list(DatasetSort::CreatedDateDesc)
        .expect("list should succeed");

    assert_eq!(created.id, DatasetId(3));
    assert_eq!(listed.len(), 3);
    assert_eq!(newest[0].id, created.id, "new dataset should be newest");
    assert_eq!(
        repo.get(DatasetId(1)).expect("sample should exist").name,
        "Sample Dataset 1"
    );
}

#[test]
fn catalog_dashboard_counts_seeded_samples() {
    let catalog = CatalogService::new(Arc::new(InMemoryRepo::new()));

    let seeded = catalog.seed_samples().expect("seed should succeed");
    let (stats, breakdown) = catalog.dashboard().expect("dashboard should succeed");

    assert_eq!(seeded.len(), 2);
    assert_eq!(stats.total_datasets, 2);
    assert_eq!(stats.total_rows, 4);
    assert_eq!(stats.categories, 2);
    assert_ne!(stats.last_upload, "Never");
    assert_eq!(breakdown.len(), 2);
}

#[test]
fn product_sales_filter_then_sort() {
    let draft = product_sales_draft();
    let filters = ActiveFilters::new().with("sales", "100");

    let filtered = filter_rows(&draft.rows, "", &filters);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0], &draft.rows[0]);

    let sorted = sort_rows(&draft.rows, &SortSpec::by("sales", SortDirection::Desc));
    let products: Vec<String> = sorted
        .iter()
        .map(|row| row["product"].to_display_string())
        .collect();
    assert_eq!(products, vec!["B", "A"]);
}

#[test]
fn export_reparses_with_csv_reader() {
    let columns = vec!["a".to_string(), "b".to_string()];
    let rows = vec![record(vec![("a", "x,y".into()), ("b", 1_i64.into())])];

    let text = export_csv(&columns, &rows);

    let mut reader = csv::ReaderBuilder::new()
        .escape(Some(b'\\'))
        .from_reader(text.as_bytes());
    let headers = reader.headers().expect("header should parse").clone();
    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("rows should parse");

    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "x,y");
    assert_eq!(&records[0][1], "1");
}

#[test]
fn explorer_state_over_sqlite_dataset() {
    let temp_dir = unique_test_dir("explorer-sqlite");
    let repo = SqliteRepo::new(temp_dir.join("catalog.sqlite"));
    repo.init().expect("init should succeed");
    let created = repo
        .create(product_sales_draft())
        .expect("create should succeed");

    let mut state = ExplorerState::new(ExplorerConfig::default());
    state.select_dataset(repo.get(created.id).expect("get should succeed"));
    state.add_filter("sales");
    state.update_filter("sales", "100");

    let view = state.view().expect("dataset is selected");
    assert_eq!(view.filtered_count, 1);
    assert_eq!(view.rows[0]["product"], CellValue::from("A"));

    let query = ExploreQuery {
        filters: state.filters().clone(),
        ..ExploreQuery::default()
    };
    let rebuilt = build_view(
        state.dataset().expect("dataset is selected"),
        &query,
        &ExplorerConfig::default(),
    );
    assert_eq!(rebuilt, view, "state and one-shot view should agree");

    let file = state.export().expect("one row matches");
    assert_eq!(file.file_name, "Sales_filtered.csv");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
