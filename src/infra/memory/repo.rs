use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};
use tracing::debug;

use crate::domain::entities::dataset::{
    Analysis, CellValue, Dataset, DatasetDraft, DatasetId, DatasetSort, Record,
};
use crate::usecase::ports::repo::{DatasetRepository, RepoError};

/// Dataset store held entirely in memory. Ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryRepo {
    datasets: Mutex<Vec<Dataset>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_samples() -> Self {
        let now = Utc::now();
        let drafts = sample_drafts();
        let count = drafts.len();
        let datasets = drafts
            .into_iter()
            .enumerate()
            .map(|(idx, draft)| {
                let age = Duration::minutes((count - idx) as i64);
                Dataset::from_draft(DatasetId(idx as i64 + 1), draft, now - age)
            })
            .collect();
        Self {
            datasets: Mutex::new(datasets),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Dataset>>, RepoError> {
        self.datasets
            .lock()
            .map_err(|_| RepoError::Storage("dataset store lock poisoned".to_string()))
    }
}

impl DatasetRepository for InMemoryRepo {
    fn init(&self) -> Result<(), RepoError> {
        Ok(())
    }

    fn list(&self, sort: DatasetSort) -> Result<Vec<Dataset>, RepoError> {
        let mut datasets = self.lock()?.clone();
        sort.apply(&mut datasets);
        Ok(datasets)
    }

    fn create(&self, draft: DatasetDraft) -> Result<Dataset, RepoError> {
        let mut datasets = self.lock()?;
        let next_id = datasets.iter().map(|d| d.id.0).max().unwrap_or(0) + 1;
        let dataset = Dataset::from_draft(DatasetId(next_id), draft, Utc::now());
        debug!(dataset_id = next_id, rows = dataset.rows.len(), "created in-memory dataset");
        datasets.push(dataset.clone());
        Ok(dataset)
    }

    fn get(&self, id: DatasetId) -> Result<Dataset, RepoError> {
        self.lock()?
            .iter()
            .find(|dataset| dataset.id == id)
            .cloned()
            .ok_or(RepoError::NotFound(id))
    }
}

fn row(pairs: Vec<(&str, CellValue)>) -> Record {
    pairs
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .collect()
}

pub fn sample_drafts() -> Vec<DatasetDraft> {
    vec![
        DatasetDraft {
            name: "Sample Dataset 1".to_string(),
            description: "This is a sample dataset.".to_string(),
            category: "web_scraping".to_string(),
            file_name: "file1.csv".to_string(),
            file_url: "http://example.com/file1.csv".to_string(),
            columns: vec!["id".to_string(), "name".to_string(), "age".to_string()],
            rows: vec![
                row(vec![
                    ("id", 1_i64.into()),
                    ("name", "John Doe".into()),
                    ("age", 30_i64.into()),
                ]),
                row(vec![
                    ("id", 2_i64.into()),
                    ("name", "Jane Smith".into()),
                    ("age", 25_i64.into()),
                ]),
            ],
            row_count: 2,
            analysis: Some(Analysis {
                summary: "This is a sample analysis.".to_string(),
                insights: vec!["Insight 1".to_string(), "Insight 2".to_string()],
            }),
        },
        DatasetDraft {
            name: "Another Sample Dataset".to_string(),
            description: "This is another sample dataset.".to_string(),
            category: "marketing".to_string(),
            file_name: "file2.csv".to_string(),
            file_url: "http://example.com/file2.csv".to_string(),
            columns: vec!["product".to_string(), "sales".to_string()],
            rows: vec![
                row(vec![("product", "A".into()), ("sales", 100_i64.into())]),
                row(vec![("product", "B".into()), ("sales", 150_i64.into())]),
            ],
            row_count: 2,
            analysis: Some(Analysis {
                summary: "Some other analysis.".to_string(),
                insights: vec!["Marketing insight 1".to_string()],
            }),
        },
    ]
}
