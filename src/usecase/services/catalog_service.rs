use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::engine::preview;
use crate::domain::entities::dataset::{Dataset, DatasetDraft, DatasetSort, Record};
use crate::infra::memory::repo::sample_drafts;
use crate::usecase::ports::repo::{DatasetRepository, RepoError};

pub const UNCATEGORIZED: &str = "uncategorized";
pub const NEVER_UPLOADED: &str = "Never";
pub const RECENT_DATASETS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_datasets: usize,
    pub total_rows: i64,
    pub categories: usize,
    pub last_upload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

pub struct CatalogService {
    repo: Arc<dyn DatasetRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn DatasetRepository>) -> Self {
        Self { repo }
    }

    pub fn init(&self) -> Result<(), RepoError> {
        self.repo.init()
    }

    pub fn list_datasets(&self, sort: DatasetSort) -> Result<Vec<Dataset>, RepoError> {
        self.repo.list(sort)
    }

    pub fn create_dataset(&self, draft: DatasetDraft) -> Result<Dataset, RepoError> {
        let dataset = self.repo.create(draft)?;
        info!(dataset_id = %dataset.id, name = %dataset.name, "created dataset");
        Ok(dataset)
    }

    pub fn seed_samples(&self) -> Result<Vec<Dataset>, RepoError> {
        let created = sample_drafts()
            .into_iter()
            .map(|draft| self.create_dataset(draft))
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = created.len(), "seeded sample datasets");
        Ok(created)
    }

    pub fn dashboard(&self) -> Result<(DashboardStats, Vec<CategoryCount>), RepoError> {
        let datasets = self.repo.list(DatasetSort::CreatedDateDesc)?;
        Ok((dashboard_stats(&datasets), category_breakdown(&datasets)))
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<Dataset>, RepoError> {
        let mut datasets = self.repo.list(DatasetSort::CreatedDateDesc)?;
        datasets.truncate(limit);
        Ok(datasets)
    }
}

pub fn draft_preview(draft: &DatasetDraft, limit: usize) -> &[Record] {
    preview(&draft.rows, limit)
}

/// `last_upload` is the creation date of the first dataset in `datasets`, so
/// callers pass a newest-first listing.
pub fn dashboard_stats(datasets: &[Dataset]) -> DashboardStats {
    let categories: HashSet<&str> = datasets
        .iter()
        .map(|dataset| dataset.category.as_str())
        .collect();
    let last_upload = datasets
        .first()
        .map(|dataset| dataset.created_date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| NEVER_UPLOADED.to_string());

    DashboardStats {
        total_datasets: datasets.len(),
        total_rows: datasets.iter().map(|dataset| dataset.row_count).sum(),
        categories: categories.len(),
        last_upload,
    }
}

// Most common first; equal counts keep first-seen order.
pub fn category_breakdown(datasets: &[Dataset]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for dataset in datasets {
        let category = if dataset.category.is_empty() {
            UNCATEGORIZED
        } else {
            dataset.category.as_str()
        };
        match positions.get(category) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(category, counts.len());
                counts.push(CategoryCount {
                    category: category.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
