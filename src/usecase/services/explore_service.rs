use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::ExplorerConfig;
use crate::domain::engine::{
    column_stats, filter_rows, paginate, sort_rows, summary_stats, total_pages,
};
use crate::domain::entities::dataset::{Analysis, Dataset, DatasetId, Record};
use crate::domain::entities::view::{ActiveFilters, ColumnStats, SortSpec};
use crate::usecase::ports::repo::{DatasetRepository, RepoError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExploreQuery {
    pub search_term: String,
    pub filters: ActiveFilters,
    pub sort: SortSpec,
    pub page: usize,
}

impl Default for ExploreQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filters: ActiveFilters::new(),
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorerView {
    pub dataset_id: DatasetId,
    pub name: String,
    pub category_label: String,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    /// The dataset's stored `row_count`, which may disagree with its rows.
    pub declared_count: i64,
    pub summary: Vec<(String, ColumnStats)>,
    pub analysis: Option<Analysis>,
}

pub fn build_view(dataset: &Dataset, query: &ExploreQuery, config: &ExplorerConfig) -> ExplorerView {
    let filtered = filter_rows(&dataset.rows, &query.search_term, &query.filters);
    view_of_filtered(dataset, &filtered, &query.sort, query.page, config)
}

/// Summary statistics use the filtered rows in filter order; only the table
/// page is sorted.
pub fn view_of_filtered(
    dataset: &Dataset,
    filtered: &[&Record],
    sort: &SortSpec,
    page: usize,
    config: &ExplorerConfig,
) -> ExplorerView {
    let sorted = sort_rows(filtered, sort);
    let rows = paginate(&sorted, config.page_size, page)
        .iter()
        .map(|row| Record::clone(row))
        .collect();

    let analysis = dataset.analysis.as_ref().map(|analysis| Analysis {
        summary: analysis.summary.clone(),
        insights: analysis.top_insights(config.insight_limit).to_vec(),
    });

    ExplorerView {
        dataset_id: dataset.id,
        name: dataset.name.clone(),
        category_label: dataset.category_label(),
        columns: dataset.columns.clone(),
        rows,
        page,
        total_pages: total_pages(filtered.len(), config.page_size),
        filtered_count: filtered.len(),
        declared_count: dataset.row_count,
        summary: summary_stats(&dataset.columns, filtered, config.summary_columns),
        analysis,
    }
}

pub struct ExploreService {
    repo: Arc<dyn DatasetRepository>,
    config: ExplorerConfig,
}

impl ExploreService {
    pub fn new(repo: Arc<dyn DatasetRepository>, config: ExplorerConfig) -> Self {
        Self { repo, config }
    }

    pub fn explore(&self, id: DatasetId, query: &ExploreQuery) -> Result<ExplorerView, RepoError> {
        let dataset = self.repo.get(id)?;
        let view = build_view(&dataset, query, &self.config);
        debug!(
            dataset_id = %id,
            filtered = view.filtered_count,
            page = view.page,
            "built explorer view"
        );
        Ok(view)
    }

    pub fn column_stats(
        &self,
        id: DatasetId,
        column: &str,
        query: &ExploreQuery,
    ) -> Result<ColumnStats, RepoError> {
        let dataset = self.repo.get(id)?;
        let filtered = filter_rows(&dataset.rows, &query.search_term, &query.filters);
        Ok(column_stats(column, &filtered))
    }
}
