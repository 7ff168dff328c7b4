use tracing::debug;

use crate::config::ExplorerConfig;
use crate::domain::engine::{clamp_page, column_stats, distinct_values, filter_indices, total_pages};
use crate::domain::entities::dataset::{Dataset, Record};
use crate::domain::entities::view::{ActiveFilters, ColumnStats, SortSpec, ALL_VALUES};
use crate::usecase::services::explore_service::{view_of_filtered, ExplorerView};
use crate::usecase::services::export_service::{export_filtered, ExportFile};

/// Every mutator recomputes the filtered row positions before returning.
#[derive(Debug, Clone)]
pub struct ExplorerState {
    config: ExplorerConfig,
    dataset: Option<Dataset>,
    search_term: String,
    filters: ActiveFilters,
    sort: SortSpec,
    page: usize,
    filtered: Vec<usize>,
}

impl ExplorerState {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            dataset: None,
            search_term: String::new(),
            filters: ActiveFilters::new(),
            sort: SortSpec::default(),
            page: 1,
            filtered: Vec::new(),
        }
    }

    pub fn select_dataset(&mut self, dataset: Dataset) {
        debug!(dataset_id = %dataset.id, rows = dataset.rows.len(), "selected dataset");
        self.dataset = Some(dataset);
        self.search_term.clear();
        self.filters.clear();
        self.sort = SortSpec::default();
        self.refilter();
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filters(&self) -> &ActiveFilters {
        &self.filters
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.refilter();
    }

    // Unknown columns and columns that already have a filter are left alone.
    pub fn add_filter(&mut self, column: &str) -> bool {
        if self.filters.contains(column) || !self.has_column(column) {
            return false;
        }
        self.filters.set(column, ALL_VALUES);
        self.refilter();
        true
    }

    pub fn update_filter(&mut self, column: &str, value: impl Into<String>) -> bool {
        if !self.filters.contains(column) {
            return false;
        }
        self.filters.set(column, value);
        self.refilter();
        true
    }

    pub fn remove_filter(&mut self, column: &str) -> bool {
        if self.filters.remove(column).is_none() {
            return false;
        }
        self.refilter();
        true
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refilter();
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
        self.page = 1;
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.config.page_size)
    }

    pub fn next_page(&mut self) {
        if self.page < self.total_pages() {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.total_pages());
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered_rows(&self) -> Vec<&Record> {
        let Some(dataset) = &self.dataset else {
            return Vec::new();
        };
        self.filtered
            .iter()
            .filter_map(|&idx| dataset.rows.get(idx))
            .collect()
    }

    pub fn filterable_columns(&self) -> Vec<&str> {
        let Some(dataset) = &self.dataset else {
            return Vec::new();
        };
        dataset
            .columns
            .iter()
            .map(String::as_str)
            .filter(|column| !self.filters.contains(column))
            .collect()
    }

    pub fn filter_value_options(&self, column: &str) -> Vec<String> {
        let mut options = vec![ALL_VALUES.to_string()];
        if let Some(dataset) = &self.dataset {
            options.extend(distinct_values(
                &dataset.rows,
                column,
                self.config.distinct_value_limit,
            ));
        }
        options
    }

    pub fn column_stats(&self, column: &str) -> Option<ColumnStats> {
        self.dataset.as_ref()?;
        Some(column_stats(column, &self.filtered_rows()))
    }

    pub fn view(&self) -> Option<ExplorerView> {
        let dataset = self.dataset.as_ref()?;
        let filtered = self.filtered_rows();
        Some(view_of_filtered(
            dataset,
            &filtered,
            &self.sort,
            self.page,
            &self.config,
        ))
    }

    pub fn export(&self) -> Option<ExportFile> {
        let dataset = self.dataset.as_ref()?;
        export_filtered(dataset, &self.filtered_rows())
    }

    fn has_column(&self, column: &str) -> bool {
        self.dataset
            .as_ref()
            .is_some_and(|dataset| dataset.columns.iter().any(|c| c == column))
    }

    fn refilter(&mut self) {
        self.filtered = match &self.dataset {
            Some(dataset) => filter_indices(&dataset.rows, &self.search_term, &self.filters),
            None => Vec::new(),
        };
        self.page = 1;
    }
}
