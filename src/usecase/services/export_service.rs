use std::sync::Arc;

use tracing::info;

use crate::domain::engine::{export_csv, export_file_name, filter_rows};
use crate::domain::entities::dataset::{Dataset, DatasetId, Record};
use crate::usecase::ports::repo::{DatasetRepository, RepoError};
use crate::usecase::services::explore_service::ExploreQuery;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn export_filtered(dataset: &Dataset, filtered: &[&Record]) -> Option<ExportFile> {
    if filtered.is_empty() {
        return None;
    }
    Some(ExportFile {
        file_name: export_file_name(&dataset.name),
        content_type: CSV_CONTENT_TYPE,
        bytes: export_csv(&dataset.columns, filtered).into_bytes(),
    })
}

pub struct ExportService {
    repo: Arc<dyn DatasetRepository>,
}

impl ExportService {
    pub fn new(repo: Arc<dyn DatasetRepository>) -> Self {
        Self { repo }
    }

    pub fn export(
        &self,
        id: DatasetId,
        query: &ExploreQuery,
    ) -> Result<Option<ExportFile>, RepoError> {
        let dataset = self.repo.get(id)?;
        let filtered = filter_rows(&dataset.rows, &query.search_term, &query.filters);
        let file = export_filtered(&dataset, &filtered);
        if let Some(file) = &file {
            info!(
                dataset_id = %id,
                rows = filtered.len(),
                file_name = %file.file_name,
                "exported filtered rows"
            );
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::view::ActiveFilters;
    use crate::infra::memory::repo::InMemoryRepo;

    fn service() -> ExportService {
        ExportService::new(Arc::new(InMemoryRepo::with_samples()))
    }

    #[test]
    fn export_names_file_after_dataset() {
        let file = service()
            .export(DatasetId(2), &ExploreQuery::default())
            .expect("sample dataset should exist")
            .expect("rows should be exported");

        assert_eq!(file.file_name, "Another Sample Dataset_filtered.csv");
        assert_eq!(file.content_type, "text/csv");
        assert_eq!(
            String::from_utf8(file.bytes).expect("utf-8"),
            "product,sales\n\"A\",\"100\"\n\"B\",\"150\""
        );
    }

    #[test]
    fn export_is_unavailable_when_nothing_matches() {
        let query = ExploreQuery {
            filters: ActiveFilters::new().with("product", "zzz"),
            ..ExploreQuery::default()
        };

        let file = service()
            .export(DatasetId(2), &query)
            .expect("sample dataset should exist");

        assert_eq!(file, None);
    }
}
