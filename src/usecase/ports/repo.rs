use thiserror::Error;

use crate::domain::entities::dataset::{Dataset, DatasetDraft, DatasetId, DatasetSort};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("dataset #{0} not found")]
    NotFound(DatasetId),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Source of datasets for the explorer. Implementations are injected; the
/// engine only ever reads `columns` and `rows` from what they return.
pub trait DatasetRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn list(&self, sort: DatasetSort) -> Result<Vec<Dataset>, RepoError>;
    fn create(&self, draft: DatasetDraft) -> Result<Dataset, RepoError>;
    fn get(&self, id: DatasetId) -> Result<Dataset, RepoError>;
}
