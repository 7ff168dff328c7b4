use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::entities::dataset::{Dataset, DatasetDraft, DatasetId, DatasetSort};
use crate::infra::sqlite::queries::{create_dataset_from_draft, list_datasets, load_dataset};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{DatasetRepository, RepoError};

pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl DatasetRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        info!(db_path = %self.db_path.display(), "initialising dataset store");
        init_db(&self.db_path).map_err(|err| RepoError::Storage(err.to_string()))
    }

    fn list(&self, sort: DatasetSort) -> Result<Vec<Dataset>, RepoError> {
        let datasets = list_datasets(&self.db_path, sort)
            .map_err(|err| RepoError::Storage(err.to_string()))?;
        debug!(count = datasets.len(), ?sort, "listed datasets");
        Ok(datasets)
    }

    fn create(&self, draft: DatasetDraft) -> Result<Dataset, RepoError> {
        let created_date = Utc::now();
        let dataset_id = create_dataset_from_draft(&self.db_path, &draft, created_date)
            .map_err(|err| RepoError::Storage(err.to_string()))?;
        info!(dataset_id, rows = draft.rows.len(), name = %draft.name, "stored dataset");

        load_dataset(&self.db_path, dataset_id)
            .map_err(|err| RepoError::Storage(err.to_string()))?
            .ok_or(RepoError::NotFound(DatasetId(dataset_id)))
    }

    fn get(&self, id: DatasetId) -> Result<Dataset, RepoError> {
        load_dataset(&self.db_path, id.0)
            .map_err(|err| RepoError::Storage(err.to_string()))?
            .ok_or(RepoError::NotFound(id))
    }
}
