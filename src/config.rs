use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::engine::filter::DISTINCT_VALUE_LIMIT;
use crate::domain::engine::pager::{PAGE_SIZE, PREVIEW_ROWS};

pub const SUMMARY_COLUMNS: usize = 5;
pub const INSIGHT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub page_size: usize,
    pub summary_columns: usize,
    pub distinct_value_limit: usize,
    pub insight_limit: usize,
    pub preview_rows: usize,
    pub db_path: Option<PathBuf>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            summary_columns: SUMMARY_COLUMNS,
            distinct_value_limit: DISTINCT_VALUE_LIMIT,
            insight_limit: INSIGHT_LIMIT,
            preview_rows: PREVIEW_ROWS,
            db_path: None,
        }
    }
}

impl ExplorerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Zero sizes and limits fall back to their defaults.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.page_size == 0 {
            self.page_size = defaults.page_size;
        }
        if self.distinct_value_limit == 0 {
            self.distinct_value_limit = defaults.distinct_value_limit;
        }
        if self.preview_rows == 0 {
            self.preview_rows = defaults.preview_rows;
        }
        self
    }

    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "tabscope", "tabscope")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("datasets.sqlite"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}
