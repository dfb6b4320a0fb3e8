use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::write_atomic;
use crate::error::StorageError;

/// Writes analysis outputs as pretty JSON documents into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write_json<T>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, StorageError>
    where
        T: Serialize + ?Sized,
    {
        let path = self.dir.join(format!("{}.json", name));
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Output {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        write_atomic(&path, &bytes).map_err(|e| StorageError::Output {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        info!("report_written::{}", path.display());
        Ok(path)
    }
}
