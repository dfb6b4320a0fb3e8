use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use super::write_atomic;
use crate::error::CheckpointError;
use crate::model::CrawlState;

/// Durable home of the crawl frontier.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is a fresh crawl; an unreadable one is an error, never
    /// an empty frontier.
    pub fn load(&self) -> Result<CrawlState, CheckpointError> {
        if !self.path.exists() {
            info!("checkpoint_not_found::starting_fresh::{}", self.path.display());
            return Ok(CrawlState::new());
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|source| CheckpointError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut state: CrawlState = serde_json::from_str(&raw).map_err(|e| CheckpointError::Corrupted {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        state.rebuild_pending();

        info!(
            "checkpoint_loaded::{}::queued::{}::completed::{}::partial::{}",
            self.path.display(),
            state.queue.len(),
            state.completed.len(),
            state.partial.len()
        );
        Ok(state)
    }

    pub fn save(
        &self,
        state: &CrawlState,
    ) -> Result<(), CheckpointError> {
        let bytes = serde_json::to_vec_pretty(state).map_err(|e| CheckpointError::Serialize(e.to_string()))?;
        write_atomic(&self.path, &bytes).map_err(|source| CheckpointError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("checkpoint_saved::queued::{}::completed::{}", state.queue.len(), state.completed.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Address;

    #[test]
    fn test_missing_checkpoint_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("tracer_state.json"));
        let state = store.load().unwrap();
        assert!(state.is_empty());
        assert!(state.completed.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("tracer_state.json"));
        let mut state = CrawlState::new();
        state.enqueue(Address::from("kaspa:a"), 2, false);
        state.mark_completed(Address::from("kaspa:b"), false);
        store.save(&state).unwrap();

        let mut loaded = store.load().unwrap();
        assert_eq!(loaded.queue, state.queue);
        assert_eq!(loaded.completed, state.completed);
        assert!(!loaded.enqueue(Address::from("kaspa:a"), 2, false));
    }

    #[test]
    fn test_corrupt_checkpoint_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracer_state.json");
        std::fs::write(&path, "{\"queue\": [").unwrap();
        let err = CheckpointStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CheckpointError::Corrupted { .. }));
    }
}
