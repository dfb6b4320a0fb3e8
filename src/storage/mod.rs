pub mod checkpoint;
pub mod flow_table;
pub mod report;

use std::io::Write;
use std::path::Path;

pub use checkpoint::CheckpointStore;
pub use flow_table::FlowTableStore;
pub use report::ReportWriter;

/// Replace `path` with `bytes` via a synced sibling temp file and a rename, so
/// readers only ever see the old or the new content.
pub(crate) fn write_atomic(
    path: &Path,
    bytes: &[u8],
) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }
}
