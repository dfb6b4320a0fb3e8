use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;

use super::write_atomic;
use crate::constants::FLOW_TABLE_EXTENSION;
use crate::constants::FULL_HISTORY_SUFFIX;
use crate::error::StorageError;
use crate::model::Address;
use crate::model::AddressFlowTable;
use crate::model::DestinationRegistry;
use crate::model::TableFormat;
use crate::model::flow::DirectionalRow;
use crate::model::flow::FullHistoryRow;

/// First line of every table file. `rows` lets a reader detect truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TableHeader {
    address: Address,
    format: TableFormat,
    rows: usize,
}

/// One JSON Lines file per crawled address.
#[derive(Debug, Clone)]
pub struct FlowTableStore {
    dir: PathBuf,
    format: TableFormat,
    registry: DestinationRegistry,
}

impl FlowTableStore {
    pub fn new(
        dir: impl Into<PathBuf>,
        format: TableFormat,
        registry: DestinationRegistry,
    ) -> Self {
        Self {
            dir: dir.into(),
            format,
            registry,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(
        &self,
        address: &Address,
    ) -> PathBuf {
        let suffix = match self.format {
            TableFormat::FullHistory => FULL_HISTORY_SUFFIX,
            TableFormat::Directional => "",
        };
        self.dir
            .join(format!("{}{}.{}", address.file_stem(), suffix, FLOW_TABLE_EXTENSION))
    }

    pub fn exists(
        &self,
        address: &Address,
    ) -> bool {
        self.path_for(address).exists()
    }

    /// Full overwrite of the owner's table.
    pub fn write(
        &self,
        table: &AddressFlowTable,
    ) -> Result<PathBuf, StorageError> {
        let path = self.path_for(&table.owner);
        let write_err = |e: std::io::Error| StorageError::Write {
            path: path.clone(),
            source: e,
        };

        let mut writer: Vec<u8> = Vec::new();
        match table.format {
            TableFormat::Directional => {
                let rows = table.directional_rows(&self.registry);
                write_line(&mut writer, &TableHeader {
                    address: table.owner.clone(),
                    format: table.format,
                    rows: rows.len(),
                })
                .map_err(write_err)?;
                for row in &rows {
                    write_line(&mut writer, row).map_err(write_err)?;
                }
            },
            TableFormat::FullHistory => {
                let rows = table.full_history_rows();
                write_line(&mut writer, &TableHeader {
                    address: table.owner.clone(),
                    format: table.format,
                    rows: rows.len(),
                })
                .map_err(write_err)?;
                for row in &rows {
                    write_line(&mut writer, row).map_err(write_err)?;
                }
            },
        }

        write_atomic(&path, &writer).map_err(write_err)?;

        debug!("flow_table_written::address::{}::rows::{}::path::{}", table.owner, table.len(), path.display());
        Ok(path)
    }

    pub fn read(
        &self,
        address: &Address,
    ) -> Result<AddressFlowTable, StorageError> {
        read_table(&self.path_for(address))
    }

    /// Every table in the directory, in file name order. Unreadable tables are
    /// logged and skipped.
    pub fn load_all(&self) -> Result<Vec<AddressFlowTable>, StorageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| StorageError::Read {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == FLOW_TABLE_EXTENSION))
            .collect();
        paths.sort();

        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            match read_table(&path) {
                Ok(table) => tables.push(table),
                Err(e) => error!("skipping_unreadable_flow_table::{}::error::{}", path.display(), e),
            }
        }
        Ok(tables)
    }
}

fn write_line<W, T>(
    writer: &mut W,
    value: &T,
) -> std::io::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")
}

pub fn read_table(path: &Path) -> Result<AddressFlowTable, StorageError> {
    let file = std::fs::File::open(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lines = BufReader::new(file).lines().enumerate();

    let corrupted = |line: usize, reason: String| StorageError::Corrupted {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let header: TableHeader = match lines.next() {
        Some((_, Ok(line))) => serde_json::from_str(&line).map_err(|e| corrupted(1, e.to_string()))?,
        Some((_, Err(source))) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            });
        },
        None => return Err(corrupted(1, "missing header".to_string())),
    };

    let mut directional = Vec::new();
    let mut full_history = Vec::new();
    for (index, line) in lines {
        let line = line.map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match header.format {
            TableFormat::Directional => directional.push(
                serde_json::from_str::<DirectionalRow>(&line).map_err(|e| corrupted(index + 1, e.to_string()))?,
            ),
            TableFormat::FullHistory => full_history.push(
                serde_json::from_str::<FullHistoryRow>(&line).map_err(|e| corrupted(index + 1, e.to_string()))?,
            ),
        }
    }

    let found = directional.len() + full_history.len();
    if found != header.rows {
        return Err(StorageError::Truncated {
            path: path.to_path_buf(),
            expected: header.rows,
            found,
        });
    }

    Ok(match header.format {
        TableFormat::Directional => AddressFlowTable::from_directional_rows(header.address, directional),
        TableFormat::FullHistory => AddressFlowTable::from_full_history_rows(header.address, full_history),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::FlowEdge;

    fn edge(
        tx_id: &str,
        sender: &str,
        recipient: &str,
        amount: u64,
    ) -> FlowEdge {
        FlowEdge {
            tx_id: tx_id.to_string(),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).single(),
            sender: Address::from(sender),
            recipient: Address::from(recipient),
            amount,
        }
    }

    fn registry() -> DestinationRegistry {
        DestinationRegistry::from_pairs([("kaspa:ex", "EX")])
    }

    #[test]
    fn test_directional_table_written_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlowTableStore::new(dir.path(), TableFormat::Directional, registry());
        let table = AddressFlowTable::from_edges(
            Address::from("kaspa:a"),
            TableFormat::Directional,
            vec![edge("t1", "kaspa:r", "kaspa:a", 10), edge("t2", "kaspa:a", "kaspa:ex", 9)],
        );

        let path = store.write(&table).unwrap();
        assert_eq!(path.file_name().unwrap(), "kaspa_a.jsonl");
        assert_eq!(store.read(&Address::from("kaspa:a")).unwrap(), table);

        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.lines().nth(2).unwrap().contains("\"cex_label\":\"EX\""));
    }

    #[test]
    fn test_full_history_file_name() {
        let store = FlowTableStore::new("/data", TableFormat::FullHistory, registry());
        assert_eq!(
            store.path_for(&Address::from("kaspa:a")),
            PathBuf::from("/data/kaspa_a_fullhistory.jsonl")
        );
    }

    #[test]
    fn test_truncated_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlowTableStore::new(dir.path(), TableFormat::Directional, registry());
        let table = AddressFlowTable::from_edges(
            Address::from("kaspa:a"),
            TableFormat::Directional,
            vec![edge("t1", "kaspa:r", "kaspa:a", 10), edge("t2", "kaspa:a", "kaspa:b", 9)],
        );
        let path = store.write(&table).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let truncated: Vec<&str> = raw.lines().take(2).collect();
        std::fs::write(&path, truncated.join("\n")).unwrap();

        let err = store.read(&Address::from("kaspa:a")).unwrap_err();
        assert!(matches!(err, StorageError::Truncated { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_load_all_skips_other_files_and_bad_tables() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlowTableStore::new(dir.path(), TableFormat::Directional, registry());
        for owner in ["kaspa:b", "kaspa:a"] {
            let table = AddressFlowTable::from_edges(
                Address::from(owner),
                TableFormat::Directional,
                vec![edge("t1", "kaspa:r", owner, 10)],
            );
            store.write(&table).unwrap();
        }
        std::fs::write(dir.path().join("tracer_state.json"), "{}").unwrap();
        std::fs::write(dir.path().join("broken.jsonl"), "not json\n").unwrap();

        let tables = store.load_all().unwrap();
        let owners: Vec<String> = tables.iter().map(|t| t.owner.to_string()).collect();
        assert_eq!(owners, vec!["kaspa:a".to_string(), "kaspa:b".to_string()]);
    }
}
