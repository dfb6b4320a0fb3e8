use std::collections::BTreeSet;
use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::address::Address;
use super::exchange::DestinationRegistry;

/// One value transfer: a single output of a transaction attributed to the
/// transaction's (single) sender.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowEdge {
    pub tx_id: String,
    #[serde(with = "timestamp_or_empty")]
    pub timestamp: Option<DateTime<Utc>>,
    pub sender: Address,
    pub recipient: Address,
    pub amount: u64,
}

impl FlowEdge {
    pub fn is_self_loop(&self) -> bool {
        self.sender == self.recipient
    }

    fn dedup_key(&self) -> (&str, &Address, &Address, u64, Option<i64>) {
        (
            self.tx_id.as_str(),
            &self.sender,
            &self.recipient,
            self.amount,
            self.timestamp.map(|ts| ts.timestamp_millis()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

/// On-disk shape of an address flow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    /// Only edges touching the owner, one row per edge from the owner's point of view.
    Directional,
    /// Every edge of every transaction touching the owner.
    FullHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalRow {
    pub tx_id: String,
    #[serde(with = "timestamp_or_empty")]
    pub timestamp: Option<DateTime<Utc>>,
    pub direction: Direction,
    pub peer_address: Address,
    pub amount_sompi: u64,
    #[serde(default)]
    pub cex_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullHistoryRow {
    pub tx_id: String,
    #[serde(with = "timestamp_or_empty")]
    pub timestamp: Option<DateTime<Utc>>,
    pub sender: Address,
    pub recipient: Address,
    pub amount_sompi: u64,
}

/// Every edge observed for one crawled address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFlowTable {
    pub owner: Address,
    pub format: TableFormat,
    edges: Vec<FlowEdge>,
}

impl AddressFlowTable {
    pub fn new(
        owner: Address,
        format: TableFormat,
    ) -> Self {
        Self {
            owner,
            format,
            edges: Vec::new(),
        }
    }

    pub fn from_edges(
        owner: Address,
        format: TableFormat,
        edges: impl IntoIterator<Item = FlowEdge>,
    ) -> Self {
        let mut table = Self::new(owner, format);
        table.extend(edges);
        table
    }

    /// Adds edges in order, dropping duplicates and, for directional tables,
    /// edges that do not involve the owner or loop back to it.
    pub fn extend(
        &mut self,
        edges: impl IntoIterator<Item = FlowEdge>,
    ) {
        let mut seen: HashSet<(String, Address, Address, u64, Option<i64>)> = self
            .edges
            .iter()
            .map(|edge| {
                let (tx_id, sender, recipient, amount, ts) = edge.dedup_key();
                (tx_id.to_string(), sender.clone(), recipient.clone(), amount, ts)
            })
            .collect();

        for edge in edges {
            if self.format == TableFormat::Directional {
                let touches_owner = edge.sender == self.owner || edge.recipient == self.owner;
                if !touches_owner || edge.is_self_loop() {
                    continue;
                }
            }
            let (tx_id, sender, recipient, amount, ts) = edge.dedup_key();
            let key = (tx_id.to_string(), sender.clone(), recipient.clone(), amount, ts);
            if seen.insert(key) {
                self.edges.push(edge);
            }
        }
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges funding the owner from a distinct sender.
    pub fn inbound(&self) -> impl Iterator<Item = &FlowEdge> {
        self.edges
            .iter()
            .filter(|edge| edge.recipient == self.owner && edge.sender != self.owner)
    }

    /// Every address that traded with the owner, excluding the unknown sentinel.
    pub fn counterparties(&self) -> BTreeSet<Address> {
        self.edges
            .iter()
            .flat_map(|edge| [&edge.sender, &edge.recipient])
            .filter(|address| **address != self.owner && !address.is_unknown())
            .cloned()
            .collect()
    }

    pub fn directional_rows(
        &self,
        registry: &DestinationRegistry,
    ) -> Vec<DirectionalRow> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let (direction, peer) = if edge.sender == self.owner {
                    (Direction::Sent, &edge.recipient)
                } else if edge.recipient == self.owner {
                    (Direction::Received, &edge.sender)
                } else {
                    return None;
                };
                Some(DirectionalRow {
                    tx_id: edge.tx_id.clone(),
                    timestamp: edge.timestamp,
                    direction,
                    peer_address: peer.clone(),
                    amount_sompi: edge.amount,
                    cex_label: registry.label_of(peer).unwrap_or_default().to_string(),
                })
            })
            .collect()
    }

    pub fn full_history_rows(&self) -> Vec<FullHistoryRow> {
        self.edges
            .iter()
            .map(|edge| FullHistoryRow {
                tx_id: edge.tx_id.clone(),
                timestamp: edge.timestamp,
                sender: edge.sender.clone(),
                recipient: edge.recipient.clone(),
                amount_sompi: edge.amount,
            })
            .collect()
    }

    pub fn from_directional_rows(
        owner: Address,
        rows: impl IntoIterator<Item = DirectionalRow>,
    ) -> Self {
        let edges: Vec<FlowEdge> = rows
            .into_iter()
            .map(|row| {
                let (sender, recipient) = match row.direction {
                    Direction::Sent => (owner.clone(), row.peer_address),
                    Direction::Received => (row.peer_address, owner.clone()),
                };
                FlowEdge {
                    tx_id: row.tx_id,
                    timestamp: row.timestamp,
                    sender,
                    recipient,
                    amount: row.amount_sompi,
                }
            })
            .collect();
        Self::from_edges(owner, TableFormat::Directional, edges)
    }

    pub fn from_full_history_rows(
        owner: Address,
        rows: impl IntoIterator<Item = FullHistoryRow>,
    ) -> Self {
        let edges: Vec<FlowEdge> = rows
            .into_iter()
            .map(|row| FlowEdge {
                tx_id: row.tx_id,
                timestamp: row.timestamp,
                sender: row.sender,
                recipient: row.recipient,
                amount: row.amount_sompi,
            })
            .collect();
        Self::from_edges(owner, TableFormat::FullHistory, edges)
    }
}

/// ISO-8601 UTC instant, or the empty string when the block time is unknown.
pub mod timestamp_or_empty {
    use chrono::DateTime;
    use chrono::SecondsFormat;
    use chrono::Utc;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

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

    #[test]
    fn test_directional_table_keeps_owner_edges_only() {
        let table = AddressFlowTable::from_edges(
            Address::from("a"),
            TableFormat::Directional,
            vec![
                edge("t1", "x", "a", 10),
                edge("t1", "x", "y", 5),
                edge("t2", "a", "a", 3),
                edge("t3", "a", "z", 7),
            ],
        );
        assert_eq!(table.edges(), &[edge("t1", "x", "a", 10), edge("t3", "a", "z", 7)]);
    }

    #[test]
    fn test_extend_deduplicates_rows() {
        let mut table = AddressFlowTable::new(Address::from("a"), TableFormat::FullHistory);
        table.extend(vec![edge("t1", "x", "a", 10), edge("t1", "x", "a", 10)]);
        table.extend(vec![edge("t1", "x", "a", 10), edge("t1", "x", "a", 11)]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_counterparties_skip_owner_and_unknown() {
        let mut unknown = edge("t2", "x", "a", 1);
        unknown.sender = Address::unknown();
        let table = AddressFlowTable::from_edges(
            Address::from("a"),
            TableFormat::Directional,
            vec![edge("t1", "x", "a", 10), unknown, edge("t3", "a", "z", 7)],
        );
        let counterparties: Vec<String> = table.counterparties().iter().map(|a| a.to_string()).collect();
        assert_eq!(counterparties, vec!["x".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_directional_rows_rebuild_same_table() {
        let registry = DestinationRegistry::from_pairs([("z", "EX")]);
        let table = AddressFlowTable::from_edges(
            Address::from("a"),
            TableFormat::Directional,
            vec![edge("t1", "x", "a", 10), edge("t3", "a", "z", 7)],
        );
        let rows = table.directional_rows(&registry);
        assert_eq!(rows[0].direction, Direction::Received);
        assert_eq!(rows[1].cex_label, "EX");
        let rebuilt = AddressFlowTable::from_directional_rows(Address::from("a"), rows);
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_empty_timestamp_serializes_as_empty_string() {
        let mut undated = edge("t1", "x", "a", 10);
        undated.timestamp = None;
        let json = serde_json::to_value(&undated).unwrap();
        assert_eq!(json["timestamp"], "");
        let back: FlowEdge = serde_json::from_value(json).unwrap();
        assert_eq!(back.timestamp, None);
    }
}
