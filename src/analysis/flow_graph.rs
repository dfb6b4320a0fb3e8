use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::VecDeque;

use petgraph::Direction as EdgeDirection;
use petgraph::Graph;
use petgraph::prelude::*;
use serde::Deserialize;
use serde::Serialize;

use super::aggregator::DepositRecord;
use crate::model::Address;
use crate::model::AddressFlowTable;
use crate::model::DestinationRegistry;
use crate::utils::sompi_to_kas;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Intermediary,
    Exchange { label: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub address: Address,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    pub amount: u64,
    pub amount_kas: f64,
}

/// Root -> verified intermediary -> exchange flow, with edge weights summed
/// per (from, to) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifiedFlowGraph {
    graph: Graph<FlowNode, FlowLink>,
    #[serde(skip)]
    node_indices: HashMap<Address, NodeIndex>,
}

/// Serializable view for the external layout layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellLayout {
    pub shells: Vec<Vec<Address>>,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<(Address, Address, FlowLink)>,
    // Verified nodes not reachable from any root
    pub detached: Vec<Address>,
}

impl VerifiedFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposits from verified senders plus inbound edges of verified wallets
    /// that come from a root or another verified wallet.
    pub fn build(
        tables: &[AddressFlowTable],
        deposits: &[DepositRecord],
        verified: &BTreeSet<Address>,
        roots: &BTreeSet<Address>,
        destinations: &DestinationRegistry,
    ) -> Self {
        let mut graph = Self::new();
        let kind_of = |address: &Address| {
            if roots.contains(address) {
                NodeKind::Root
            } else if let Some(label) = destinations.label_of(address) {
                NodeKind::Exchange { label: label.to_string() }
            } else {
                NodeKind::Intermediary
            }
        };

        for deposit in deposits.iter().filter(|d| verified.contains(&d.sender)) {
            graph.add_flow(&deposit.sender, kind_of(&deposit.sender), &deposit.to_wallet, kind_of(&deposit.to_wallet), deposit.amount);
        }

        let mut seen: BTreeSet<(&str, &Address, &Address)> = BTreeSet::new();
        for table in tables.iter().filter(|t| verified.contains(&t.owner)) {
            for edge in table.inbound() {
                let source_qualifies = roots.contains(&edge.sender) || verified.contains(&edge.sender);
                if !source_qualifies || !seen.insert((edge.tx_id.as_str(), &edge.sender, &edge.recipient)) {
                    continue;
                }
                graph.add_flow(&edge.sender, kind_of(&edge.sender), &edge.recipient, kind_of(&edge.recipient), edge.amount);
            }
        }
        graph
    }

    // Rebuild the node_indices HashMap from the graph (useful after deserialization)
    pub fn rebuild_indices(&mut self) {
        self.node_indices.clear();
        for node_index in self.graph.node_indices() {
            if let Some(node) = self.graph.node_weight(node_index) {
                self.node_indices.insert(node.address.clone(), node_index);
            }
        }
    }

    fn ensure_indices(&mut self) {
        if self.node_indices.is_empty() && self.graph.node_count() > 0 {
            self.rebuild_indices();
        }
    }

    pub fn add_node(
        &mut self,
        address: &Address,
        kind: NodeKind,
    ) -> NodeIndex {
        self.ensure_indices();

        if let Some(&idx) = self.node_indices.get(address) {
            return idx;
        }

        let idx = self.graph.add_node(FlowNode {
            address: address.clone(),
            kind,
        });
        self.node_indices.insert(address.clone(), idx);
        idx
    }

    pub fn add_flow(
        &mut self,
        from: &Address,
        from_kind: NodeKind,
        to: &Address,
        to_kind: NodeKind,
        amount: u64,
    ) {
        let from_idx = self.add_node(from, from_kind);
        let to_idx = self.add_node(to, to_kind);

        match self.graph.find_edge(from_idx, to_idx) {
            Some(edge_idx) => {
                if let Some(link) = self.graph.edge_weight_mut(edge_idx) {
                    link.amount = link.amount.saturating_add(amount);
                    link.amount_kas = sompi_to_kas(link.amount);
                }
            },
            None => {
                self.graph.add_edge(from_idx, to_idx, FlowLink {
                    amount,
                    amount_kas: sompi_to_kas(amount),
                });
            },
        }
    }

    pub fn get_node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn get_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn flow_between(
        &self,
        from: &Address,
        to: &Address,
    ) -> Option<u64> {
        let from_idx = *self.node_indices.get(from)?;
        let to_idx = *self.node_indices.get(to)?;
        self.graph
            .find_edge(from_idx, to_idx)
            .and_then(|edge| self.graph.edge_weight(edge))
            .map(|link| link.amount)
    }

    /// BFS layers from the roots along flow direction; exchanges always sit on
    /// the outermost layer.
    pub fn shell_layout(&self) -> ShellLayout {
        let mut layer_of: BTreeMap<Address, usize> = BTreeMap::new();
        let mut queue: VecDeque<(NodeIndex, usize)> = self
            .graph
            .node_indices()
            .filter(|&idx| self.graph[idx].kind == NodeKind::Root)
            .map(|idx| (idx, 0))
            .collect();

        while let Some((idx, layer)) = queue.pop_front() {
            let node = &self.graph[idx];
            if matches!(node.kind, NodeKind::Exchange { .. }) || layer_of.contains_key(&node.address) {
                continue;
            }
            layer_of.insert(node.address.clone(), layer);
            for next in self.graph.neighbors_directed(idx, EdgeDirection::Outgoing) {
                queue.push_back((next, layer + 1));
            }
        }

        let outermost = layer_of.values().max().map_or(0, |max| max + 1);
        let mut shells: Vec<Vec<Address>> = vec![Vec::new(); outermost + 1];
        for (address, layer) in &layer_of {
            shells[*layer].push(address.clone());
        }

        let mut detached = Vec::new();
        for node in self.graph.node_weights() {
            match node.kind {
                NodeKind::Exchange { .. } => shells[outermost].push(node.address.clone()),
                _ if !layer_of.contains_key(&node.address) => detached.push(node.address.clone()),
                _ => {},
            }
        }
        shells.retain(|shell| !shell.is_empty());
        for shell in shells.iter_mut() {
            shell.sort();
        }
        detached.sort();

        let edges = self
            .graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].address.clone(),
                    self.graph[edge.target()].address.clone(),
                    edge.weight().clone(),
                )
            })
            .collect();

        ShellLayout {
            shells,
            nodes: self.graph.node_weights().cloned().collect(),
            edges,
            detached,
        }
    }
}
