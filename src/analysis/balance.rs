use std::collections::BTreeMap;
use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::model::Address;
use crate::model::AddressFlowTable;
use crate::model::FlowEdge;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancePoint {
    pub timestamp: DateTime<Utc>,
    pub flow: i64,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletBalance {
    pub wallet: Address,
    pub points: Vec<BalancePoint>,
    pub max_balance: i64,
    pub total_inflow: u64,
    pub total_outflow: u64,
}

/// Running balance of a wallet set reconstructed from full-history tables.
/// Rows seen from several tables count once; self-loops and undated rows are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceLedger {
    pub wallets: Vec<WalletBalance>,
}

impl BalanceLedger {
    pub fn build(
        tables: &[AddressFlowTable],
        wallets: &[Address],
    ) -> Self {
        let mut seen = HashSet::new();
        let edges: Vec<&FlowEdge> = tables
            .iter()
            .flat_map(|table| table.edges())
            .filter(|edge| edge.timestamp.is_some() && !edge.is_self_loop())
            .filter(|&edge| seen.insert((&edge.tx_id, &edge.sender, &edge.recipient, edge.amount, edge.timestamp)))
            .collect();

        Self {
            wallets: wallets.iter().map(|wallet| Self::wallet_balance(wallet, &edges)).collect(),
        }
    }

    fn wallet_balance(
        wallet: &Address,
        edges: &[&FlowEdge],
    ) -> WalletBalance {
        let mut flows: BTreeMap<DateTime<Utc>, i64> = BTreeMap::new();
        let mut total_inflow: u64 = 0;
        let mut total_outflow: u64 = 0;

        for edge in edges {
            let Some(timestamp) = edge.timestamp else {
                continue;
            };
            let amount = i64::try_from(edge.amount).unwrap_or(i64::MAX);
            if edge.recipient == *wallet {
                total_inflow = total_inflow.saturating_add(edge.amount);
                let flow = flows.entry(timestamp).or_insert(0);
                *flow = flow.saturating_add(amount);
            } else if edge.sender == *wallet {
                total_outflow = total_outflow.saturating_add(edge.amount);
                let flow = flows.entry(timestamp).or_insert(0);
                *flow = flow.saturating_sub(amount);
            }
        }

        let mut balance: i64 = 0;
        let points: Vec<BalancePoint> = flows
            .into_iter()
            .map(|(timestamp, flow)| {
                balance = balance.saturating_add(flow);
                BalancePoint { timestamp, flow, balance }
            })
            .collect();
        let max_balance = points.iter().map(|p| p.balance).max().unwrap_or(0);

        WalletBalance {
            wallet: wallet.clone(),
            points,
            max_balance,
            total_inflow,
            total_outflow,
        }
    }
}
