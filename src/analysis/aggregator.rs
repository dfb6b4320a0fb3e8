use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;

use serde::Serialize;

use crate::model::Address;
use crate::model::AddressFlowTable;
use crate::model::DestinationRegistry;
use crate::utils::sompi_to_kas;

/// One transfer into a destination wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRecord {
    pub tx_id: String,
    pub sender: Address,
    pub to_wallet: Address,
    pub label: String,
    pub amount: u64,
}

/// Every deposit into a destination wallet, counted once per transaction id.
/// Tables are visited in owner order so the surviving record is deterministic.
pub fn collect_deposits(
    tables: &[AddressFlowTable],
    destinations: &DestinationRegistry,
) -> Vec<DepositRecord> {
    let mut ordered: Vec<&AddressFlowTable> = tables.iter().collect();
    ordered.sort_by(|a, b| a.owner.cmp(&b.owner));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut deposits = Vec::new();

    for table in ordered {
        for edge in table.edges() {
            let Some(label) = destinations.label_of(&edge.recipient) else {
                continue;
            };
            if edge.sender.is_unknown() || edge.is_self_loop() {
                continue;
            }
            if !seen.insert(edge.tx_id.as_str()) {
                continue;
            }
            deposits.push(DepositRecord {
                tx_id: edge.tx_id.clone(),
                sender: edge.sender.clone(),
                to_wallet: edge.recipient.clone(),
                label: label.to_string(),
                amount: edge.amount,
            });
        }
    }
    deposits
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletTotal {
    pub label: String,
    pub wallet: Address,
    pub amount: u64,
    pub amount_kas: f64,
}

/// Deposits from verified senders, per destination wallet and per label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExchangeTotals {
    pub by_wallet: Vec<WalletTotal>,
    pub by_label: BTreeMap<String, u64>,
    pub total: u64,
    pub total_kas: f64,
    pub deposit_count: usize,
}

impl ExchangeTotals {
    pub fn label_total(
        &self,
        label: &str,
    ) -> u64 {
        self.by_label.get(label).copied().unwrap_or(0)
    }
}

pub fn aggregate(
    deposits: &[DepositRecord],
    verified: &BTreeSet<Address>,
) -> ExchangeTotals {
    let mut by_wallet: BTreeMap<(String, Address), u64> = BTreeMap::new();
    let mut by_label: BTreeMap<String, u64> = BTreeMap::new();
    let mut total: u64 = 0;
    let mut deposit_count = 0;

    for deposit in deposits.iter().filter(|d| verified.contains(&d.sender)) {
        let wallet = by_wallet.entry((deposit.label.clone(), deposit.to_wallet.clone())).or_insert(0);
        *wallet = wallet.saturating_add(deposit.amount);
        let label = by_label.entry(deposit.label.clone()).or_insert(0);
        *label = label.saturating_add(deposit.amount);
        total = total.saturating_add(deposit.amount);
        deposit_count += 1;
    }

    ExchangeTotals {
        by_wallet: by_wallet
            .into_iter()
            .map(|((label, wallet), amount)| WalletTotal {
                label,
                wallet,
                amount,
                amount_kas: sompi_to_kas(amount),
            })
            .collect(),
        by_label,
        total,
        total_kas: sompi_to_kas(total),
        deposit_count,
    }
}
