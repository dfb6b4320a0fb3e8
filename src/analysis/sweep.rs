use std::collections::BTreeMap;

use serde::Serialize;

use super::aggregator::DepositRecord;
use super::aggregator::aggregate;
use super::attribution::Attribution;
use crate::utils::sompi_to_kas;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub threshold: f64,
    pub verified_count: usize,
    pub total: u64,
    pub total_kas: f64,
    pub by_label: BTreeMap<String, u64>,
}

/// Exchange totals at every threshold, reusing one attribution pass.
pub fn threshold_sweep(
    attribution: &Attribution,
    deposits: &[DepositRecord],
    thresholds: &[f64],
) -> Vec<SweepPoint> {
    thresholds
        .iter()
        .map(|&threshold| {
            let verified = attribution.verified(threshold);
            let totals = aggregate(deposits, &verified);
            SweepPoint {
                threshold,
                verified_count: verified.len(),
                total: totals.total,
                total_kas: sompi_to_kas(totals.total),
                by_label: totals.by_label,
            }
        })
        .collect()
}
