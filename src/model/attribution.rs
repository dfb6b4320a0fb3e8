use serde::Deserialize;
use serde::Serialize;

use super::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Reachable from a root within the configured number of backward hops.
    RootReachable,
    External,
}

/// Inbound value of one recipient split by the classification of its funders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub address: Address,
    pub root_reachable: u64,
    pub external: u64,
    pub total: u64,
    pub chainge_pct: f64,
}

impl AttributionResult {
    pub fn new(
        address: Address,
        root_reachable: u64,
        external: u64,
    ) -> Self {
        let total = root_reachable.saturating_add(external);
        let chainge_pct = if total == 0 {
            0.0
        } else {
            root_reachable as f64 / total as f64
        };
        Self {
            address,
            root_reachable,
            external,
            total,
            chainge_pct,
        }
    }

    /// Zero-inflow addresses never pass a positive threshold.
    pub fn passes(
        &self,
        threshold: f64,
    ) -> bool {
        self.total > 0 && self.chainge_pct >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_inflow_has_zero_fraction() {
        let result = AttributionResult::new(Address::from("a"), 0, 0);
        assert_eq!(result.chainge_pct, 0.0);
        assert!(!result.passes(0.85));
        assert!(!result.passes(0.0));
    }

    #[test]
    fn test_fraction_is_share_of_total() {
        let result = AttributionResult::new(Address::from("a"), 900, 100);
        assert_eq!(result.total, 1000);
        assert!((result.chainge_pct - 0.9).abs() < 1e-12);
        assert!(result.passes(0.85));
        assert!(!result.passes(0.95));
    }
}
