pub mod aggregator;
pub mod attribution;
pub mod balance;
pub mod classifier;
pub mod flow_graph;
pub mod reverse_index;
pub mod sweep;

pub use aggregator::DepositRecord;
pub use aggregator::ExchangeTotals;
pub use aggregator::aggregate;
pub use aggregator::collect_deposits;
pub use attribution::Attribution;
pub use attribution::attribute;
pub use balance::BalanceLedger;
pub use classifier::AttributionClassifier;
pub use flow_graph::VerifiedFlowGraph;
pub use reverse_index::ReverseFundingIndex;
pub use sweep::SweepPoint;
pub use sweep::threshold_sweep;
