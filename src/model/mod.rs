pub mod address;
pub mod attribution;
pub mod exchange;
pub mod flow;
pub mod frontier;
pub mod ledger;

pub use address::Address;
pub use attribution::AttributionResult;
pub use attribution::Classification;
pub use exchange::DestinationRegistry;
pub use flow::AddressFlowTable;
pub use flow::Direction;
pub use flow::FlowEdge;
pub use flow::TableFormat;
pub use frontier::CrawlState;
pub use frontier::FrontierEntry;
pub use frontier::QueueOrder;
pub use ledger::RawInput;
pub use ledger::RawOutput;
pub use ledger::RawTransaction;
