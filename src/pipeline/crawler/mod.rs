pub mod tracer;

pub use tracer::AddressOutcome;
pub use tracer::CrawlSummary;
pub use tracer::Tracer;
pub use tracer::TracerOptions;
