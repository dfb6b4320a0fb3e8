use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to setup tracing: {0}")]
    SetupTracingError(String),

    #[error("Crawl aborted: {0}")]
    CrawlAborted(String),

    #[error("No flow tables found in {0}")]
    NoFlowTables(String),
}
