pub mod history;
pub mod ingestion;
pub mod processing;

pub use ingestion::{IngestOutcome, IngestionPipeline, RecomputeStrategy, Snapshot};
pub use processing::ProcessingService;
