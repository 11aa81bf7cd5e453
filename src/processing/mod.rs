//! Batch pipeline: list a folder, then download, extract, and summarize each file in order.

mod service;
mod staging;
pub mod types;

pub use service::{BatchApi, BatchOrchestrator, BatchSettings, ServiceHealth};
pub use staging::StagedFile;
pub use types::{BatchError, FileError, FileStatus, ResultSet, SummaryResult, UNKNOWN_SIZE};
