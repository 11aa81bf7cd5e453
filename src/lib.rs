#![deny(missing_docs)]

//! Core library for drivedigest: summarize every document in a Google Drive folder and export
//! the results.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Google Drive folder listing and downloads.
pub mod drive;
/// CSV and PDF report rendering.
pub mod export;
/// Plain-text extraction for supported document formats.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Batch metrics helpers.
pub mod metrics;
/// Batch orchestration and result records.
pub mod processing;
/// Client for a running drivedigest server.
pub mod remote;
/// Language-model summarization providers.
pub mod summarization;
