//! Batch-directory ingestion and artifact export.

pub mod export;
pub mod ingest;
