//! Bulk ingestion pipeline for dispatch records.
//!
//! Responsibilities:
//! - Decode uploaded CSV/XLSX/XLS files into sheets of text cells
//! - Reconcile inconsistently-spelled headers against the canonical fields
//! - Normalize and validate each data row
//! - Commit accepted records under one of two transactional policies:
//!   strict (single sheet, all-or-nothing batch) or smart (every eligible
//!   sheet, best-effort row-at-a-time)
//!
//! Everything here is request-scoped and sequential; the store behind
//! [`store::RecordStore`] is the only durable surface.

pub mod columns;
pub mod fields;
pub mod ingest;
pub mod parse;
pub mod record;
pub mod sheet;
pub mod store;
pub mod validate;

pub use ingest::{ingest, IngestMode, IngestionResult};
pub use record::DispatchRecord;
pub use store::{MemoryStore, PgRecordStore, RecordStore};
