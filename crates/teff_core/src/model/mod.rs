//! Domain model for shareable records.
//!
//! # Responsibility
//! - Define the record shape shared by the codec, store and FFI layers.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId` assigned at
//!   construction.
//! - Display-only values are derived on demand and never persisted.

pub mod record;
