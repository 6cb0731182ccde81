//! Record store abstractions and implementations.
//!
//! # Responsibility
//! - Define the ordered record store contract used by services.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Listing returns records in insertion order.
//! - A record id appears at most once in a store.

pub mod record_repo;
