//! Portable file formats for sharing records between devices.
//!
//! # Responsibility
//! - Own the byte-level contract of the `.teff` export file.
//! - Keep format constants (type identifier, extension) in one place.
//!
//! # Invariants
//! - Decoding never yields a partially populated record.

pub mod teff;
