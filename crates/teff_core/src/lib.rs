//! Core domain logic for teff record sharing.
//! This crate is the single source of truth for the record model, the
//! `.teff` file format and the record store.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::teff::{
    decode, encode, export_payload, suggested_file_name, DecodeError, EncodeError, ExportPayload,
    EXPORT_TYPE_IDENTIFIER, FILE_EXTENSION,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{Record, RecordId};
pub use repo::record_repo::{
    InMemoryRecordRepository, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use service::files::{read_import_file, write_export_file, FilePickerError, FileSelection};
pub use service::import::{ImportError, ImportSession, ImportState};
pub use service::record_service::{RecordService, NAME_POOL};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
