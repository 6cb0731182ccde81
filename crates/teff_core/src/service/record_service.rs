//! Record use-case service.
//!
//! # Responsibility
//! - Provide the list/create/delete/export/import operations the UI calls.
//! - Delegate persistence to a `RecordRepository` implementation.
//!
//! # Invariants
//! - Imported candidates reach the store only through `confirm_import`.
//! - Deleting a record that is not stored is a silent no-op.
//! - Log events carry ids and error kinds, never record names or bytes.

use crate::codec::teff::{self, DecodeError, EncodeError, ExportPayload};
use crate::model::record::{Record, RecordId};
use crate::repo::record_repo::{RecordRepository, RepoResult};
use crate::service::files::FileSelection;
use crate::service::import::{ImportError, ImportSession};
use chrono::Utc;
use log::{debug, info, warn};
use rand::Rng;

/// Names used by "Generate random".
pub const NAME_POOL: &[&str] = &[
    "John", "Jane", "Bob", "Alice", "Charlie", "David", "Emily", "Frank", "Grace", "Henry",
];

/// Use-case service over one record store.
pub struct RecordService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> RecordService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Returns a fresh snapshot of all records in insertion order.
    pub fn list_all(&self) -> RepoResult<Vec<Record>> {
        self.repo.list_records()
    }

    /// Gets one stored record by id.
    pub fn get(&self, id: RecordId) -> RepoResult<Option<Record>> {
        self.repo.get_record(id)
    }

    /// Creates and stores a record with a random pool name and the current time.
    pub fn generate_random(&self) -> RepoResult<Record> {
        self.generate_random_with(&mut rand::thread_rng())
    }

    /// Same as [`generate_random`](Self::generate_random) with a caller-supplied RNG.
    pub fn generate_random_with<G: Rng>(&self, rng: &mut G) -> RepoResult<Record> {
        let name = NAME_POOL[rng.gen_range(0..NAME_POOL.len())];
        let record = Record::new(name);
        self.repo.insert_record(&record)?;
        info!(
            "event=record_insert module=service status=ok source=generate record_id={}",
            record.id()
        );
        Ok(record)
    }

    /// Removes `record` from the store, matched by identity.
    pub fn delete(&self, record: &Record) -> RepoResult<()> {
        let removed = self.repo.delete_record(record.id())?;
        if removed {
            info!(
                "event=record_delete module=service status=ok record_id={}",
                record.id()
            );
        } else {
            debug!(
                "event=record_delete module=service status=noop record_id={}",
                record.id()
            );
        }
        Ok(())
    }

    /// Encodes `record` for the share sheet, named after the current time.
    pub fn export(&self, record: &Record) -> Result<ExportPayload, EncodeError> {
        let payload = teff::export_payload(record, Utc::now())?;
        info!(
            "event=record_export module=service status=ok record_id={} bytes={}",
            record.id(),
            payload.bytes.len()
        );
        Ok(payload)
    }

    /// Decodes `bytes` into a staged candidate. The store is not touched.
    pub fn stage_import(
        &self,
        session: &mut ImportSession,
        bytes: &[u8],
    ) -> Result<Record, DecodeError> {
        session.stage(bytes)
    }

    /// Handles the one-shot result of the OS file importer.
    ///
    /// Picker failures are logged and returned; the session ends `Idle`.
    pub fn stage_import_file(
        &self,
        session: &mut ImportSession,
        selection: FileSelection,
    ) -> Result<Record, ImportError> {
        session.stage_file(selection)
    }

    /// Inserts the staged candidate and returns the session to `Idle`.
    ///
    /// # Errors
    /// - `NothingStaged` when no candidate is pending.
    /// - `Repo(DuplicateId)` when a record with the same id is already stored;
    ///   the candidate is discarded.
    pub fn confirm_import(&self, session: &mut ImportSession) -> Result<Record, ImportError> {
        let record = session.take_staged().ok_or(ImportError::NothingStaged)?;
        if let Err(err) = self.repo.insert_record(&record) {
            warn!(
                "event=import_confirm module=service status=error record_id={} error={err}",
                record.id()
            );
            return Err(err.into());
        }
        info!(
            "event=record_insert module=service status=ok source=import record_id={}",
            record.id()
        );
        Ok(record)
    }
}
