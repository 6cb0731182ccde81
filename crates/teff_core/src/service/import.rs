//! Staged import state machine.
//!
//! # Responsibility
//! - Hold at most one decoded candidate awaiting user confirmation.
//! - Stage from raw bytes or from an OS file picker result, without needing
//!   a store.
//!
//! # Invariants
//! - `Idle -> Staged` only on a successful decode.
//! - A failed decode leaves the session `Idle`, dropping any older candidate.
//! - Confirm and cancel both return the session to `Idle`.
//! - Nothing reaches the store from here; insertion happens in
//!   `RecordService::confirm_import`.

use crate::codec::teff::{self, DecodeError};
use crate::model::record::Record;
use crate::repo::record_repo::RepoError;
use crate::service::files::{read_import_file, FilePickerError, FileSelection};
use log::{info, warn};
use thiserror::Error;

/// Import failure reported back to the UI. The session is `Idle` afterwards.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    FilePicker(#[from] FilePickerError),
    #[error("no staged import to confirm")]
    NothingStaged,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Current phase of the import flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImportState {
    #[default]
    Idle,
    /// Decoded candidate, not yet in the store.
    Staged(Record),
}

/// Import flow owned by one UI surface.
#[derive(Debug, Default)]
pub struct ImportSession {
    state: ImportState,
}

impl ImportSession {
    /// Creates an idle session. `const` so it can back a `static`.
    pub const fn new() -> Self {
        Self {
            state: ImportState::Idle,
        }
    }

    pub fn state(&self) -> &ImportState {
        &self.state
    }

    /// Returns the candidate awaiting confirmation, if any.
    pub fn staged(&self) -> Option<&Record> {
        match &self.state {
            ImportState::Staged(record) => Some(record),
            ImportState::Idle => None,
        }
    }

    /// Decodes `bytes` and stages the result as the new candidate.
    pub fn stage(&mut self, bytes: &[u8]) -> Result<Record, DecodeError> {
        self.state = ImportState::Idle;
        match teff::decode(bytes) {
            Ok(record) => {
                info!(
                    "event=import_stage module=import status=ok record_id={}",
                    record.id()
                );
                self.state = ImportState::Staged(record.clone());
                Ok(record)
            }
            Err(err) => {
                warn!("event=import_stage module=import status=error error={err}");
                Err(err)
            }
        }
    }

    /// Stages the file chosen in the OS importer.
    ///
    /// Picker and read failures are logged and returned; the session ends
    /// `Idle`.
    pub fn stage_file(&mut self, selection: FileSelection) -> Result<Record, ImportError> {
        match selection.and_then(|path| read_import_file(&path)) {
            Ok(bytes) => Ok(self.stage(&bytes)?),
            Err(err) => {
                self.state = ImportState::Idle;
                warn!("event=import_pick module=import status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Removes and returns the staged candidate, leaving the session idle.
    pub fn take_staged(&mut self) -> Option<Record> {
        match std::mem::take(&mut self.state) {
            ImportState::Staged(record) => Some(record),
            ImportState::Idle => None,
        }
    }

    /// Discards the staged candidate. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.take_staged().is_some()
    }
}
