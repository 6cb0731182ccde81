//! Host file hand-off for import and export.
//!
//! # Responsibility
//! - Turn a file chosen in the OS picker into import bytes.
//! - Write export payloads for share sheets that take a file location.
//!
//! # Invariants
//! - Only `.teff` files are read; other types are rejected before any I/O.

use crate::codec::teff::{has_export_extension, ExportPayload};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One-shot outcome of an OS file picker.
pub type FileSelection = Result<PathBuf, FilePickerError>;

/// File selection or share operation failure. Never retried automatically.
#[derive(Debug, Error)]
pub enum FilePickerError {
    #[error("file selection was cancelled")]
    Cancelled,
    #[error("unsupported file type: {}", path.display())]
    UnsupportedType { path: PathBuf },
    #[error("file access failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("platform file operation failed: {0}")]
    Platform(String),
}

/// Reads the bytes of a picked `.teff` file.
pub fn read_import_file(path: &Path) -> Result<Vec<u8>, FilePickerError> {
    if !has_export_extension(path) {
        return Err(FilePickerError::UnsupportedType {
            path: path.to_path_buf(),
        });
    }
    fs::read(path).map_err(|source| FilePickerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `payload` into `dir` under its suggested file name.
///
/// Returns the full path of the written file. An existing file with the
/// same name is replaced.
pub fn write_export_file(dir: &Path, payload: &ExportPayload) -> Result<PathBuf, FilePickerError> {
    let path = dir.join(&payload.file_name);
    fs::write(&path, &payload.bytes).map_err(|source| FilePickerError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
