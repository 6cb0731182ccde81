//! FFI use-case API for the Flutter record list screen.
//!
//! # Responsibility
//! - Expose list/create/delete/export/import use-cases to Dart via FRB.
//! - Own the process-wide store location and pending import session.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are returned as envelopes with `ok=false`, never thrown.
//! - At most one import candidate is pending per process.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use teff_core::db::open_db;
use teff_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    FilePickerError, ImportSession, Record, RecordService, SqliteRecordRepository,
};
use uuid::Uuid;

const STORE_DB_FILE_NAME: &str = "teff_records.sqlite3";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static IMPORT_SESSION: Mutex<ImportSession> = Mutex::new(ImportSession::new());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the SQLite file backing the record list.
///
/// Must be called before the first record operation to take effect;
/// otherwise the store lives at `<temp_dir>/teff_records.sqlite3`.
/// Repeating the active path is accepted; switching paths is rejected.
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "store already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordItem {
    /// Stable record ID in string form.
    pub id: String,
    pub name: String,
    /// Full-precision timestamp (RFC 3339, UTC).
    pub date_rfc3339: String,
    /// `MM/dd/yyyy` label for the row subtitle.
    pub display_date: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordListResponse {
    pub ok: bool,
    /// Records in insertion order (empty on failure).
    pub items: Vec<RecordItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Affected record ID, when there is one.
    pub record_id: Option<String>,
    /// Affected record name, used by the import confirmation alert.
    pub name: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, record: Option<&Record>) -> Self {
        Self {
            ok: true,
            record_id: record.map(|r| r.id().to_string()),
            name: record.map(|r| r.name.clone()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            name: None,
            message: message.into(),
        }
    }
}

/// Share-sheet payload envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    /// Suggested file name, e.g. `Export2024-01-18 10.00.00.teff`.
    pub file_name: String,
    /// Exported type identifier to register the payload under.
    pub type_identifier: String,
    /// Encoded `.teff` bytes (empty on failure).
    pub bytes: Vec<u8>,
    pub message: String,
}

impl ExportResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            file_name: String::new(),
            type_identifier: String::new(),
            bytes: Vec::new(),
            message: message.into(),
        }
    }
}

/// Lists all records for rendering. Call again after every mutation.
#[flutter_rust_bridge::frb(sync)]
pub fn records_list() -> RecordListResponse {
    match with_record_service(|service| service.list_all().map_err(|err| err.to_string())) {
        Ok(records) => RecordListResponse {
            ok: true,
            items: records.iter().map(to_record_item).collect(),
            message: String::new(),
        },
        Err(err) => RecordListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("records_list failed: {err}"),
        },
    }
}

/// "Generate random" toolbar action.
#[flutter_rust_bridge::frb(sync)]
pub fn record_generate_random() -> ActionResponse {
    match with_record_service(|service| service.generate_random().map_err(|err| err.to_string())) {
        Ok(record) => ActionResponse::success("Record created.", Some(&record)),
        Err(err) => ActionResponse::failure(format!("record_generate_random failed: {err}")),
    }
}

/// Swipe-to-delete action. Deleting an unknown record succeeds as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn record_delete(record_id: String) -> ActionResponse {
    let id = match parse_record_id(&record_id) {
        Ok(id) => id,
        Err(err) => return ActionResponse::failure(format!("record_delete failed: {err}")),
    };
    let outcome = with_record_service(|service| {
        let found = service.get(id).map_err(|err| err.to_string())?;
        if let Some(record) = &found {
            service.delete(record).map_err(|err| err.to_string())?;
        }
        Ok(found)
    });
    match outcome {
        Ok(Some(record)) => ActionResponse::success("Record deleted.", Some(&record)),
        Ok(None) => ActionResponse::success("Nothing to delete.", None),
        Err(err) => ActionResponse::failure(format!("record_delete failed: {err}")),
    }
}

/// Encodes one record for the OS share sheet.
#[flutter_rust_bridge::frb(sync)]
pub fn record_export(record_id: String) -> ExportResponse {
    let id = match parse_record_id(&record_id) {
        Ok(id) => id,
        Err(err) => return ExportResponse::failure(format!("record_export failed: {err}")),
    };
    let outcome = with_record_service(|service| {
        let record = service
            .get(id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("record not found: {id}"))?;
        service.export(&record).map_err(|err| err.to_string())
    });
    match outcome {
        Ok(payload) => ExportResponse {
            ok: true,
            file_name: payload.file_name,
            type_identifier: payload.type_identifier.to_string(),
            bytes: payload.bytes,
            message: "Export ready.".to_string(),
        },
        Err(err) => ExportResponse::failure(format!("record_export failed: {err}")),
    }
}

/// Stages bytes delivered by the host (e.g. "open in" routing).
///
/// Decoding only; the store is not opened until `import_confirm`.
///
/// On success the response carries the candidate name for the confirmation
/// alert; nothing is stored until `import_confirm`.
#[flutter_rust_bridge::frb(sync)]
pub fn import_stage_bytes(bytes: Vec<u8>) -> ActionResponse {
    match lock_import_session().stage(&bytes) {
        Ok(record) => ActionResponse::success("Import staged.", Some(&record)),
        Err(err) => ActionResponse::failure(format!("import_stage_bytes failed: {err}")),
    }
}

/// Stages the `.teff` file chosen in the OS file importer.
#[flutter_rust_bridge::frb(sync)]
pub fn import_stage_file(path: String) -> ActionResponse {
    match lock_import_session().stage_file(Ok(PathBuf::from(path.trim()))) {
        Ok(record) => ActionResponse::success("Import staged.", Some(&record)),
        Err(err) => ActionResponse::failure(format!("import_stage_file failed: {err}")),
    }
}

/// Reports a failed or cancelled OS file importer.
///
/// An empty `reason` means the user cancelled. Always returns `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn import_report_picker_failure(reason: String) -> ActionResponse {
    let failure = if reason.trim().is_empty() {
        FilePickerError::Cancelled
    } else {
        FilePickerError::Platform(reason.trim().to_string())
    };
    match lock_import_session().stage_file(Err(failure)) {
        Ok(record) => ActionResponse::success("Import staged.", Some(&record)),
        Err(err) => ActionResponse::failure(format!("import failed: {err}")),
    }
}

/// Returns the candidate awaiting confirmation, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn import_staged() -> Option<RecordItem> {
    lock_import_session().staged().map(to_record_item)
}

/// "Save" button of the import alert.
#[flutter_rust_bridge::frb(sync)]
pub fn import_confirm() -> ActionResponse {
    let mut session = lock_import_session();
    match with_record_service(|service| {
        service
            .confirm_import(&mut session)
            .map_err(|err| err.to_string())
    }) {
        Ok(record) => ActionResponse::success("Record imported.", Some(&record)),
        Err(err) => ActionResponse::failure(format!("import_confirm failed: {err}")),
    }
}

/// "Cancel" button of the import alert.
#[flutter_rust_bridge::frb(sync)]
pub fn import_cancel() -> ActionResponse {
    if lock_import_session().cancel() {
        ActionResponse::success("Import discarded.", None)
    } else {
        ActionResponse::success("No pending import.", None)
    }
}

fn resolve_store_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| std::env::temp_dir().join(STORE_DB_FILE_NAME))
        .clone()
}

fn lock_import_session() -> MutexGuard<'static, ImportSession> {
    IMPORT_SESSION.lock().unwrap_or_else(|poisoned| {
        warn!("event=import_session module=ffi status=recovered reason=poisoned_lock");
        PoisonError::into_inner(poisoned)
    })
}

fn with_record_service<T>(
    f: impl FnOnce(&RecordService<SqliteRecordRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_store_path();
    let conn = open_db(&db_path).map_err(|err| format!("store open failed: {err}"))?;
    let service = RecordService::new(SqliteRecordRepository::new(&conn));
    f(&service)
}

fn parse_record_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid record id `{raw}`: {err}"))
}

fn to_record_item(record: &Record) -> RecordItem {
    RecordItem {
        id: record.id().to_string(),
        name: record.name.clone(),
        date_rfc3339: record.date_rfc3339(),
        display_date: record.display_date(),
    }
}
