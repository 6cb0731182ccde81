//! Record repository contract with in-memory and SQLite implementations.
//!
//! # Responsibility
//! - Provide insert-at-end, delete-by-identity and ordered listing.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `list_records` is a fresh snapshot in insertion order on every call.
//! - Inserting an id that already exists fails with `DuplicateId`.
//! - Inserting a date outside years 0000-9999 fails with `DateOutOfRange`, so
//!   every stored row stays readable.
//! - Deleting a missing id is a no-op reported as `Ok(false)`.
//! - Read paths reject corrupt persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::record::{Record, RecordId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::cell::RefCell;
use thiserror::Error;
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT uuid, name, date FROM records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and queries.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("record already exists: {0}")]
    DuplicateId(RecordId),
    #[error("record {0} has a date outside years 0000-9999")]
    DateOutOfRange(RecordId),
    #[error("invalid persisted record data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordered record store.
pub trait RecordRepository {
    /// Appends one record and returns its id.
    fn insert_record(&self, record: &Record) -> RepoResult<RecordId>;
    /// Removes the record with `id`; returns whether a row was removed.
    fn delete_record(&self, id: RecordId) -> RepoResult<bool>;
    /// Gets one record by id.
    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>>;
    /// Returns every record in insertion order.
    fn list_records(&self) -> RepoResult<Vec<Record>>;
}

/// Volatile store for previews, tests and hosts that persist elsewhere.
///
/// Interior mutability matches the single-threaded interaction model.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: RefCell<Vec<Record>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn insert_record(&self, record: &Record) -> RepoResult<RecordId> {
        ensure_portable_date(record)?;
        let mut records = self.records.borrow_mut();
        if records.iter().any(|existing| existing.same_identity(record)) {
            return Err(RepoError::DuplicateId(record.id()));
        }
        records.push(record.clone());
        Ok(record.id())
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<bool> {
        let mut records = self.records.borrow_mut();
        match records.iter().position(|record| record.id() == id) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .find(|record| record.id() == id)
            .cloned())
    }

    fn list_records(&self) -> RepoResult<Vec<Record>> {
        Ok(self.records.borrow().clone())
    }
}

/// SQLite-backed record store.
///
/// Insertion order is the autoincrement `seq` column.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert_record(&self, record: &Record) -> RepoResult<RecordId> {
        ensure_portable_date(record)?;
        let inserted = self.conn.execute(
            "INSERT INTO records (uuid, name, date) VALUES (?1, ?2, ?3);",
            params![
                record.id().to_string(),
                record.name.as_str(),
                record.date_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => Ok(record.id()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::DuplicateId(record.id()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM records WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_record_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_records(&self) -> RepoResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }
}

fn ensure_portable_date(record: &Record) -> RepoResult<()> {
    if record.has_portable_date() {
        Ok(())
    } else {
        Err(RepoError::DateOutOfRange(record.id()))
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in records.uuid"))
    })?;

    let date_text: String = row.get("date")?;
    let date = DateTime::parse_from_rfc3339(&date_text)
        .map_err(|_| {
            RepoError::InvalidData(format!("invalid date value `{date_text}` in records.date"))
        })?
        .with_timezone(&Utc);

    let name: String = row.get("name")?;
    Ok(Record::with_id(id, name, date))
}
