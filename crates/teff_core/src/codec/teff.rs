//! `.teff` single-record export format.
//!
//! # Responsibility
//! - Encode a `Record` as a JSON object with exactly `id`, `name`, `date`.
//! - Decode externally supplied bytes back into a `Record`.
//! - Describe the exported file type for share/import sheets.
//!
//! # Invariants
//! - `decode(encode(r)) == r` for every record.
//! - All three keys are always written; unknown keys are ignored on read.
//! - Dates are written as RFC 3339 UTC with exact sub-second precision and
//!   only for years 0000-9999.
//! - Dates are read as RFC 3339 text or as a number of seconds since the
//!   Apple reference date (2001-01-01T00:00:00Z), the Foundation default.
//! - The derived display date is never encoded or decoded.

use crate::model::record::{Record, RecordId, PORTABLE_YEARS};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Exported type identifier registered with the host OS.
pub const EXPORT_TYPE_IDENTIFIER: &str = "com.makswinters.CustomFileFormatTest.teff";
/// File extension bound to [`EXPORT_TYPE_IDENTIFIER`].
pub const FILE_EXTENSION: &str = "teff";
/// Base content type the exported type conforms to.
pub const MIME_TYPE: &str = "application/json";

const FIELD_ID: &str = "id";
const FIELD_NAME: &str = "name";
const FIELD_DATE: &str = "date";
const FILE_NAME_PREFIX: &str = "Export";
const APPLE_REFERENCE_UNIX_SECS: i64 = 978_307_200;
const NANOS_PER_SEC: f64 = 1_000_000_000.0;
const FILE_NAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Failure while turning import bytes into a record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid value for field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Failure while serializing a record.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to encode record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record date {0} is outside years 0000-9999")]
    DateOutOfRange(DateTime<Utc>),
}

/// Everything a share sheet needs to export one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Encoded `.teff` bytes.
    pub bytes: Vec<u8>,
    /// Suggested default file name, including the extension.
    pub file_name: String,
    /// Always [`EXPORT_TYPE_IDENTIFIER`].
    pub type_identifier: &'static str,
}

#[derive(Serialize)]
struct RecordWire<'a> {
    id: RecordId,
    name: &'a str,
    date: String,
}

/// Encodes one record into `.teff` bytes.
///
/// # Errors
/// - `DateOutOfRange` when the date cannot be written as four-digit-year
///   RFC 3339 text, so it could not be decoded again.
pub fn encode(record: &Record) -> Result<Vec<u8>, EncodeError> {
    if !record.has_portable_date() {
        return Err(EncodeError::DateOutOfRange(record.date));
    }
    let wire = RecordWire {
        id: record.id(),
        name: record.name.as_str(),
        date: record.date_rfc3339(),
    };
    Ok(serde_json::to_vec(&wire)?)
}

/// Decodes `.teff` bytes into a record.
///
/// # Errors
/// - `Syntax` when bytes are not UTF-8 JSON.
/// - `NotAnObject` when the top-level value is not an object.
/// - `MissingField` when `id`, `name` or `date` is absent.
/// - `InvalidField` when `id`/`name` is not a string, `id` is not a UUID, or
///   `date` is neither RFC 3339 text nor reference-date seconds within
///   years 0000-9999.
pub fn decode(bytes: &[u8]) -> Result<Record, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Object(object) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let id_text = required_str(&object, FIELD_ID)?;
    let id = Uuid::parse_str(id_text).map_err(|err| DecodeError::InvalidField {
        field: FIELD_ID,
        reason: err.to_string(),
    })?;

    let name = required_str(&object, FIELD_NAME)?;

    let date = match object.get(FIELD_DATE) {
        Some(Value::Number(seconds)) => {
            let seconds = seconds.as_f64().ok_or_else(|| invalid_date("not a finite number"))?;
            date_from_reference_seconds(seconds)?
        }
        _ => {
            let date_text = required_str(&object, FIELD_DATE)?;
            let date = DateTime::parse_from_rfc3339(date_text)
                .map_err(|err| invalid_date(err.to_string()))?
                .with_timezone(&Utc);
            // Offsets can push a four-digit local year out of range in UTC.
            if !PORTABLE_YEARS.contains(&date.year()) {
                return Err(invalid_date(format!("{date_text} is outside years 0000-9999")));
            }
            date
        }
    };

    Ok(Record::with_id(id, name, date))
}

fn date_from_reference_seconds(seconds: f64) -> Result<DateTime<Utc>, DecodeError> {
    // Anything this large is far outside the portable years anyway.
    if !seconds.is_finite() || seconds.abs() > 1e12 {
        return Err(invalid_date(format!("{seconds} seconds is out of range")));
    }
    let whole = seconds.floor();
    let mut secs = whole as i64 + APPLE_REFERENCE_UNIX_SECS;
    let mut nanos = ((seconds - whole) * NANOS_PER_SEC).round() as u32;
    if nanos >= 1_000_000_000 {
        secs += 1;
        nanos = 0;
    }
    DateTime::from_timestamp(secs, nanos)
        .filter(|date| PORTABLE_YEARS.contains(&date.year()))
        .ok_or_else(|| invalid_date(format!("{seconds} seconds is out of range")))
}

fn invalid_date(reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidField {
        field: FIELD_DATE,
        reason: reason.into(),
    }
}

/// Builds the default export file name, e.g. `Export2024-01-18 10.00.00.teff`.
pub fn suggested_file_name(exported_at: DateTime<Utc>) -> String {
    format!(
        "{FILE_NAME_PREFIX}{}.{FILE_EXTENSION}",
        exported_at.format(FILE_NAME_TIMESTAMP_FORMAT)
    )
}

/// Encodes a record and pairs it with its suggested file name.
pub fn export_payload(
    record: &Record,
    exported_at: DateTime<Utc>,
) -> Result<ExportPayload, EncodeError> {
    Ok(ExportPayload {
        bytes: encode(record)?,
        file_name: suggested_file_name(exported_at),
        type_identifier: EXPORT_TYPE_IDENTIFIER,
    })
}

/// Returns whether `path` carries the `.teff` extension (case-insensitive).
pub fn has_export_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(FILE_EXTENSION))
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    match object.get(field) {
        None => Err(DecodeError::MissingField(field)),
        Some(Value::String(text)) => Ok(text.as_str()),
        Some(other) => Err(DecodeError::InvalidField {
            field,
            reason: format!("expected string, found {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        date_from_reference_seconds, has_export_extension, json_kind, suggested_file_name,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn suggested_file_name_embeds_timestamp_and_extension() {
        let at = Utc.with_ymd_and_hms(2024, 1, 18, 9, 5, 7).unwrap();
        assert_eq!(suggested_file_name(at), "Export2024-01-18 09.05.07.teff");
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_export_extension(Path::new("/tmp/a.teff")));
        assert!(has_export_extension(Path::new("/tmp/A.TEFF")));
        assert!(!has_export_extension(Path::new("/tmp/a.json")));
        assert!(!has_export_extension(Path::new("/tmp/teff")));
    }

    #[test]
    fn reference_seconds_start_at_2001() {
        let epoch = date_from_reference_seconds(0.0).unwrap();
        assert_eq!(epoch, Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap());

        let fractional = date_from_reference_seconds(-0.5).unwrap();
        assert_eq!(fractional.timestamp(), 978_307_199);
        assert_eq!(fractional.timestamp_subsec_millis(), 500);

        assert!(date_from_reference_seconds(f64::MAX).is_err());
        assert!(date_from_reference_seconds(-70_000_000_000.0).is_err());
    }

    #[test]
    fn json_kind_names_value_types() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!(3)), "number");
        assert_eq!(json_kind(&json!([1])), "array");
    }
}
