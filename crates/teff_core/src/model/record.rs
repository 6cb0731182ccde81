//! Record domain model.
//!
//! # Responsibility
//! - Define the three-field record exported and imported as a `.teff` file.
//! - Provide the derived `MM/dd/yyyy` display date.
//!
//! # Invariants
//! - `id` is assigned once and never changes; there is no setter.
//! - `display_date()` is computed from `date` and is not part of the
//!   serialized form.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use uuid::Uuid;

/// Stable identifier of a record.
pub type RecordId = Uuid;

/// Format used by list rows, e.g. `01/18/2024`.
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Years representable as unsigned four-digit RFC 3339 text.
pub const PORTABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Canonical record shown in the list and carried by the export file.
///
/// Equality compares every field so codec round-trips can be checked
/// directly; use [`Record::same_identity`] for list diffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    /// Human-readable label. No length or charset constraint.
    pub name: String,
    /// Creation time unless supplied explicitly.
    pub date: DateTime<Utc>,
}

impl Record {
    /// Creates a record with a fresh id, stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_date(name, Utc::now())
    }

    /// Creates a record with a fresh id and a caller-provided date.
    pub fn with_date(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4(), name, date)
    }

    /// Rebuilds a record whose identity already exists.
    ///
    /// Used by the codec and the SQLite store.
    pub fn with_id(id: RecordId, name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            date,
        }
    }

    /// Returns the immutable record identity.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns whether both records share one identity, ignoring field values.
    pub fn same_identity(&self, other: &Record) -> bool {
        self.id == other.id
    }

    /// Formats `date` as RFC 3339 UTC, keeping every significant fraction digit.
    pub fn date_rfc3339(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Returns whether `date` falls inside [`PORTABLE_YEARS`].
    ///
    /// Only such records can be exported or persisted.
    pub fn has_portable_date(&self) -> bool {
        PORTABLE_YEARS.contains(&self.date.year())
    }

    /// Formats `date` as `MM/dd/yyyy` in UTC.
    pub fn display_date(&self) -> String {
        self.display_date_in(&Utc)
    }

    /// Formats `date` as `MM/dd/yyyy` in the given time zone.
    pub fn display_date_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.date
            .with_timezone(tz)
            .format(DISPLAY_DATE_FORMAT)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn display_date_uses_month_day_year() {
        let date = Utc.with_ymd_and_hms(2024, 1, 18, 10, 30, 0).unwrap();
        let record = Record::with_date("Alice", date);
        assert_eq!(record.display_date(), "01/18/2024");
    }

    #[test]
    fn portable_date_covers_four_digit_years_only() {
        let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();
        let first = Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap();
        assert!(Record::with_date("Alice", last).has_portable_date());
        assert!(Record::with_date("Alice", first).has_portable_date());

        let too_late = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let too_early = Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap();
        assert!(!Record::with_date("Alice", too_late).has_portable_date());
        assert!(!Record::with_date("Alice", too_early).has_portable_date());
    }

    #[test]
    fn display_date_in_respects_offset() {
        let date = Utc.with_ymd_and_hms(2024, 1, 18, 23, 30, 0).unwrap();
        let record = Record::with_date("Alice", date);
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(record.display_date_in(&tokyo), "01/19/2024");
    }
}
