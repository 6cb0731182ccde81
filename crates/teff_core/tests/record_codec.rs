use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::Value;
use teff_core::codec::teff::{decode, encode, export_payload, MIME_TYPE};
use teff_core::{DecodeError, EncodeError, Record, EXPORT_TYPE_IDENTIFIER, FILE_EXTENSION};
use uuid::Uuid;

fn alice() -> Record {
    Record::with_id(
        Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
        "Alice",
        Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 0).unwrap(),
    )
}

#[test]
fn alice_roundtrips_exactly() {
    let record = alice();
    let bytes = encode(&record).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, record);
    assert_eq!(decoded.id(), record.id());
}

#[test]
fn encode_writes_exactly_id_name_date() {
    let bytes = encode(&alice()).unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object.len(), 3);
    assert_eq!(json["id"], "11111111-1111-1111-1111-111111111111");
    assert_eq!(json["name"], "Alice");
    assert_eq!(json["date"], "2024-01-18T00:00:00Z");
    assert!(!String::from_utf8(bytes).unwrap().contains("01/18/2024"));
}

#[test]
fn sub_second_dates_roundtrip() {
    let record = Record::with_date(
        "Henry",
        Utc.timestamp_opt(1_705_536_000, 123_456_789).unwrap(),
    );
    let decoded = decode(&encode(&record).unwrap()).unwrap();
    assert_eq!(decoded.date, record.date);
}

#[test]
fn missing_name_is_rejected() {
    let bytes = br#"{"id":"11111111-1111-1111-1111-111111111111","date":"2024-01-18T00:00:00Z"}"#;
    let err = decode(bytes).unwrap_err();
    assert!(matches!(err, DecodeError::MissingField("name")), "{err}");
}

#[test]
fn not_json_is_a_syntax_error() {
    let err = decode(b"not json").unwrap_err();
    assert!(matches!(err, DecodeError::Syntax(_)), "{err}");
}

#[test]
fn top_level_array_is_rejected() {
    let err = decode(b"[1, 2, 3]").unwrap_err();
    assert!(matches!(err, DecodeError::NotAnObject));
}

#[test]
fn malformed_values_name_the_field() {
    let bad_id = br#"{"id":"nope","name":"Bob","date":"2024-01-18T00:00:00Z"}"#;
    assert!(matches!(
        decode(bad_id).unwrap_err(),
        DecodeError::InvalidField { field: "id", .. }
    ));

    let bad_date = br#"{"id":"11111111-1111-1111-1111-111111111111","name":"Bob","date":"01/18/2024"}"#;
    assert!(matches!(
        decode(bad_date).unwrap_err(),
        DecodeError::InvalidField { field: "date", .. }
    ));

    let null_name = br#"{"id":"11111111-1111-1111-1111-111111111111","name":null,"date":"2024-01-18T00:00:00Z"}"#;
    let err = decode(null_name).unwrap_err();
    assert!(err.to_string().contains("found null"), "{err}");
}

#[test]
fn unknown_keys_and_offsets_are_accepted() {
    let bytes = br#"{
        "date": "2024-01-18T02:00:00+02:00",
        "name": "Bob",
        "stringDate": "01/18/2024",
        "id": "22222222-2222-4222-8222-222222222222"
    }"#;
    let record = decode(bytes).unwrap();
    assert_eq!(record.name, "Bob");
    assert_eq!(record.date, Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 0).unwrap());
}

#[test]
fn dates_beyond_four_digit_years_are_not_encoded() {
    for date in [
        Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(-1, 1, 1, 0, 0, 0).unwrap(),
    ] {
        let record = Record::with_date("Alice", date);
        let err = encode(&record).unwrap_err();
        assert!(matches!(err, EncodeError::DateOutOfRange(d) if d == date), "{err}");
        assert!(export_payload(&record, Utc::now()).is_err());
    }

    let last = Record::with_date("Alice", Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap());
    assert_eq!(decode(&encode(&last).unwrap()).unwrap(), last);
}

#[test]
fn files_from_the_original_app_decode() {
    let bytes = br#"{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","name":"Bob","date":727228800}"#;
    let record = decode(bytes).unwrap();

    assert_eq!(
        record.id(),
        Uuid::parse_str("e621e1f8-c36c-495a-93fc-0c247a3e6e5f").unwrap()
    );
    assert_eq!(record.name, "Bob");
    assert_eq!(record.date, Utc.with_ymd_and_hms(2024, 1, 18, 0, 0, 0).unwrap());

    let fractional = br#"{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","name":"Bob","date":727228800.25}"#;
    assert_eq!(decode(fractional).unwrap().date.timestamp_subsec_millis(), 250);
}

#[test]
fn numeric_dates_outside_four_digit_years_are_rejected() {
    let bytes = br#"{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","name":"Bob","date":1e300}"#;
    assert!(matches!(
        decode(bytes).unwrap_err(),
        DecodeError::InvalidField { field: "date", .. }
    ));
}

#[test]
fn offset_dates_that_leave_four_digit_years_are_rejected() {
    let bytes = br#"{"id":"E621E1F8-C36C-495A-93FC-0C247A3E6E5F","name":"Bob","date":"0000-01-01T00:00:00+01:00"}"#;
    assert!(matches!(
        decode(bytes).unwrap_err(),
        DecodeError::InvalidField { field: "date", .. }
    ));
}

#[test]
fn export_payload_describes_the_teff_type() {
    let at = Utc.with_ymd_and_hms(2024, 1, 18, 12, 0, 0).unwrap();
    let payload = export_payload(&alice(), at).unwrap();

    assert_eq!(payload.type_identifier, EXPORT_TYPE_IDENTIFIER);
    assert!(payload.file_name.starts_with("Export2024-01-18"));
    assert!(payload.file_name.ends_with(&format!(".{FILE_EXTENSION}")));
    assert_eq!(decode(&payload.bytes).unwrap(), alice());
    assert_eq!(MIME_TYPE, "application/json");
}

proptest! {
    #[test]
    fn decode_inverts_encode(
        raw_id in any::<u128>(),
        name in ".*",
        // 0000-01-01T00:00:00Z ..= 9999-12-31T23:59:59Z
        secs in -62_167_219_200i64..=253_402_300_799,
        nanos in 0u32..1_000_000_000,
    ) {
        let date = Utc.timestamp_opt(secs, nanos).unwrap();
        let record = Record::with_id(Uuid::from_u128(raw_id), name, date);
        let decoded = decode(&encode(&record).unwrap()).unwrap();
        prop_assert_eq!(decoded, record);
    }
}
