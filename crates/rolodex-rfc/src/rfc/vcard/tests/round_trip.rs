//! Round-trip tests: parse, serialize, parse again, compare.

use super::fixtures::*;
use crate::rfc::vcard::build::{serialize, serialize_single};
use crate::rfc::vcard::parse::{parse, parse_single};

/// Parses, serializes, and re-parses a vCard, checking the model survives.
fn round_trip(input: &str) -> Result<(), String> {
    let original = parse_single(input).map_err(|e| format!("first parse failed: {e}"))?;
    let serialized = serialize_single(&original);
    let reparsed = parse_single(&serialized)
        .map_err(|e| format!("re-parse failed: {e}\nSerialized:\n{serialized}"))?;

    if original.version() != reparsed.version() {
        return Err(format!(
            "version mismatch: {} vs {}",
            original.version(),
            reparsed.version()
        ));
    }

    if original.len() != reparsed.len() {
        return Err(format!(
            "property count mismatch: {} vs {}\nSerialized:\n{serialized}",
            original.len(),
            reparsed.len()
        ));
    }

    for (a, b) in original.iter().zip(reparsed.iter()) {
        if a != b {
            return Err(format!(
                "property mismatch:\n  original: {a:?}\n  reparsed: {b:?}\nSerialized:\n{serialized}"
            ));
        }
    }

    Ok(())
}

#[test]
fn round_trip_author() {
    round_trip(VCARD_AUTHOR).expect("round trip should succeed");
}

#[test]
fn round_trip_john_smith() {
    round_trip(VCARD_JOHN_SMITH).expect("round trip should succeed");
}

#[test_log::test]
fn round_trip_legacy_quoted_printable() {
    round_trip(VCARD_LEGACY_QP).expect("round trip should succeed");
}

#[test]
fn round_trip_photo() {
    round_trip(VCARD_PHOTO_V3).expect("round trip should succeed");
    round_trip(VCARD_PHOTO_V4).expect("round trip should succeed");
}

#[test]
fn round_trip_long_note() {
    round_trip(VCARD_LONG_NOTE).expect("round trip should succeed");
}

#[test]
fn round_trip_organization() {
    round_trip(VCARD_ORGANIZATION).expect("round trip should succeed");
}

#[test]
fn round_trip_collection() {
    let set = parse(VCARD_SHARED_PHONE).expect("parse should succeed");
    let reparsed = parse(&serialize(&set)).expect("re-parse should succeed");
    assert_eq!(set.len(), 3);
    assert_eq!(set.cards(), reparsed.cards());
}

#[test]
fn serialization_is_stable() {
    for input in [VCARD_AUTHOR, VCARD_JOHN_SMITH, VCARD_LEGACY_QP, VCARD_LONG_NOTE] {
        let first = serialize_single(&parse_single(input).expect("parse should succeed"));
        let second = serialize_single(&parse_single(&first).expect("re-parse should succeed"));
        assert_eq!(first, second);
    }
}
