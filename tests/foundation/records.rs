//! Integration tests for the record Writer and Reader

use proptest::prelude::*;
use starbridge_foundation::{Reader, SerializationError, Writer};

#[test]
fn mixed_record_reads_back_in_order() {
    let mut wr = Writer::new();
    wr.uint32(2);
    wr.string("Vagabond");
    wr.double(-0.25);
    wr.bool(true);
    wr.int64(i64::MIN);
    let data = wr.into_string();

    let mut rd = Reader::new(&data);
    assert_eq!(rd.uint32().unwrap(), 2);
    assert_eq!(rd.string().unwrap(), "Vagabond");
    assert!((rd.double().unwrap() + 0.25).abs() < f64::EPSILON);
    assert!(rd.bool().unwrap());
    assert_eq!(rd.int64().unwrap(), i64::MIN);
    assert!(rd.is_at_end());
}

#[test]
fn strings_may_contain_newlines() {
    let mut wr = Writer::new();
    wr.string("Deliver to\nBarnard's Star");
    wr.int32(7);
    let data = wr.into_string();

    let mut rd = Reader::new(&data);
    assert_eq!(rd.string().unwrap(), "Deliver to\nBarnard's Star");
    assert_eq!(rd.int32().unwrap(), 7);
}

#[test]
fn truncated_record_is_malformed() {
    let mut rd = Reader::new("3\n");
    rd.int32().unwrap();
    let err = rd.int32().unwrap_err();
    assert!(matches!(
        err.as_serialization(),
        Some(SerializationError::Malformed { found, .. }) if found == "end of data"
    ));
}

#[test]
fn reader_tracks_lines() {
    let mut rd = Reader::new("1\n2\n");
    assert_eq!(rd.line(), 1);
    rd.int32().unwrap();
    assert_eq!(rd.line(), 2);
    assert_eq!(rd.remaining(), "2\n");
}

proptest! {
    #[test]
    fn any_string_round_trips(s in ".*") {
        let mut wr = Writer::new();
        wr.string(&s);
        let data = wr.into_string();
        prop_assert_eq!(Reader::new(&data).string().unwrap(), s);
    }

    #[test]
    fn any_double_round_trips(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let mut wr = Writer::new();
        wr.double(x);
        let data = wr.into_string();
        prop_assert_eq!(Reader::new(&data).double().unwrap().to_bits(), x.to_bits());
    }
}
