//! Millisecond-since-epoch timestamp conversion for the persisted columns.
//! Sub-millisecond precision is intentionally dropped on the way to
//! storage.

use chrono::{DateTime, Utc};

pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).expect("stored timestamp out of range")
}
