//! Event Normalizer.
//!
//! Converts the wire representation of an event — `traits` as
//! `(name, type_code, value)` triples, `generated` as an ISO-8601 string —
//! into a typed, keyed event. Pure; no side effects.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rl_domain::event::{TRAIT_TYPE_INTEGER, TRAIT_TYPE_STRING, TRAIT_TYPE_TIMESTAMP};
use rl_domain::{NormalizedEvent, RawEvent, TraitValue};

use crate::errors::ReduceError;

/// Parses `generated` and converts `traits` into a keyed map. Known type
/// codes are `1`=string, `2`=integer, `4`=ISO-8601 timestamp; unknown codes
/// pass the raw JSON value through unchanged.
pub fn normalize(raw: RawEvent) -> Result<NormalizedEvent, ReduceError> {
    let generated = parse_timestamp(&raw.generated)
        .map_err(|_| ReduceError::Malformed(format!("unparseable generated timestamp: {}", raw.generated)))?;

    let mut traits = BTreeMap::new();
    for (name, type_code, value) in raw.traits {
        let converted = convert_trait_value(type_code, value)
            .map_err(|e| ReduceError::Malformed(format!("trait {name}: {e}")))?;
        traits.insert(name, converted);
    }

    Ok(NormalizedEvent { generated, event_type: raw.event_type, traits })
}

fn convert_trait_value(type_code: i64, value: serde_json::Value) -> Result<TraitValue, String> {
    match type_code {
        TRAIT_TYPE_STRING => {
            let s = value.as_str().ok_or("type 1 (string) trait value was not a JSON string")?;
            Ok(TraitValue::Str(s.to_string()))
        }
        TRAIT_TYPE_INTEGER => {
            let i = value.as_i64().ok_or("type 2 (integer) trait value was not a JSON integer")?;
            Ok(TraitValue::Int(i))
        }
        TRAIT_TYPE_TIMESTAMP => {
            let s = value.as_str().ok_or("type 4 (timestamp) trait value was not a JSON string")?;
            let ts = parse_timestamp(s).map_err(|_| format!("unparseable timestamp trait: {s}"))?;
            Ok(TraitValue::Timestamp(ts))
        }
        _ => Ok(TraitValue::Raw(value)),
    }
}

/// Parses an ISO-8601 timestamp the way the upstream convention emits it:
/// usually naive (no UTC offset, e.g. `2020-06-07T01:42:54.736337`), but an
/// explicit offset is accepted too. Naive timestamps are treated as UTC.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ()> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    Err(())
}
