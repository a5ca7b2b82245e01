use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trait type codes from the upstream event convention.
pub const TRAIT_TYPE_STRING: i64 = 1;
pub const TRAIT_TYPE_INTEGER: i64 = 2;
pub const TRAIT_TYPE_TIMESTAMP: i64 = 4;

/// A single normalized trait value. Unknown type codes are carried through
/// unchanged as `Raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    Str(String),
    Int(i64),
    Timestamp(DateTime<Utc>),
    Raw(serde_json::Value),
}

impl TraitValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TraitValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            TraitValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TraitValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Wire representation of one event, as accepted by the ingress endpoint.
/// `traits` is a sequence of `(name, type_code, value)` triples, matching
/// the upstream event convention verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub generated: String,
    pub event_type: String,
    pub traits: Vec<(String, i64, serde_json::Value)>,
}

/// An event whose `generated` timestamp has been parsed and whose `traits`
/// have been converted to a keyed, typed map. Transient: never persisted.
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    pub generated: DateTime<Utc>,
    pub event_type: String,
    pub traits: BTreeMap<String, TraitValue>,
}

impl NormalizedEvent {
    pub fn trait_str(&self, name: &str) -> Option<&str> {
        self.traits.get(name).and_then(TraitValue::as_str)
    }

    pub fn trait_timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.traits.get(name).and_then(TraitValue::as_timestamp)
    }

    pub fn trait_int(&self, name: &str) -> Option<i64> {
        self.traits.get(name).and_then(TraitValue::as_int)
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }
}
