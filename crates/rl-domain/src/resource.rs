use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource_kind::ResourceKind;
use crate::spec::{Spec, SpecId};

/// `(kind, uuid, project)` — the key a Resource row is looked up and locked
/// by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub uuid: String,
    pub project: String,
}

/// One half-open interval `[started_at, ended_at)` during which a resource
/// existed under one Spec. Kept minimal (spec by id, not by value) since
/// this is the shape the reducer mutates under a row lock; the full Spec
/// attributes are resolved separately for range-query output.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// `None` for a period not yet assigned a row id by the store.
    pub id: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub spec_id: SpecId,
}

impl Period {
    pub fn new_open(started_at: DateTime<Utc>, spec_id: SpecId) -> Self {
        Self { id: None, started_at, ended_at: None, spec_id }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Derived duration in seconds, clamped against `now` while open.
    pub fn seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = self.ended_at.unwrap_or(now);
        (end - self.started_at).num_seconds()
    }
}

/// The in-memory working state a Period Reducer pass operates on: the
/// watermark plus the ordered period sequence, loaded under the resource's
/// row lock and written back inside the same transaction.
#[derive(Debug, Clone)]
pub struct ResourceState {
    pub updated_at: DateTime<Utc>,
    pub periods: Vec<Period>,
}

impl ResourceState {
    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        Self { updated_at, periods: Vec::new() }
    }

    /// Indices of periods with a null `ended_at`. Normally 0 or 1; more than
    /// one indicates corrupted state (invariant R2 violated).
    pub fn open_period_indices(&self) -> Vec<usize> {
        self.periods
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_open())
            .map(|(i, _)| i)
            .collect()
    }
}

/// A fully hydrated period for range-query output: detached from any
/// persistent identity, clamped to the caller's window, with the Spec
/// resolved inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedPeriod {
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub seconds: i64,
    pub spec: Spec,
}

/// A fully hydrated resource for range-query output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedResource {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub project: String,
    pub updated_at: DateTime<Utc>,
    pub periods: Vec<LoadedPeriod>,
}
