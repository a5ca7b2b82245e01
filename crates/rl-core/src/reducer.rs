//! Period Reducer — the heart of the system.
//!
//! `check_watermark` implements step 1 (the stale-event guard). `apply`
//! implements steps 5-10 against an already-located `ResourceState`, given
//! a Spec already resolved by the store.
//!
//! Note on step 2 ("advance watermark, commit this intermediate state"):
//! the watermark bump is applied only on a path that ultimately succeeds
//! (bootstrap/close/split/no-op), never ahead of the ignore filter or the
//! open-period check. This keeps invariant property 4 (ignored/stale events
//! never mutate Resource state) intact; it costs nothing in practice
//! because the caller holds the resource's row lock for the whole
//! transaction, so there is no concurrent writer left to race against
//! mid-transaction. See DESIGN.md for the full resolution.

use chrono::{DateTime, Utc};
use rl_domain::{Period, ResourceState, SpecId};

use crate::errors::ReduceError;

/// Step 1: reject the event outright if it is older than the resource's
/// current watermark.
pub fn check_watermark(current_updated_at: DateTime<Utc>, event_generated: DateTime<Utc>) -> Result<(), ReduceError> {
    if current_updated_at > event_generated {
        return Err(ReduceError::EventTooOld);
    }
    Ok(())
}

/// What the reducer did to the resource's period sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReducerOutcome {
    /// First period bootstrapped (and immediately closed by a deletion, if
    /// the same event both created and deleted the resource).
    Bootstrapped,
    /// The open period was closed by a deletion event.
    Closed,
    /// The open period was closed and a new one opened under a new spec.
    Split,
    /// Same spec, no deletion: only the watermark moved.
    NoOp,
}

/// Steps 5-10: given a resource's period state and the event's resolved
/// spec, extend, split, or close the open period. `created_at`/
/// `launched_at`/`deleted_at` are read directly off `event` traits by the
/// caller and passed in to keep this function free of trait-name
/// knowledge.
pub fn apply(
    state: &mut ResourceState,
    event_generated: DateTime<Utc>,
    created_at_or_launched_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    spec_id: SpecId,
) -> Result<ReducerOutcome, ReduceError> {
    // Step 5: bootstrap the first period if this resource has none yet.
    let mut was_bootstrap = false;
    if state.periods.is_empty() {
        let started_at = created_at_or_launched_at.ok_or_else(|| ReduceError::Malformed(
            "cannot bootstrap first period: no created_at/launched_at trait".to_string(),
        ))?;
        state.periods.push(Period::new_open(started_at, spec_id));
        was_bootstrap = true;
    }

    // Step 6: locate the open period.
    let open_indices = state.open_period_indices();
    if open_indices.len() > 1 {
        return Err(ReduceError::MultipleOpenPeriods);
    }
    let Some(open_idx) = open_indices.into_iter().next() else {
        // Step 7: no open period and this isn't the bootstrap path above.
        return Err(ReduceError::EventTooOld);
    };

    // Step 8: deletion closes the open period outright.
    if let Some(deleted_at) = deleted_at {
        state.periods[open_idx].ended_at = Some(deleted_at);
        state.updated_at = event_generated;
        return Ok(if was_bootstrap { ReducerOutcome::Bootstrapped } else { ReducerOutcome::Closed });
    }

    // Step 9: a spec change splits the period at the event time (not the
    // trait time) by design.
    if state.periods[open_idx].spec_id != spec_id {
        state.periods[open_idx].ended_at = Some(event_generated);
        state.periods.push(Period::new_open(event_generated, spec_id));
        state.updated_at = event_generated;
        return Ok(ReducerOutcome::Split);
    }

    // Step 10: no-op, just refresh the watermark.
    state.updated_at = event_generated;
    Ok(if was_bootstrap { ReducerOutcome::Bootstrapped } else { ReducerOutcome::NoOp })
}
