//! Range Query Projector — the pure half.
//!
//! Loading resources whose periods intersect `[start, end]` is a SQL
//! concern (`rl-persistence::range_query`); this module is the clamping and
//! zero-length-drop logic applied to already-loaded, detached period data,
//! so it can be unit-tested without a database.

use chrono::{DateTime, Utc};
use rl_domain::{LoadedPeriod, Spec};

/// The SQL-equivalent intersection predicate, exposed so both the SQL
/// builder and tests agree on the same definition:
/// `started_at <= end AND (ended_at IS NULL OR ended_at >= start)`.
pub fn intersects(started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    started_at <= end && ended_at.map_or(true, |e| e >= start)
}

/// Clamps one period to `[start, end]`: an open or overflowing `ended_at`
/// clamps to `end`, not to wall-clock `now` — the
/// query window, not the present moment, bounds an in-progress period's
/// projected length. Returns `None` if the clamped period has zero length.
pub fn clamp_period(started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>, spec: Spec, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<LoadedPeriod> {
    let clamped_start = started_at.max(start);
    let clamped_end = match ended_at {
        Some(e) if e <= end => e,
        _ => end,
    };
    let seconds = (clamped_end - clamped_start).num_seconds().max(0);
    if seconds == 0 {
        return None;
    }
    Some(LoadedPeriod { started_at: clamped_start, ended_at: Some(clamped_end), seconds, spec })
}
