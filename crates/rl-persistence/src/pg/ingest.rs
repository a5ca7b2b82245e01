//! Ingest Orchestrator's DB-touching half: one Diesel transaction per
//! event, holding the resource's row lock for the whole of it,
//! implementing `rl_core::orchestrator::ResourceTransaction`.

use diesel::prelude::*;
use diesel::Connection;

use rl_core::{apply as reduce_apply, build_spec, check_watermark, is_event_ignored, ReduceError, ReducerOutcome, ResourceTransaction, TxOutcome};
use rl_domain::{NormalizedEvent, Period, ResourceKind};

use crate::error::PersistenceError;
use crate::pg::{is_retryable, resource_store, spec_store, ConnectionProvider};
use crate::schema::{periods, resources};
use crate::timestamp::to_millis;

pub struct PgResourceTransaction<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgResourceTransaction<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Local error type so `?` works inside the Diesel transaction closure
/// without `TxOutcome` (defined in `rl-core`) needing a `From<diesel::result::Error>`
/// impl here, which the orphan rules wouldn't allow.
enum TxError {
    Reduce(ReduceError),
    Store(PersistenceError),
}

impl From<diesel::result::Error> for TxError {
    fn from(e: diesel::result::Error) -> Self {
        TxError::Store(PersistenceError::from(e))
    }
}

impl From<PersistenceError> for TxError {
    fn from(e: PersistenceError) -> Self {
        TxError::Store(e)
    }
}

impl From<ReduceError> for TxError {
    fn from(e: ReduceError) -> Self {
        TxError::Reduce(e)
    }
}

impl<P: ConnectionProvider> ResourceTransaction for PgResourceTransaction<P> {
    type Error = PersistenceError;

    fn apply_event(&mut self, kind: ResourceKind, event: &NormalizedEvent) -> Result<(), TxOutcome<Self::Error>> {
        let uuid = event
            .trait_str("resource_id")
            .ok_or_else(|| TxOutcome::Reduce(ReduceError::Malformed("missing trait: resource_id".to_string())))?
            .to_string();
        let project = event
            .trait_str("project_id")
            .ok_or_else(|| TxOutcome::Reduce(ReduceError::Malformed("missing trait: project_id".to_string())))?
            .to_string();
        let created_at_or_launched_at = event.trait_timestamp("created_at").or_else(|| event.trait_timestamp("launched_at"));
        let deleted_at = event.trait_timestamp("deleted_at");

        let mut attempts = 0;
        loop {
            let mut conn = self.provider.connection().map_err(TxOutcome::Store)?;

            let result: Result<(), TxError> = conn.transaction(|conn| {
                let resource = resource_store::get_or_create_locked(conn, kind, &uuid, &project, event.generated)?;

                check_watermark(resource.updated_at_utc(), event.generated)?;

                if is_event_ignored(kind, event) {
                    return Err(TxError::Reduce(ReduceError::Ignored));
                }

                let spec = build_spec(kind, event)?;
                let spec_id = spec_store::get_or_create(conn, &spec)?;

                let mut state = resource_store::load_state(conn, &resource)?;
                let open_idx_before = state.open_period_indices().into_iter().next();

                let outcome = reduce_apply(&mut state, event.generated, created_at_or_launched_at, deleted_at, spec_id)?;

                match outcome {
                    ReducerOutcome::Bootstrapped => {
                        insert_period(conn, resource.id, &state.periods[0])?;
                    }
                    ReducerOutcome::Closed => {
                        let idx = open_idx_before.expect("Closed implies a previously-open period existed");
                        close_period(conn, &state.periods[idx])?;
                    }
                    ReducerOutcome::Split => {
                        let idx = open_idx_before.expect("Split implies a previously-open period existed");
                        close_period(conn, &state.periods[idx])?;
                        insert_period(conn, resource.id, state.periods.last().expect("split appended a new period"))?;
                    }
                    ReducerOutcome::NoOp => {}
                }

                diesel::update(resources::table.find(resource.id)).set(resources::updated_at.eq(to_millis(state.updated_at))).execute(conn)?;

                Ok(())
            });

            match result {
                Ok(()) => return Ok(()),
                Err(TxError::Store(e)) if is_retryable(&e) && attempts < 3 => {
                    attempts += 1;
                    std::thread::sleep(std::time::Duration::from_millis(15 * attempts as u64));
                }
                Err(TxError::Store(e)) => return Err(TxOutcome::Store(e)),
                Err(TxError::Reduce(e)) => return Err(TxOutcome::Reduce(e)),
            }
        }
    }
}

fn insert_period(conn: &mut diesel::PgConnection, resource_id: i64, period: &Period) -> Result<(), diesel::result::Error> {
    diesel::insert_into(periods::table)
        .values((
            periods::resource_id.eq(resource_id),
            periods::started_at.eq(to_millis(period.started_at)),
            periods::ended_at.eq(period.ended_at.map(to_millis)),
            periods::spec_id.eq(period.spec_id.0),
        ))
        .execute(conn)?;
    Ok(())
}

fn close_period(conn: &mut diesel::PgConnection, period: &Period) -> Result<(), diesel::result::Error> {
    let id = period.id.expect("closing a period that was loaded from the database");
    let ended_at = period.ended_at.expect("close_period called on a still-open period");
    diesel::update(periods::table.find(id)).set(periods::ended_at.eq(Some(to_millis(ended_at)))).execute(conn)?;
    Ok(())
}
