//! Resource Store: get-or-create a Resource row and lock it
//! for the duration of the caller's transaction via `SELECT ... FOR UPDATE`
//! on the `(kind, uuid)` unique key, so concurrent events for the same
//! resource serialize instead of racing. Same query-first /
//! speculative-insert / re-read-on-conflict shape as the Spec Store.

use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

use rl_domain::{Period, ResourceKind, ResourceState, SpecId};

use crate::error::PersistenceError;
use crate::schema::{periods, resources};
use crate::timestamp::{from_millis, to_millis};

#[derive(Queryable, Debug, Clone)]
pub struct ResourceRow {
    pub id: i64,
    pub kind: String,
    pub uuid: String,
    pub project: String,
    pub updated_at: i64,
}

impl ResourceRow {
    pub fn updated_at_utc(&self) -> DateTime<Utc> {
        from_millis(self.updated_at)
    }
}

#[derive(Insertable)]
#[diesel(table_name = resources)]
struct NewResourceRow<'a> {
    kind: &'a str,
    uuid: &'a str,
    project: &'a str,
    updated_at: i64,
}

/// Locates or creates the resource, holding `FOR UPDATE` on the row for the
/// life of the caller's transaction. `initial_watermark` seeds `updated_at`
/// only when the row is newly created.
pub fn get_or_create_locked(
    conn: &mut PgConnection,
    kind: ResourceKind,
    uuid: &str,
    project: &str,
    initial_watermark: DateTime<Utc>,
) -> Result<ResourceRow, PersistenceError> {
    if let Some(row) = find_locked(conn, kind, uuid)? {
        return Ok(row);
    }

    let inserted = conn.transaction(|conn| {
        diesel::insert_into(resources::table)
            .values(NewResourceRow { kind: kind.wire_str(), uuid, project, updated_at: to_millis(initial_watermark) })
            .returning((resources::id, resources::kind, resources::uuid, resources::project, resources::updated_at))
            .get_result::<ResourceRow>(conn)
    });

    match inserted {
        Ok(row) => Ok(row),
        Err(e) => {
            let err: PersistenceError = e.into();
            if err.is_unique_violation() {
                find_locked(conn, kind, uuid)?
                    .ok_or_else(|| PersistenceError::Unknown("resource vanished after unique violation".to_string()))
            } else {
                Err(err)
            }
        }
    }
}

fn find_locked(conn: &mut PgConnection, kind: ResourceKind, uuid: &str) -> Result<Option<ResourceRow>, PersistenceError> {
    resources::table
        .filter(resources::kind.eq(kind.wire_str()))
        .filter(resources::uuid.eq(uuid))
        .for_update()
        .select((resources::id, resources::kind, resources::uuid, resources::project, resources::updated_at))
        .first::<ResourceRow>(conn)
        .optional()
        .map_err(PersistenceError::from)
}

/// Loads the ordered period sequence for an already-locked resource, as the
/// in-memory `ResourceState` the reducer operates on.
pub fn load_state(conn: &mut PgConnection, resource: &ResourceRow) -> Result<ResourceState, PersistenceError> {
    let rows: Vec<(i64, i64, Option<i64>, i64)> = periods::table
        .filter(periods::resource_id.eq(resource.id))
        .order(periods::started_at.asc())
        .select((periods::id, periods::started_at, periods::ended_at, periods::spec_id))
        .load(conn)?;

    let periods = rows
        .into_iter()
        .map(|(id, started_at, ended_at, spec_id)| Period {
            id: Some(id),
            started_at: from_millis(started_at),
            ended_at: ended_at.map(from_millis),
            spec_id: SpecId(spec_id),
        })
        .collect();

    Ok(ResourceState { updated_at: resource.updated_at_utc(), periods })
}
