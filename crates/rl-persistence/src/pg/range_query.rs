//! Range Query Projector — the loading half. Loads every resource with a
//! period intersecting `[start, end]` into detached `LoadedResource`/
//! `LoadedPeriod` value structs (never a live `Queryable` tied to the
//! connection, so clamping can't accidentally write back), then hands the
//! clamp-and-drop-zero-length work to `rl_core::projector`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;

use rl_core::clamp_period;
use rl_domain::{InstanceSpec, LoadedPeriod, LoadedResource, ResourceKind, Spec, VolumeSpec};

use crate::error::PersistenceError;
use crate::pg::with_retry;
use crate::schema::{instance_specs, periods, resources, volume_specs};
use crate::timestamp::{from_millis, to_millis};

#[derive(Queryable)]
struct ResourcePeriodRow {
    resource_id: i64,
    uuid: String,
    kind: String,
    project: String,
    updated_at: i64,
    started_at: i64,
    ended_at: Option<i64>,
    spec_id: i64,
}

pub fn load_resources(conn: &mut PgConnection, start: DateTime<Utc>, end: DateTime<Utc>, project: Option<&str>) -> Result<Vec<LoadedResource>, PersistenceError> {
    let start_ms = to_millis(start);
    let end_ms = to_millis(end);

    let rows: Vec<ResourcePeriodRow> = with_retry(|| {
        let mut query = resources::table
            .inner_join(periods::table.on(periods::resource_id.eq(resources::id)))
            .filter(periods::started_at.le(end_ms))
            .filter(periods::ended_at.is_null().or(periods::ended_at.ge(start_ms)))
            .select((
                resources::id,
                resources::uuid,
                resources::kind,
                resources::project,
                resources::updated_at,
                periods::started_at,
                periods::ended_at,
                periods::spec_id,
            ))
            .into_boxed::<Pg>();

        if let Some(project) = project {
            query = query.filter(resources::project.eq(project));
        }

        query.load::<ResourcePeriodRow>(conn).map_err(PersistenceError::from)
    })?;

    let mut by_resource: HashMap<i64, (String, ResourceKind, String, DateTime<Utc>, Vec<LoadedPeriod>)> = HashMap::new();

    for row in rows {
        let kind = ResourceKind::from_wire_str(&row.kind)
            .ok_or_else(|| PersistenceError::Unknown(format!("unknown resource kind in storage: {}", row.kind)))?;
        let spec = resolve_spec(conn, kind, row.spec_id)?;

        let Some(clamped) = clamp_period(from_millis(row.started_at), row.ended_at.map(from_millis), spec, start, end) else {
            by_resource.entry(row.resource_id).or_insert_with(|| {
                (row.uuid.clone(), kind, row.project.clone(), from_millis(row.updated_at), Vec::new())
            });
            continue;
        };

        let entry = by_resource
            .entry(row.resource_id)
            .or_insert_with(|| (row.uuid.clone(), kind, row.project.clone(), from_millis(row.updated_at), Vec::new()));
        entry.4.push(clamped);
    }

    let mut results: Vec<LoadedResource> = by_resource
        .into_values()
        .filter(|(_, _, _, _, periods)| !periods.is_empty())
        .map(|(uuid, kind, project, updated_at, mut periods)| {
            periods.sort_by_key(|p| p.started_at);
            LoadedResource { uuid, kind, project, updated_at, periods }
        })
        .collect();

    results.sort_by(|a, b| a.uuid.cmp(&b.uuid));
    Ok(results)
}

fn resolve_spec(conn: &mut PgConnection, kind: ResourceKind, spec_id: i64) -> Result<Spec, PersistenceError> {
    match kind {
        ResourceKind::Instance => {
            let (instance_type, state) = instance_specs::table
                .find(spec_id)
                .select((instance_specs::instance_type, instance_specs::state))
                .first::<(String, String)>(conn)?;
            Ok(Spec::Instance(InstanceSpec { instance_type, state }))
        }
        ResourceKind::Volume => {
            let (volume_type, volume_size, state) = volume_specs::table
                .find(spec_id)
                .select((volume_specs::volume_type, volume_specs::volume_size, volume_specs::state))
                .first::<(String, i64, String)>(conn)?;
            Ok(Spec::Volume(VolumeSpec { volume_type, volume_size, state }))
        }
    }
}
