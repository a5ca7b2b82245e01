//! Spec Store: get-or-create a deduplicated, immutable Spec row.
//! Query-first, then a speculative insert inside a nested transaction
//! (Diesel promotes this to a savepoint automatically since it always runs
//! inside the caller's event transaction); a unique-violation on the insert
//! means a concurrent writer won the race, so we roll back and re-read
//! rather than propagate the error.

use diesel::prelude::*;
use diesel::pg::PgConnection;

use rl_domain::{InstanceSpec, Spec, SpecId, VolumeSpec};

use crate::error::PersistenceError;
use crate::schema::{instance_specs, volume_specs};

#[derive(Insertable)]
#[diesel(table_name = instance_specs)]
struct NewInstanceSpec<'a> {
    instance_type: &'a str,
    state: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = volume_specs)]
struct NewVolumeSpec<'a> {
    volume_type: &'a str,
    volume_size: i64,
    state: &'a str,
}

pub fn get_or_create(conn: &mut PgConnection, spec: &Spec) -> Result<SpecId, PersistenceError> {
    match spec {
        Spec::Instance(s) => get_or_create_instance(conn, s),
        Spec::Volume(s) => get_or_create_volume(conn, s),
    }
}

fn get_or_create_instance(conn: &mut PgConnection, spec: &InstanceSpec) -> Result<SpecId, PersistenceError> {
    if let Some(id) = find_instance(conn, spec)? {
        return Ok(id);
    }

    let inserted = conn.transaction(|conn| {
        diesel::insert_into(instance_specs::table)
            .values(NewInstanceSpec { instance_type: &spec.instance_type, state: &spec.state })
            .returning(instance_specs::id)
            .get_result::<i64>(conn)
    });

    match inserted {
        Ok(id) => Ok(SpecId(id)),
        Err(e) => {
            let err: PersistenceError = e.into();
            if err.is_unique_violation() {
                find_instance(conn, spec)?
                    .ok_or_else(|| PersistenceError::Unknown("instance spec vanished after unique violation".to_string()))
            } else {
                Err(err)
            }
        }
    }
}

fn find_instance(conn: &mut PgConnection, spec: &InstanceSpec) -> Result<Option<SpecId>, PersistenceError> {
    instance_specs::table
        .filter(instance_specs::instance_type.eq(&spec.instance_type))
        .filter(instance_specs::state.eq(&spec.state))
        .select(instance_specs::id)
        .first::<i64>(conn)
        .optional()
        .map(|opt| opt.map(SpecId))
        .map_err(PersistenceError::from)
}

fn get_or_create_volume(conn: &mut PgConnection, spec: &VolumeSpec) -> Result<SpecId, PersistenceError> {
    if let Some(id) = find_volume(conn, spec)? {
        return Ok(id);
    }

    let inserted = conn.transaction(|conn| {
        diesel::insert_into(volume_specs::table)
            .values(NewVolumeSpec { volume_type: &spec.volume_type, volume_size: spec.volume_size, state: &spec.state })
            .returning(volume_specs::id)
            .get_result::<i64>(conn)
    });

    match inserted {
        Ok(id) => Ok(SpecId(id)),
        Err(e) => {
            let err: PersistenceError = e.into();
            if err.is_unique_violation() {
                find_volume(conn, spec)?
                    .ok_or_else(|| PersistenceError::Unknown("volume spec vanished after unique violation".to_string()))
            } else {
                Err(err)
            }
        }
    }
}

fn find_volume(conn: &mut PgConnection, spec: &VolumeSpec) -> Result<Option<SpecId>, PersistenceError> {
    volume_specs::table
        .filter(volume_specs::volume_type.eq(&spec.volume_type))
        .filter(volume_specs::volume_size.eq(spec.volume_size))
        .filter(volume_specs::state.eq(&spec.state))
        .select(volume_specs::id)
        .first::<i64>(conn)
        .optional()
        .map(|opt| opt.map(SpecId))
        .map_err(PersistenceError::from)
}
