//! Postgres (Diesel) implementations of the storage seams `rl-core` defines.
//!
//! - `spec_store`: Spec Store get-or-create (§4.3).
//! - `resource_store`: Resource Store get-or-create with row lock (§4.4).
//! - `ingest`: `ResourceTransaction` impl wiring the reducer into one
//!   transaction per event (§4.7).
//! - `range_query`: the loading half of the Range Query Projector (§4.6).

pub mod ingest;
pub mod range_query;
pub mod resource_store;
pub mod spec_store;

use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use log::warn;

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;

pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Abstracts over how a pooled connection is obtained, so tests can swap in
/// a fake without depending on r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError>;
}

pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PersistenceError> {
        self.pool.get().map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Retryable errors: serialization conflicts from concurrent writers on
/// disjoint resources hitting the same spec row, and transient pool/IO
/// failures.
pub(crate) fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
                || m.contains("could not serialize access due to concurrent update")
                || m.contains("terminating connection due to administrator command")
                || m.contains("connection closed")
                || m.contains("connection refused")
                || m.contains("timeout")
        }
        _ => false,
    }
}

/// Three attempts, 15/30/45ms backoff.
pub(crate) fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
where
    F: FnMut() -> Result<T, PersistenceError>,
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable persistence error (attempt {}): {e} -> sleeping {delay_ms}ms", attempts + 1);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .min_idle(Some(final_min))
        .max_size(validated_max)
        .build(manager)
        .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get().map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Development helper: loads `.env`, reads `DbConfig`, builds an
/// already-migrated pool.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env();
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
