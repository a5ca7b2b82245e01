//! Embedded migration runner.

use diesel::pg::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::PersistenceError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn run_pending_migrations(conn: &mut PgConnection) -> Result<(), PersistenceError> {
    conn.run_pending_migrations(MIGRATIONS).map(|_| ()).map_err(|e| PersistenceError::Unknown(format!("migration error: {e}")))
}
