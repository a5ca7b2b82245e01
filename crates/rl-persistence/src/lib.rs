//! rl-persistence
//!
//! Postgres/Diesel bindings for the storage seams `rl-core` defines: Spec
//! Store and Resource Store get-or-create, the per-event ingest transaction,
//! and the range-query loader. No business logic lives here beyond
//! translating the reducer's pure decisions into SQL — `rl-core` owns the
//! rules, this crate owns making them durable.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;
pub mod timestamp;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, ingest::PgResourceTransaction, range_query::load_resources, ConnectionProvider, PgPool, PoolProvider};
