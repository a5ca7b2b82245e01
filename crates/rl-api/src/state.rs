use std::sync::Arc;

use rl_persistence::PgPool;

/// Shared axum application state: the connection pool, cheaply clonable per
/// request.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<PgPool>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}
