//! rl-cli: starts the resource-ledger HTTP service.
//!
//! Loads `DATABASE_URL` (and friends) from the environment/`.env`, builds
//! the r2d2 pool, runs pending migrations, then serves `rl-api`'s router on
//! `BIND_ADDR` (default `0.0.0.0:8080`). `env_logger` carries the `log`
//! macros `rl-persistence` emits (retry backoff, pool warnings);
//! `tracing-subscriber` carries the per-request spans `tower-http`'s
//! `TraceLayer` emits around the router.

use std::env;
use std::net::SocketAddr;

use rl_api::{router, AppState};
use rl_persistence::{build_dev_pool_from_env, init_dotenv};

#[tokio::main]
async fn main() {
    env_logger::init();
    tracing_subscriber::fmt::init();
    init_dotenv();

    let pool = build_dev_pool_from_env().expect("failed to build database pool / run migrations");
    let state = AppState::new(pool);
    let app = router(state);

    let bind_addr: SocketAddr = env::var("BIND_ADDR").ok().and_then(|v| v.parse().ok()).unwrap_or_else(|| "0.0.0.0:8080".parse().unwrap());

    tracing::info!("resource ledger listening on {bind_addr}");
    let listener = tokio::net::TcpListener::bind(bind_addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
