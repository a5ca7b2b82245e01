//! rl-api
//!
//! The HTTP boundary: `POST /v1/event` ingests a batch through
//! the orchestrator, `GET /v1/resources` answers range queries. Handlers
//! hold no business logic; they parse the wire shape, hand off to `rl-core`
//! / `rl-persistence`, and translate the outcome back into a response.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::router;
pub use state::AppState;
