//! `POST /v1/event`. Deserializes the wire event batch directly into
//! `RawEvent` (its `Deserialize` already matches the
//! `(name, type_code, value)` trait-triple wire shape) and drives it
//! through `apply_batch`. Diesel's connection is synchronous, so the whole
//! batch runs inside `spawn_blocking` to keep it off the async executor.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use rl_core::orchestrator::{apply_batch, BatchOutcome, StopReason};
use rl_domain::RawEvent;
use rl_persistence::pg::ingest::PgResourceTransaction;
use rl_persistence::PoolProvider;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn ingest(State(state): State<AppState>, Json(events): Json<Vec<RawEvent>>) -> Result<Response, ApiError> {
    if events.is_empty() {
        return Err(ApiError::BadRequest("empty event batch".to_string()));
    }

    let pool = (*state.pool).clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut tx = PgResourceTransaction::new(PoolProvider { pool });
        apply_batch(events, &mut tx)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("ingest task panicked: {e}")))??;

    Ok(match outcome {
        BatchOutcome::AllApplied => StatusCode::NO_CONTENT.into_response(),
        BatchOutcome::Stopped { at_index, reason } => {
            let reason = match reason {
                StopReason::Ignored => "ignored",
                StopReason::EventTooOld => "event too old",
            };
            tracing::debug!(at_index, reason, "batch stopped before its last event");
            (StatusCode::ACCEPTED, Json(serde_json::json!({ "stopped_at_index": at_index, "reason": reason }))).into_response()
        }
    })
}
