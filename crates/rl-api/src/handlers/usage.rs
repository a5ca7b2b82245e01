//! `GET /v1/resources`. Minimal header-based auth: `X-Project-Id`
//! supplies the caller's project by default, `X-Roles` carries
//! comma-separated roles, and an `admin` role may override via the
//! `project_id` query parameter.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use rl_domain::LoadedResource;
use rl_persistence::pg::range_query::load_resources;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub start: String,
    pub end: String,
    pub project_id: Option<String>,
}

pub async fn usage(State(state): State<AppState>, headers: HeaderMap, Query(query): Query<UsageQuery>) -> Result<Json<Vec<LoadedResource>>, ApiError> {
    let caller_project = headers
        .get("X-Project-Id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("usage query rejected: missing X-Project-Id header");
            ApiError::Unauthorized
        })?
        .to_string();

    let roles_header = headers.get("X-Roles").and_then(|v| v.to_str().ok()).unwrap_or("");
    let project = effective_project(roles_header, query.project_id.as_deref(), caller_project);

    let start = parse_timestamp(&query.start)?;
    let end = parse_timestamp(&query.end)?;

    let pool = (*state.pool).clone();
    let resources = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| ApiError::Internal(format!("pool checkout: {e}")))?;
        load_resources(&mut conn, start, end, Some(&project)).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("usage task panicked: {e}")))??;

    Ok(Json(resources))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)).map_err(|_| ApiError::BadRequest(format!("unparseable timestamp: {s}")))
}

/// Only an `admin` caller may look at a project other than its own; anyone
/// else is pinned to `caller_project` regardless of what `project_id` asks
/// for.
fn effective_project(roles_header: &str, requested_project: Option<&str>, caller_project: String) -> String {
    let is_admin = roles_header.split(',').map(str::trim).any(|r| r == "admin");
    if is_admin {
        requested_project.map(str::to_string).unwrap_or(caller_project)
    } else {
        caller_project
    }
}

#[cfg(test)]
mod tests {
    use super::effective_project;

    #[test]
    fn non_admin_is_pinned_to_its_own_project() {
        let result = effective_project("viewer", Some("other-project"), "caller-project".to_string());
        assert_eq!(result, "caller-project");
    }

    #[test]
    fn admin_can_override_with_project_id() {
        let result = effective_project("admin", Some("other-project"), "caller-project".to_string());
        assert_eq!(result, "other-project");
    }

    #[test]
    fn admin_without_override_falls_back_to_caller_project() {
        let result = effective_project("viewer, admin", None, "caller-project".to_string());
        assert_eq!(result, "caller-project");
    }

    #[test]
    fn missing_roles_header_is_non_admin() {
        let result = effective_project("", Some("other-project"), "caller-project".to_string());
        assert_eq!(result, "caller-project");
    }
}
