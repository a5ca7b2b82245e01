use axum::http::StatusCode;
use axum::response::IntoResponse;

use rl_api::ApiError;
use rl_core::orchestrator::OrchestratorError;
use rl_persistence::PersistenceError;

#[test]
fn bad_request_maps_to_400() {
    let resp = ApiError::BadRequest("missing field".to_string()).into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn unauthorized_maps_to_401() {
    let resp = ApiError::Unauthorized.into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn conflict_maps_to_409() {
    let resp = ApiError::Conflict("multiple open periods".to_string()).into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[test]
fn orchestrator_malformed_becomes_bad_request() {
    let err: ApiError = OrchestratorError::<PersistenceError>::Malformed("bad event".to_string()).into();
    matches!(err, ApiError::BadRequest(_));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[test]
fn orchestrator_multiple_open_periods_becomes_conflict() {
    let err: ApiError = OrchestratorError::<PersistenceError>::MultipleOpenPeriods.into();
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
}

#[test]
fn orchestrator_unsupported_becomes_bad_request() {
    let err: ApiError = OrchestratorError::<PersistenceError>::Unsupported.into();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}
