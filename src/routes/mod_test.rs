use uuid::Uuid;

use super::*;
use crate::llm::types::LlmError;
use crate::routes::test_support::{send, send_as};
use crate::state::test_helpers;

#[tokio::test]
async fn healthz_is_ok() {
    let app = app(test_helpers::test_app_state());
    assert_eq!(send(&app, "GET", "/healthz", None).await.status, StatusCode::OK);
}

#[tokio::test]
async fn missing_owner_header_means_local_owner() {
    let state = test_helpers::test_app_state();
    let app = app(state.clone());

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/diagrams")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    assert_eq!(state.store.list(DEFAULT_OWNER).await.unwrap().len(), 1);
    assert_eq!(send_as(&app, "  ", "GET", "/api/diagrams", None).await.json().as_array().unwrap().len(), 1);
}

#[test]
fn diagram_errors_map_to_statuses() {
    let id = Uuid::nil();
    assert_eq!(diagram_error_status(&DiagramError::NotFound(id)), StatusCode::NOT_FOUND);
    assert_eq!(diagram_error_status(&DiagramError::Busy(id)), StatusCode::CONFLICT);
    assert_eq!(
        diagram_error_status(&DiagramError::Store(StoreError::OwnerConflict { id })),
        StatusCode::CONFLICT
    );
    assert_eq!(
        diagram_error_status(&DiagramError::Invalid(diagram::ModelError::InvalidPoolSize("p".into()))),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        diagram_error_status(&DiagramError::Store(StoreError::Database(sqlx::Error::PoolTimedOut))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn assistant_errors_map_to_statuses() {
    assert_eq!(assistant_error_status(&AssistantError::NotConfigured), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        assistant_error_status(&AssistantError::Llm(LlmError::ApiRequest("timeout".into()))),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        assistant_error_status(&AssistantError::Diagram(DiagramError::Busy(Uuid::nil()))),
        StatusCode::CONFLICT
    );
}

#[test]
fn api_error_body_carries_code_and_retryable() {
    let err = ApiError::from(DiagramError::Busy(Uuid::nil()));
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.body.code, "E_DIAGRAM_BUSY");
    assert!(err.body.retryable);
}
