//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API over the diagram services. Every diagram route is scoped to the
//! caller's owner id, read from the `X-Owner-Id` header. Errors leave as
//! `{ "code", "message", "retryable" }` bodies via [`ApiError`].

pub mod chat;
pub mod diagrams;

use std::convert::Infallible;

use axum::Router;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::services::assistant::AssistantError;
use crate::services::diagram::DiagramError;
use crate::services::persistence::StoreError;
use crate::state::AppState;

pub const OWNER_HEADER: &str = "x-owner-id";
pub const DEFAULT_OWNER: &str = "local";

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/diagrams", get(diagrams::list).post(diagrams::create))
        .route(
            "/api/diagrams/{id}",
            get(diagrams::get_one)
                .put(diagrams::replace)
                .patch(diagrams::rename)
                .delete(diagrams::delete),
        )
        .route("/api/diagrams/{id}/modifications", post(diagrams::apply))
        .route("/api/diagrams/{id}/export/mermaid", get(diagrams::export_mermaid))
        .route("/api/diagrams/{id}/export/bpmn", get(diagrams::export_bpmn))
        .route("/api/diagrams/{id}/chat", post(chat::send))
        .route("/api/diagrams/{id}/messages", get(chat::list_messages).delete(chat::clear_messages))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// OWNER
// =============================================================================

/// Caller identity. Missing or blank header means the local owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl<S> axum::extract::FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_OWNER);
        Ok(Self(owner.to_owned()))
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn diagram_error_status(err: &DiagramError) -> StatusCode {
    match err {
        DiagramError::NotFound(_) => StatusCode::NOT_FOUND,
        DiagramError::Busy(_) | DiagramError::Store(StoreError::OwnerConflict { .. }) => StatusCode::CONFLICT,
        DiagramError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DiagramError::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn assistant_error_status(err: &AssistantError) -> StatusCode {
    match err {
        AssistantError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AssistantError::Llm(_) => StatusCode::BAD_GATEWAY,
        AssistantError::Diagram(e) => diagram_error_status(e),
    }
}

impl From<DiagramError> for ApiError {
    fn from(err: DiagramError) -> Self {
        Self::from_code(diagram_error_status(&err), &err)
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self::from_code(assistant_error_status(&err), &err)
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
