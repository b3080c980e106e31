//! Diagram service: lifecycle and batch application over the store.
//!
//! DESIGN
//! ======
//! Every write (batch, replace, rename, delete) holds the (owner, diagram) guard
//! for the whole load → modify → save cycle, so two writers never interleave
//! on the same document. A second writer gets [`DiagramError::Busy`] instead
//! of waiting. Reads do not take the guard.

use diagram::consts::DEFAULT_DIAGRAM_NAME;
use diagram::{ApplyOutcome, Diagram, Modification, ModelError, apply_modifications};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::guard::BatchPermit;
use super::persistence::StoreError;
use crate::error::ErrorCode;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("diagram not found: {0}")]
    NotFound(Uuid),
    #[error("diagram {0} is busy with another modification")]
    Busy(Uuid),
    #[error("invalid diagram: {0}")]
    Invalid(#[from] ModelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for DiagramError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_DIAGRAM_NOT_FOUND",
            Self::Busy(_) => "E_DIAGRAM_BUSY",
            Self::Invalid(_) => "E_DIAGRAM_INVALID",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Busy(_) => true,
            Self::Store(e) => e.retryable(),
            Self::NotFound(_) | Self::Invalid(_) => false,
        }
    }
}

/// Listing row: identity and counts without the full document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSummary {
    pub id: Uuid,
    pub name: String,
    pub element_count: usize,
    pub connection_count: usize,
    pub pool_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Diagram> for DiagramSummary {
    fn from(d: &Diagram) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            element_count: d.elements.len(),
            connection_count: d.connections.len(),
            pool_count: d.pools.len(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

// =============================================================================
// READS
// =============================================================================

/// All diagrams of `owner`, newest-created first.
///
/// # Errors
///
/// Returns a store error if the backend fails.
pub async fn list_diagrams(state: &AppState, owner: &str) -> Result<Vec<DiagramSummary>, DiagramError> {
    let diagrams = state.store.list(owner).await?;
    Ok(diagrams.iter().map(DiagramSummary::from).collect())
}

/// # Errors
///
/// Returns [`DiagramError::NotFound`] if the diagram does not exist for `owner`.
pub async fn get_diagram(state: &AppState, owner: &str, id: Uuid) -> Result<Diagram, DiagramError> {
    state
        .store
        .load(owner, id)
        .await?
        .ok_or(DiagramError::NotFound(id))
}

// =============================================================================
// WRITES
// =============================================================================

/// Create and persist an empty diagram. A missing or blank name falls back
/// to the default diagram name.
///
/// # Errors
///
/// Returns a store error if the save fails.
pub async fn create_diagram(state: &AppState, owner: &str, name: Option<&str>) -> Result<Diagram, DiagramError> {
    let diagram = Diagram::new(name.unwrap_or_default());
    state.store.save(owner, &diagram).await?;
    info!(%owner, diagram_id = %diagram.id, name = %diagram.name, "diagram: created");
    Ok(diagram)
}

/// Rename a diagram. A blank name falls back to the default diagram name.
///
/// # Errors
///
/// Returns `NotFound`, `Busy` or a store error.
pub async fn rename_diagram(state: &AppState, owner: &str, id: Uuid, name: &str) -> Result<Diagram, DiagramError> {
    let _permit = acquire(state, owner, id)?;
    let mut diagram = get_diagram(state, owner, id).await?;
    diagram.name = if name.trim().is_empty() { DEFAULT_DIAGRAM_NAME.to_string() } else { name.to_string() };
    diagram.updated_at = OffsetDateTime::now_utc();
    state.store.save(owner, &diagram).await?;
    info!(%owner, diagram_id = %id, name = %diagram.name, "diagram: renamed");
    Ok(diagram)
}

/// Replace the whole document (direct editor save).
///
/// Identity and creation time are kept from the stored diagram; the
/// submitted document must be structurally valid and may not change the
/// kind of an element that already exists.
///
/// # Errors
///
/// Returns `Invalid` if the document fails validation, or `NotFound`,
/// `Busy` or a store error.
pub async fn replace_diagram(
    state: &AppState,
    owner: &str,
    id: Uuid,
    mut submitted: Diagram,
) -> Result<Diagram, DiagramError> {
    submitted.validate()?;
    let _permit = acquire(state, owner, id)?;
    let current = get_diagram(state, owner, id).await?;
    submitted.check_kinds_unchanged(&current)?;

    submitted.id = current.id;
    submitted.created_at = current.created_at;
    submitted.updated_at = OffsetDateTime::now_utc();
    if submitted.name.trim().is_empty() {
        submitted.name = current.name;
    }
    state.store.save(owner, &submitted).await?;
    info!(
        %owner,
        diagram_id = %id,
        elements = submitted.elements.len(),
        connections = submitted.connections.len(),
        pools = submitted.pools.len(),
        "diagram: replaced"
    );
    Ok(submitted)
}

/// Delete a diagram and its chat transcript.
///
/// # Errors
///
/// Returns `NotFound`, `Busy` or a store error.
pub async fn delete_diagram(state: &AppState, owner: &str, id: Uuid) -> Result<(), DiagramError> {
    let _permit = acquire(state, owner, id)?;
    if !state.store.delete(owner, id).await? {
        return Err(DiagramError::NotFound(id));
    }
    let cleared = state.transcripts.clear(owner, id).await;
    info!(%owner, diagram_id = %id, cleared_messages = cleared, "diagram: deleted");
    Ok(())
}

/// Apply a modification batch and save the result.
///
/// # Errors
///
/// Returns `Busy` if another write holds the diagram, or `NotFound` or a
/// store error.
pub async fn apply_batch(
    state: &AppState,
    owner: &str,
    id: Uuid,
    modifications: &[Modification],
) -> Result<ApplyOutcome, DiagramError> {
    let _permit = acquire(state, owner, id)?;
    let current = get_diagram(state, owner, id).await?;
    apply_and_save(state, owner, &current, modifications).await
}

/// Claim the write guard for `owner`'s diagram `id`.
pub(crate) fn acquire(state: &AppState, owner: &str, id: Uuid) -> Result<BatchPermit, DiagramError> {
    state.guards.try_acquire(owner, id).ok_or(DiagramError::Busy(id))
}

/// Run the engine over `current` and persist the result. The caller must
/// already hold the guard for the diagram.
pub(crate) async fn apply_and_save(
    state: &AppState,
    owner: &str,
    current: &Diagram,
    modifications: &[Modification],
) -> Result<ApplyOutcome, DiagramError> {
    let outcome = apply_modifications(current, modifications, state.ids.as_ref());
    state.store.save(owner, &outcome.diagram).await?;
    info!(
        %owner,
        diagram_id = %current.id,
        commands = modifications.len(),
        applied = outcome.applied_count(),
        skipped = outcome.skipped_count(),
        "diagram: batch applied"
    );
    Ok(outcome)
}

#[cfg(test)]
#[path = "diagram_test.rs"]
mod tests;
