//! Persistence gateway: load and save whole diagram documents per owner.
//!
//! DESIGN
//! ======
//! A diagram is stored as one JSON document keyed by `(owner, id)`. The
//! [`DiagramStore`] trait has two implementations: [`MemoryStore`] for local
//! runs and tests, and [`PgStore`] which keeps the document in a JSONB column
//! alongside the columns needed for listing. Listing is newest-created first.
//!
//! Owner scoping is enforced here: a diagram saved under one owner is
//! invisible to every other owner, and a save never moves a diagram between
//! owners.

use std::collections::HashMap;
use std::sync::Arc;

use diagram::Diagram;
use sqlx::PgPool;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("diagram {id} belongs to another owner")]
    OwnerConflict { id: Uuid },
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_STORE_DATABASE",
            Self::OwnerConflict { .. } => "E_STORE_OWNER_CONFLICT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)))
    }
}

/// Storage backend for diagram documents.
#[async_trait::async_trait]
pub trait DiagramStore: Send + Sync {
    /// All diagrams of `owner`, newest-created first.
    async fn list(&self, owner: &str) -> Result<Vec<Diagram>, StoreError>;

    /// One diagram, or `None` if it does not exist for this owner.
    async fn load(&self, owner: &str, id: Uuid) -> Result<Option<Diagram>, StoreError>;

    /// Insert or replace a diagram.
    async fn save(&self, owner: &str, diagram: &Diagram) -> Result<(), StoreError>;

    /// Remove a diagram. Returns whether anything was deleted.
    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, StoreError>;
}

fn newest_first(diagrams: &mut [Diagram]) {
    diagrams.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Contents vanish on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    diagrams: Arc<RwLock<HashMap<Uuid, (String, Diagram)>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DiagramStore for MemoryStore {
    async fn list(&self, owner: &str) -> Result<Vec<Diagram>, StoreError> {
        let diagrams = self.diagrams.read().await;
        let mut out: Vec<Diagram> = diagrams
            .values()
            .filter(|(o, _)| o == owner)
            .map(|(_, d)| d.clone())
            .collect();
        newest_first(&mut out);
        Ok(out)
    }

    async fn load(&self, owner: &str, id: Uuid) -> Result<Option<Diagram>, StoreError> {
        let diagrams = self.diagrams.read().await;
        Ok(diagrams
            .get(&id)
            .filter(|(o, _)| o == owner)
            .map(|(_, d)| d.clone()))
    }

    async fn save(&self, owner: &str, diagram: &Diagram) -> Result<(), StoreError> {
        let mut diagrams = self.diagrams.write().await;
        if let Some((existing_owner, _)) = diagrams.get(&diagram.id) {
            if existing_owner != owner {
                return Err(StoreError::OwnerConflict { id: diagram.id });
            }
        }
        diagrams.insert(diagram.id, (owner.to_string(), diagram.clone()));
        Ok(())
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut diagrams = self.diagrams.write().await;
        if diagrams.get(&id).is_some_and(|(o, _)| o == owner) {
            diagrams.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

// =============================================================================
// POSTGRES STORE
// =============================================================================

/// `PostgreSQL` store backed by the `diagrams` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DiagramStore for PgStore {
    async fn list(&self, owner: &str) -> Result<Vec<Diagram>, StoreError> {
        let rows = sqlx::query_scalar::<_, Json<Diagram>>(
            "SELECT document FROM diagrams WHERE owner_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(d)| d).collect())
    }

    async fn load(&self, owner: &str, id: Uuid) -> Result<Option<Diagram>, StoreError> {
        let row = sqlx::query_scalar::<_, Json<Diagram>>("SELECT document FROM diagrams WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(d)| d))
    }

    async fn save(&self, owner: &str, diagram: &Diagram) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO diagrams (id, owner_id, name, document, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, document = EXCLUDED.document, updated_at = EXCLUDED.updated_at \
             WHERE diagrams.owner_id = EXCLUDED.owner_id",
        )
        .bind(diagram.id)
        .bind(owner)
        .bind(&diagram.name)
        .bind(Json(diagram))
        .bind(diagram.created_at)
        .bind(diagram.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OwnerConflict { id: diagram.id });
        }
        Ok(())
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM diagrams WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
