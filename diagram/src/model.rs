//! Document model: elements, connections, pools, lanes and the diagram that
//! owns them.
//!
//! These are plain values. Nothing here mutates a diagram on behalf of a
//! caller; edits go through [`crate::engine`], which clones the input and
//! returns a new diagram. The serde shape is the persisted record format
//! (camelCase keys, RFC 3339 timestamps), so a stored diagram round-trips
//! field-for-field.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::consts::{DEFAULT_DIAGRAM_NAME, DEFAULT_LANE_NAME};

/// 2-D canvas position. Unbounded; clamping is a UI concern.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangular extent of a pool or lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The four fixed element categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Start event; where a process begins.
    Start,
    /// Activity performed by a participant.
    Task,
    /// Exclusive decision point.
    Gateway,
    /// End event; where a process terminates.
    End,
}

impl ElementKind {
    /// Wire name, also used for style class names in exports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Task => "task",
            Self::Gateway => "gateway",
            Self::End => "end",
        }
    }
}

/// A diagram node. `kind` never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub position: Position,
    pub label: String,
    /// Enclosing pool, or `None` when the element is unassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<String>,
    /// Free-form properties carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Directed connection between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A named partition inside a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    pub id: String,
    pub name: String,
    pub pool_id: String,
    pub position: Position,
    pub size: Size,
}

/// Rectangular grouping region owning an ordered list of lanes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub size: Size,
    pub color: String,
    #[serde(default)]
    pub lanes: Vec<Lane>,
}

impl Pool {
    /// Build a pool with its single default lane spanning the full size.
    #[must_use]
    pub fn with_default_lane(
        id: String,
        lane_id: String,
        name: String,
        position: Position,
        size: Size,
        color: String,
    ) -> Self {
        let lane = Lane {
            id: lane_id,
            name: DEFAULT_LANE_NAME.to_string(),
            pool_id: id.clone(),
            position: Position::default(),
            size,
        };
        Self { id, name, position, size, color, lanes: vec![lane] }
    }
}

/// The aggregate handed to and returned from the engine.
///
/// Collection order is insertion order; exports rely on it for stable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Structural problems found by [`Diagram::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("duplicate element id: {0}")]
    DuplicateElement(String),
    #[error("duplicate connection id: {0}")]
    DuplicateConnectionId(String),
    #[error("duplicate pool id: {0}")]
    DuplicatePool(String),
    #[error("duplicate lane id: {0}")]
    DuplicateLane(String),
    #[error("connection {connection} references missing element {element}")]
    DanglingConnection { connection: String, element: String },
    #[error("duplicate connection from {from} to {to}")]
    DuplicateConnection { from: String, to: String },
    #[error("element {element} references missing pool {pool}")]
    DanglingPoolRef { element: String, pool: String },
    #[error("pool {0} must have a positive width and height")]
    InvalidPoolSize(String),
    #[error("lane {lane} claims pool {claimed} but belongs to {actual}")]
    LaneOwnerMismatch { lane: String, claimed: String, actual: String },
    #[error("element {element} cannot change kind from {} to {}", .was.as_str(), .now.as_str())]
    KindChanged { element: String, was: ElementKind, now: ElementKind },
}

impl Diagram {
    /// Create an empty diagram stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, OffsetDateTime::now_utc())
    }

    /// Create an empty diagram with explicit identity and creation time.
    #[must_use]
    pub fn with_id(id: Uuid, name: impl Into<String>, now: OffsetDateTime) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() { DEFAULT_DIAGRAM_NAME.to_string() } else { name };
        Self {
            id,
            name,
            elements: Vec::new(),
            connections: Vec::new(),
            pools: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == id)
    }

    #[must_use]
    pub fn pool(&self, id: &str) -> Option<&Pool> {
        self.pools.iter().find(|pool| pool.id == id)
    }

    /// Whether a connection with this ordered (source, target) pair exists.
    #[must_use]
    pub fn has_connection(&self, source: &str, target: &str) -> bool {
        self.connections
            .iter()
            .any(|conn| conn.source == source && conn.target == target)
    }

    /// True when the diagram has no elements, connections or pools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.connections.is_empty() && self.pools.is_empty()
    }

    /// Check referential integrity between elements, connections, pools and lanes.
    ///
    /// # Errors
    ///
    /// Returns the first [`ModelError`] found.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut element_ids = HashSet::new();
        for el in &self.elements {
            if !element_ids.insert(el.id.as_str()) {
                return Err(ModelError::DuplicateElement(el.id.clone()));
            }
        }

        let mut connection_ids = HashSet::new();
        let mut pairs = HashSet::new();
        for conn in &self.connections {
            if !connection_ids.insert(conn.id.as_str()) {
                return Err(ModelError::DuplicateConnectionId(conn.id.clone()));
            }
            for endpoint in [&conn.source, &conn.target] {
                if !element_ids.contains(endpoint.as_str()) {
                    return Err(ModelError::DanglingConnection {
                        connection: conn.id.clone(),
                        element: endpoint.clone(),
                    });
                }
            }
            if !pairs.insert((conn.source.as_str(), conn.target.as_str())) {
                return Err(ModelError::DuplicateConnection { from: conn.source.clone(), to: conn.target.clone() });
            }
        }

        let mut pool_ids = HashSet::new();
        let mut lane_ids = HashSet::new();
        for pool in &self.pools {
            if !pool_ids.insert(pool.id.as_str()) {
                return Err(ModelError::DuplicatePool(pool.id.clone()));
            }
            if let Some(lane) = pool.lanes.iter().find(|lane| !lane_ids.insert(lane.id.as_str())) {
                return Err(ModelError::DuplicateLane(lane.id.clone()));
            }
            if pool.size.width <= 0.0 || pool.size.height <= 0.0 {
                return Err(ModelError::InvalidPoolSize(pool.id.clone()));
            }
            if let Some(lane) = pool.lanes.iter().find(|lane| lane.pool_id != pool.id) {
                return Err(ModelError::LaneOwnerMismatch {
                    lane: lane.id.clone(),
                    claimed: lane.pool_id.clone(),
                    actual: pool.id.clone(),
                });
            }
        }

        for el in &self.elements {
            if let Some(pool_id) = &el.pool_id {
                if self.pool(pool_id).is_none() {
                    return Err(ModelError::DanglingPoolRef { element: el.id.clone(), pool: pool_id.clone() });
                }
            }
        }

        Ok(())
    }

    /// Check that every element also present in `previous` kept its kind.
    ///
    /// Elements that are new or were removed are not considered.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::KindChanged`] for the first element whose kind differs.
    pub fn check_kinds_unchanged(&self, previous: &Diagram) -> Result<(), ModelError> {
        for el in &self.elements {
            if let Some(old) = previous.element(&el.id) {
                if old.kind != el.kind {
                    return Err(ModelError::KindChanged { element: el.id.clone(), was: old.kind, now: el.kind });
                }
            }
        }
        Ok(())
    }
}
