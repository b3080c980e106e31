//! Modification engine: applies an ordered batch of edits to a diagram.
//!
//! DESIGN
//! ======
//! The input diagram is never touched: the engine clones it, applies each
//! command in order against the working copy (so later commands see earlier
//! results), and returns the copy. A command whose preconditions fail is
//! skipped with a `warn!` and a [`SkipReason`] in the report; the rest of the
//! batch carries on. Removing something that does not exist is tolerated and
//! reported as [`Outcome::NoOp`]. The result's `updated_at` is stamped once,
//! after the whole batch.
//!
//! Referential rules enforced here:
//! - removing an element removes every connection touching it
//! - removing a pool clears `pool_id` on its elements, never deletes them
//! - at most one connection per ordered (source, target) pair; self-loops allowed

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::consts::{DEFAULT_POOL_COLOR, DEFAULT_POOL_HEIGHT, DEFAULT_POOL_WIDTH};
use crate::ids::IdGenerator;
use crate::model::{Connection, Diagram, Element, ElementKind, Lane, Pool, Position, Size};
use crate::modification::Modification;

// =============================================================================
// TYPES
// =============================================================================

/// Why a command was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("element not found: {id}")]
    ElementNotFound { id: String },
    #[error("pool not found: {id}")]
    PoolNotFound { id: String },
    #[error("connection from {from} to {to} already exists")]
    DuplicateConnection { from: String, to: String },
}

/// What happened to one command of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The diagram changed.
    Applied,
    /// Valid command with nothing to do (e.g. removing a missing id).
    NoOp,
    /// Preconditions failed; the diagram is unchanged by this command.
    Skipped { reason: SkipReason },
}

/// Per-command entry in an [`ApplyOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReport {
    pub index: usize,
    pub command: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// New diagram plus one report per input command, in input order.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub diagram: Diagram,
    pub reports: Vec<CommandReport>,
}

impl ApplyOutcome {
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome == Outcome::Applied)
            .count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Skipped { .. }))
            .count()
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Apply `modifications` in order and stamp the result with the current time.
#[must_use]
pub fn apply_modifications(
    diagram: &Diagram,
    modifications: &[Modification],
    ids: &dyn IdGenerator,
) -> ApplyOutcome {
    apply_modifications_at(diagram, modifications, ids, OffsetDateTime::now_utc())
}

/// Apply `modifications` in order and stamp the result with `now`.
#[must_use]
pub fn apply_modifications_at(
    diagram: &Diagram,
    modifications: &[Modification],
    ids: &dyn IdGenerator,
    now: OffsetDateTime,
) -> ApplyOutcome {
    let mut working = diagram.clone();
    let mut reports = Vec::with_capacity(modifications.len());

    for (index, modification) in modifications.iter().enumerate() {
        let outcome = match apply_one(&mut working, modification, ids) {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!(index, command = modification.name(), %reason, "engine: modification skipped");
                Outcome::Skipped { reason }
            }
        };
        reports.push(CommandReport { index, command: modification.name(), outcome });
    }

    working.updated_at = now;
    let outcome = ApplyOutcome { diagram: working, reports };
    debug!(
        diagram_id = %outcome.diagram.id,
        total = modifications.len(),
        applied = outcome.applied_count(),
        skipped = outcome.skipped_count(),
        "engine: batch applied"
    );
    outcome
}

// =============================================================================
// DISPATCH
// =============================================================================

type Step = Result<Outcome, SkipReason>;

fn apply_one(diagram: &mut Diagram, modification: &Modification, ids: &dyn IdGenerator) -> Step {
    match modification {
        Modification::AddElement { element_type, position, label, pool_id } => {
            let kind = element_type.ok_or(SkipReason::MissingField { field: "elementType" })?;
            let position = position.ok_or(SkipReason::MissingField { field: "position" })?;
            let label = required(label.as_deref(), "label")?;
            add_element(diagram, ids, kind, position, label, present(pool_id.as_deref()))
        }
        Modification::RemoveElement { element_id } => {
            remove_element(diagram, required(element_id.as_deref(), "elementId")?)
        }
        Modification::ModifyElement { element_id, label } => {
            let id = required(element_id.as_deref(), "elementId")?;
            let label = required(label.as_deref(), "label")?;
            modify_element(diagram, id, label)
        }
        Modification::AddConnection { source_id, target_id, connection_label } => {
            let source = required(source_id.as_deref(), "sourceId")?;
            let target = required(target_id.as_deref(), "targetId")?;
            add_connection(diagram, ids, source, target, present(connection_label.as_deref()))
        }
        Modification::RemoveConnection { source_id, target_id } => {
            let source = required(source_id.as_deref(), "sourceId")?;
            let target = required(target_id.as_deref(), "targetId")?;
            remove_connection(diagram, source, target)
        }
        Modification::AddPool { pool_name, position, pool_size, pool_color } => {
            let name = required(pool_name.as_deref(), "poolName")?;
            let position = position.ok_or(SkipReason::MissingField { field: "position" })?;
            add_pool(diagram, ids, name, position, usable_size(*pool_size), present(pool_color.as_deref()))
        }
        Modification::RemovePool { pool_id } => remove_pool(diagram, required(pool_id.as_deref(), "poolId")?),
        Modification::ModifyPool { pool_id, pool_name, pool_size, pool_color } => {
            let id = required(pool_id.as_deref(), "poolId")?;
            let size = usable_size(*pool_size);
            modify_pool(diagram, id, present(pool_name.as_deref()), size, present(pool_color.as_deref()))
        }
        Modification::AddLane { pool_id, lane_name } => {
            let pool_id = required(pool_id.as_deref(), "poolId")?;
            let name = required(lane_name.as_deref(), "laneName")?;
            add_lane(diagram, ids, pool_id, name)
        }
        Modification::RemoveLane { pool_id, lane_id } => {
            let pool_id = required(pool_id.as_deref(), "poolId")?;
            let lane_id = required(lane_id.as_deref(), "laneId")?;
            remove_lane(diagram, pool_id, lane_id)
        }
        Modification::ClearDiagram {} => Ok(clear_diagram(diagram)),
    }
}

/// Empty strings count as absent, matching how the wire format is produced.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, SkipReason> {
    present(value).ok_or(SkipReason::MissingField { field })
}

/// Pools must keep a positive, finite extent; anything else counts as absent.
fn usable_size(size: Option<Size>) -> Option<Size> {
    size.filter(|s| s.width.is_finite() && s.height.is_finite() && s.width > 0.0 && s.height > 0.0)
}

fn changed(did_change: bool) -> Outcome {
    if did_change { Outcome::Applied } else { Outcome::NoOp }
}

// =============================================================================
// ELEMENTS
// =============================================================================

fn add_element(
    diagram: &mut Diagram,
    ids: &dyn IdGenerator,
    kind: ElementKind,
    position: Position,
    label: &str,
    pool_id: Option<&str>,
) -> Step {
    let pool_id = match pool_id {
        Some(id) if diagram.pool(id).is_some() => Some(id.to_string()),
        Some(id) => {
            warn!(pool_id = id, "engine: add_element references unknown pool, leaving element unassigned");
            None
        }
        None => None,
    };
    diagram.elements.push(Element {
        id: ids.next_id(),
        kind,
        position,
        label: label.to_string(),
        pool_id,
        properties: None,
    });
    Ok(Outcome::Applied)
}

fn remove_element(diagram: &mut Diagram, id: &str) -> Step {
    let before = diagram.elements.len();
    diagram.elements.retain(|el| el.id != id);
    diagram
        .connections
        .retain(|conn| conn.source != id && conn.target != id);
    Ok(changed(diagram.elements.len() != before))
}

fn modify_element(diagram: &mut Diagram, id: &str, label: &str) -> Step {
    let Some(element) = diagram.elements.iter_mut().find(|el| el.id == id) else {
        return Ok(Outcome::NoOp);
    };
    element.label = label.to_string();
    Ok(Outcome::Applied)
}

// =============================================================================
// CONNECTIONS
// =============================================================================

fn add_connection(
    diagram: &mut Diagram,
    ids: &dyn IdGenerator,
    source: &str,
    target: &str,
    label: Option<&str>,
) -> Step {
    for endpoint in [source, target] {
        if diagram.element(endpoint).is_none() {
            return Err(SkipReason::ElementNotFound { id: endpoint.to_string() });
        }
    }
    if diagram.has_connection(source, target) {
        return Err(SkipReason::DuplicateConnection { from: source.to_string(), to: target.to_string() });
    }
    diagram.connections.push(Connection {
        id: ids.next_id(),
        source: source.to_string(),
        target: target.to_string(),
        label: label.map(str::to_string),
    });
    Ok(Outcome::Applied)
}

fn remove_connection(diagram: &mut Diagram, source: &str, target: &str) -> Step {
    let before = diagram.connections.len();
    diagram
        .connections
        .retain(|conn| !(conn.source == source && conn.target == target));
    Ok(changed(diagram.connections.len() != before))
}

// =============================================================================
// POOLS AND LANES
// =============================================================================

fn add_pool(
    diagram: &mut Diagram,
    ids: &dyn IdGenerator,
    name: &str,
    position: Position,
    size: Option<Size>,
    color: Option<&str>,
) -> Step {
    let size = size.unwrap_or(Size::new(DEFAULT_POOL_WIDTH, DEFAULT_POOL_HEIGHT));
    let pool_id = ids.next_id();
    let lane_id = ids.next_id();
    diagram.pools.push(Pool::with_default_lane(
        pool_id,
        lane_id,
        name.to_string(),
        position,
        size,
        color.unwrap_or(DEFAULT_POOL_COLOR).to_string(),
    ));
    Ok(Outcome::Applied)
}

fn remove_pool(diagram: &mut Diagram, id: &str) -> Step {
    let before = diagram.pools.len();
    diagram.pools.retain(|pool| pool.id != id);
    for element in &mut diagram.elements {
        if element.pool_id.as_deref() == Some(id) {
            element.pool_id = None;
        }
    }
    Ok(changed(diagram.pools.len() != before))
}

fn modify_pool(
    diagram: &mut Diagram,
    id: &str,
    name: Option<&str>,
    size: Option<Size>,
    color: Option<&str>,
) -> Step {
    let Some(pool) = diagram.pools.iter_mut().find(|pool| pool.id == id) else {
        return Ok(Outcome::NoOp);
    };
    if let Some(name) = name {
        pool.name = name.to_string();
    }
    if let Some(size) = size {
        pool.size = size;
    }
    if let Some(color) = color {
        pool.color = color.to_string();
    }
    Ok(Outcome::Applied)
}

fn add_lane(diagram: &mut Diagram, ids: &dyn IdGenerator, pool_id: &str, name: &str) -> Step {
    let Some(pool) = diagram.pools.iter_mut().find(|pool| pool.id == pool_id) else {
        return Err(SkipReason::PoolNotFound { id: pool_id.to_string() });
    };
    #[allow(clippy::cast_precision_loss)]
    let share = (pool.lanes.len() + 1) as f64;
    pool.lanes.push(Lane {
        id: ids.next_id(),
        name: name.to_string(),
        pool_id: pool_id.to_string(),
        position: Position::default(),
        size: Size::new(pool.size.width, pool.size.height / share),
    });
    Ok(Outcome::Applied)
}

fn remove_lane(diagram: &mut Diagram, pool_id: &str, lane_id: &str) -> Step {
    let Some(pool) = diagram.pools.iter_mut().find(|pool| pool.id == pool_id) else {
        return Ok(Outcome::NoOp);
    };
    let before = pool.lanes.len();
    pool.lanes.retain(|lane| lane.id != lane_id);
    Ok(changed(pool.lanes.len() != before))
}

fn clear_diagram(diagram: &mut Diagram) -> Outcome {
    diagram.elements.clear();
    diagram.connections.clear();
    diagram.pools.clear();
    Outcome::Applied
}
