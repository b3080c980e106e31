//! Shared constants for the diagram crate.

// ── Pools ───────────────────────────────────────────────────────

/// Width of a pool created without an explicit size.
pub const DEFAULT_POOL_WIDTH: f64 = 400.0;

/// Height of a pool created without an explicit size.
pub const DEFAULT_POOL_HEIGHT: f64 = 200.0;

/// Fill color of a pool created without an explicit color.
pub const DEFAULT_POOL_COLOR: &str = "#3B82F6";

/// Name given to the lane every new pool starts with.
pub const DEFAULT_LANE_NAME: &str = "Lane 1";

// ── Diagrams ────────────────────────────────────────────────────

/// Name used when a diagram is created without one.
pub const DEFAULT_DIAGRAM_NAME: &str = "Untitled Diagram";

// ── Interchange geometry ────────────────────────────────────────

/// Task shape size in the XML interchange section.
pub const TASK_SHAPE_WIDTH: f64 = 100.0;
pub const TASK_SHAPE_HEIGHT: f64 = 80.0;

/// Event and gateway shape size (square) in the XML interchange section.
pub const EVENT_SHAPE_SIZE: f64 = 36.0;

/// Height of the label box placed under each shape.
pub const LABEL_HEIGHT: f64 = 14.0;

/// Gap between a shape and its label box.
pub const LABEL_GAP: f64 = 5.0;

/// Nominal extents used to find an element's center for edge waypoints.
pub const TASK_CENTER_EXTENT: f64 = 100.0;
pub const GATEWAY_CENTER_EXTENT: f64 = 80.0;
pub const EVENT_CENTER_EXTENT: f64 = 60.0;

/// Size of the label box placed at a labelled connection's midpoint.
pub const EDGE_LABEL_WIDTH: f64 = 30.0;
