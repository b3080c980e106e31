//! Diagram core: the process-diagram data model and the deterministic
//! modification engine that edits it.
//!
//! Everything in this crate is synchronous and free of I/O. Callers hand in a
//! [`model::Diagram`] value, get a new one back, and decide themselves where it
//! is stored. The service crate wraps this with HTTP, persistence and the
//! language-model command source.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Elements, connections, pools, lanes and the diagram aggregate |
//! | [`modification`] | Structured edit commands and their JSON wire format |
//! | [`engine`] | Applies an ordered batch of modifications to a diagram |
//! | [`export`] | Flowchart-text and BPMN XML encoders |
//! | [`summary`] | Deterministic plain-text description used in model prompts |
//! | [`ids`] | Injectable id generation |
//! | [`consts`] | Default sizes, colors and interchange geometry |

pub mod consts;
pub mod engine;
pub mod export;
pub mod ids;
pub mod model;
pub mod modification;
pub mod summary;

pub use engine::{ApplyOutcome, CommandReport, Outcome, SkipReason, apply_modifications, apply_modifications_at};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use model::{Connection, Diagram, Element, ElementKind, Lane, ModelError, Pool, Position, Size};
pub use modification::{BatchError, Modification, ParsedBatch, RejectedEntry, parse_batch};
