//! Modification commands and their JSON wire format.
//!
//! DESIGN
//! ======
//! A modification is pure data: the `type` discriminator plus whatever fields
//! that case uses. Every field is optional at this layer because commands come
//! from a language model and may be incomplete; the engine decides what is
//! missing and skips accordingly. Decoding is per entry, so one malformed
//! entry (unknown `type`, a string where a number belongs) is rejected on its
//! own while the rest of the batch survives.

#[cfg(test)]
#[path = "modification_test.rs"]
mod modification_test;

use serde::{Deserialize, Serialize};

use crate::model::{ElementKind, Position, Size};

/// One structured edit. Field names match the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Modification {
    AddElement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element_type: Option<ElementKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_id: Option<String>,
    },
    RemoveElement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element_id: Option<String>,
    },
    ModifyElement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    AddConnection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        connection_label: Option<String>,
    },
    RemoveConnection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
    },
    AddPool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_size: Option<Size>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_color: Option<String>,
    },
    RemovePool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_id: Option<String>,
    },
    ModifyPool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_size: Option<Size>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_color: Option<String>,
    },
    AddLane {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lane_name: Option<String>,
    },
    RemoveLane {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pool_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lane_id: Option<String>,
    },
    ClearDiagram {},
}

impl Modification {
    /// Wire name of the command (`add_element`, `clear_diagram`, ...).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddElement { .. } => "add_element",
            Self::RemoveElement { .. } => "remove_element",
            Self::ModifyElement { .. } => "modify_element",
            Self::AddConnection { .. } => "add_connection",
            Self::RemoveConnection { .. } => "remove_connection",
            Self::AddPool { .. } => "add_pool",
            Self::RemovePool { .. } => "remove_pool",
            Self::ModifyPool { .. } => "modify_pool",
            Self::AddLane { .. } => "add_lane",
            Self::RemoveLane { .. } => "remove_lane",
            Self::ClearDiagram {} => "clear_diagram",
        }
    }
}

// =============================================================================
// BATCH DECODING
// =============================================================================

/// The payload was not a JSON object at all.
#[derive(Debug, thiserror::Error)]
#[error("modification payload is not valid JSON: {0}")]
pub struct BatchError(#[from] serde_json::Error);

/// A batch entry that could not be decoded into a [`Modification`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedEntry {
    pub index: usize,
    pub reason: String,
}

/// Result of decoding a `{"modifications": [...]}` payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    pub modifications: Vec<Modification>,
    pub rejected: Vec<RejectedEntry>,
}

#[derive(Deserialize)]
struct RawBatch {
    #[serde(default)]
    modifications: Vec<serde_json::Value>,
}

/// Decode a modification batch, rejecting bad entries individually.
///
/// # Errors
///
/// Returns [`BatchError`] when the payload is not a JSON object with an
/// (optional) `modifications` array.
pub fn parse_batch(json: &str) -> Result<ParsedBatch, BatchError> {
    let raw: RawBatch = serde_json::from_str(json)?;
    Ok(decode_entries(raw.modifications))
}

/// Decode already-parsed JSON entries, rejecting bad ones individually.
#[must_use]
pub fn decode_entries(entries: Vec<serde_json::Value>) -> ParsedBatch {
    let mut batch = ParsedBatch::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Modification>(entry) {
            Ok(modification) => batch.modifications.push(modification),
            Err(e) => {
                tracing::warn!(index, error = %e, "modification: rejected entry");
                batch.rejected.push(RejectedEntry { index, reason: e.to_string() });
            }
        }
    }
    batch
}
