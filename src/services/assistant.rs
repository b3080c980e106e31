//! Assistant service: chat message → LLM → modification batch → saved diagram.
//!
//! DESIGN
//! ======
//! Each turn sends a system prompt (command reference plus a plain-text
//! description of the current diagram) and the user's message. The model
//! answers in prose and may append one JSON batch between
//! `[MODIFICATIONS]` and `[/MODIFICATIONS]`. The prose becomes the assistant
//! transcript entry; the batch goes through the same engine path as a
//! direct batch request.
//!
//! The write guard is held from before the diagram is loaded until the
//! result is saved, so a chat turn never races another write.

use std::sync::Arc;

use diagram::summary::describe_diagram;
use diagram::{CommandReport, Diagram, Modification, ParsedBatch, RejectedEntry, parse_batch};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::diagram::{self as diagram_service, DiagramError};
use super::transcript::ChatMessage;
use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message, Role};
use crate::state::AppState;

const OPEN_MARKER: &str = "[MODIFICATIONS]";
const CLOSE_MARKER: &str = "[/MODIFICATIONS]";

const INSTRUCTIONS: &str = r##"You help users edit BPMN process diagrams through natural language.

You can:
1. Add elements (start, task, gateway, end)
2. Remove elements
3. Change element labels
4. Connect two elements
5. Remove connections
6. Add pools (containers that group elements by participant)
7. Remove pools
8. Change a pool's name, size or color
9. Add lanes to a pool
10. Remove lanes from a pool
11. Clear the whole diagram

Answer in plain language first, explaining what you are changing. Then, if the
diagram should change, append exactly one block in this format:

[MODIFICATIONS]
{
  "modifications": [
    {
      "type": "add_element",
      "elementType": "task",
      "position": {"x": 200, "y": 100},
      "label": "New Task",
      "poolId": "optional-pool-id"
    },
    {
      "type": "add_pool",
      "poolName": "Customer",
      "position": {"x": 100, "y": 50},
      "poolSize": {"width": 500, "height": 300},
      "poolColor": "#3B82F6"
    }
  ]
}
[/MODIFICATIONS]

Modification types and their fields:
- add_element: elementType (start|task|gateway|end), position {x, y}, label, poolId (optional)
- remove_element: elementId
- modify_element: elementId, label
- add_connection: sourceId, targetId, connectionLabel (optional)
- remove_connection: sourceId, targetId
- add_pool: poolName, position {x, y}, poolSize {width, height} (optional), poolColor (optional)
- remove_pool: poolId
- modify_pool: poolId, poolName (optional), poolSize (optional), poolColor (optional)
- add_lane: poolId, laneName
- remove_lane: poolId, laneId
- clear_diagram: no fields

Commands run in order. Ids of elements and pools created in the same block are
not known in advance, so only reference ids that already appear in the diagram
description below.

Layout:
- The canvas is roughly 1200x800.
- Start events usually sit at x 100-200, y 200-400.
- Space elements 150-200 apart horizontally and 100-150 apart vertically.
- Pools need room for their elements (at least 400x200) and some space between them.

Pools:
- Use pools for participants, organizations or departments.
- Place an element inside a pool by giving its poolId.
- Pools can hold several lanes.
- Common colors: #3B82F6 (blue), #10B981 (green), #F59E0B (yellow), #EF4444 (red), #8B5CF6 (purple)."##;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("LLM not configured")]
    NotConfigured,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Diagram(#[from] DiagramError),
}

impl ErrorCode for AssistantError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Llm(e) => e.error_code(),
            Self::Diagram(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::NotConfigured => false,
            Self::Llm(e) => e.retryable(),
            Self::Diagram(e) => e.retryable(),
        }
    }
}

/// Model reply split into prose and commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReply {
    pub explanation: String,
    pub batch: ParsedBatch,
}

/// Result of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub reply: ChatMessage,
    pub diagram: Diagram,
    pub modifications: Vec<Modification>,
    pub reports: Vec<CommandReport>,
    pub rejected: Vec<RejectedEntry>,
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Run one chat turn against diagram `id`.
///
/// # Errors
///
/// Returns `NotConfigured` without an LLM, `Diagram(Busy)` if another write
/// holds the diagram, `Diagram(NotFound)`, or the LLM failure. On LLM failure
/// an apology is appended to the transcript and the diagram is untouched.
pub async fn handle_chat(
    state: &AppState,
    owner: &str,
    id: Uuid,
    message: &str,
) -> Result<ChatOutcome, AssistantError> {
    let llm: &Arc<dyn LlmChat> = state.llm.as_ref().ok_or(AssistantError::NotConfigured)?;
    info!(%owner, diagram_id = %id, message_len = message.len(), "assistant: message received");

    let _permit = diagram_service::acquire(state, owner, id)?;
    let current = diagram_service::get_diagram(state, owner, id).await?;

    state
        .transcripts
        .append(owner, id, ChatMessage::new(Role::User, message))
        .await;

    let system = build_system_prompt(&current);
    let response = match llm.chat(&system, &[Message::user(message)]).await {
        Ok(response) => response,
        Err(e) => {
            warn!(diagram_id = %id, error = %e, auth = e.is_auth(), "assistant: llm call failed");
            state
                .transcripts
                .append(owner, id, ChatMessage::new(Role::Assistant, format!("Sorry, I encountered an error: {e}")))
                .await;
            return Err(e.into());
        }
    };

    info!(
        diagram_id = %id,
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "assistant: llm response"
    );

    let parsed = parse_reply(&response.text());
    info!(
        diagram_id = %id,
        parsed = parsed.batch.modifications.len(),
        rejected = parsed.batch.rejected.len(),
        "assistant: modifications parsed"
    );

    let reply = ChatMessage::new(Role::Assistant, parsed.explanation);
    state.transcripts.append(owner, id, reply.clone()).await;

    let ParsedBatch { modifications, rejected } = parsed.batch;
    if modifications.is_empty() {
        return Ok(ChatOutcome { reply, diagram: current, modifications, reports: Vec::new(), rejected });
    }

    let outcome = diagram_service::apply_and_save(state, owner, &current, &modifications).await?;
    Ok(ChatOutcome { reply, diagram: outcome.diagram, modifications, reports: outcome.reports, rejected })
}

// =============================================================================
// PROMPT
// =============================================================================

/// Fixed instructions followed by the current diagram description.
#[must_use]
pub fn build_system_prompt(diagram: &Diagram) -> String {
    format!("{INSTRUCTIONS}\n\nCurrent diagram state:\n{}", describe_diagram(diagram))
}

// =============================================================================
// REPLY PARSING
// =============================================================================

/// Split a model reply into its explanation and its modification batch.
///
/// Only the first marked block is used. A reply without a complete block, or
/// whose block is not valid JSON, carries no commands.
#[must_use]
pub fn parse_reply(reply: &str) -> ParsedReply {
    let Some((before, inner, after)) = split_marked_block(reply) else {
        return ParsedReply { explanation: reply.trim().to_string(), batch: ParsedBatch::default() };
    };

    let batch = match parse_batch(inner) {
        Ok(batch) => batch,
        Err(e) => {
            warn!(error = %e, "assistant: modification block is not valid JSON");
            ParsedBatch::default()
        }
    };

    ParsedReply { explanation: format!("{before}{after}").trim().to_string(), batch }
}

/// `(before, inner, after)` around the first complete marker pair.
fn split_marked_block(reply: &str) -> Option<(&str, &str, &str)> {
    let open = reply.find(OPEN_MARKER)?;
    let inner_start = open + OPEN_MARKER.len();
    let close = inner_start + reply[inner_start..].find(CLOSE_MARKER)?;
    Some((&reply[..open], &reply[inner_start..close], &reply[close + CLOSE_MARKER.len()..]))
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
