//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the diagram store, the optional LLM client, the id generator used
//! by the engine, the per-diagram write guards and the chat transcripts.

use std::sync::Arc;

use diagram::{IdGenerator, UuidIds};

use crate::llm::LlmChat;
use crate::services::guard::BatchGuards;
use crate::services::persistence::DiagramStore;
use crate::services::transcript::Transcripts;

/// Shared application state. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DiagramStore>,
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub ids: Arc<dyn IdGenerator>,
    pub guards: BatchGuards,
    pub transcripts: Transcripts,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn DiagramStore>, llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self { store, llm, ids: Arc::new(UuidIds), guards: BatchGuards::new(), transcripts: Transcripts::new() }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use diagram::{Diagram, SequentialIds};

    use crate::llm::types::{ChatResponse, ContentBlock, LlmError, Message, Role};
    use crate::services::persistence::MemoryStore;

    pub const OWNER: &str = "tester";

    fn memory_state(llm: Option<Arc<dyn LlmChat>>) -> AppState {
        let mut state = AppState::new(Arc::new(MemoryStore::new()), llm);
        state.ids = Arc::new(SequentialIds::new("n"));
        state
    }

    /// In-memory store, no LLM, sequential ids `n1`, `n2`, ...
    #[must_use]
    pub fn test_app_state() -> AppState {
        memory_state(None)
    }

    /// Same as [`test_app_state`] with a mock LLM attached.
    #[must_use]
    pub fn test_app_state_with_llm(llm: Arc<dyn LlmChat>) -> AppState {
        memory_state(Some(llm))
    }

    /// Save an empty diagram under [`OWNER`] and return it.
    pub async fn seed_diagram(state: &AppState, name: &str) -> Diagram {
        let diagram = Diagram::new(name);
        state.store.save(OWNER, &diagram).await.unwrap();
        diagram
    }

    /// LLM double that replays queued results and records system prompts.
    pub struct MockLlm {
        responses: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
        pub systems: Mutex<Vec<String>>,
    }

    impl MockLlm {
        pub fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
            Self { responses: Mutex::new(responses.into()), systems: Mutex::new(Vec::new()) }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text_response(text))])
        }
    }

    #[async_trait::async_trait]
    impl LlmChat for MockLlm {
        async fn chat(&self, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].role, Role::User);
            self.systems.lock().unwrap().push(system.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(text_response("done")))
        }

        fn model(&self) -> &str {
            "mock"
        }
    }

    #[must_use]
    pub fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            content: vec![ContentBlock::Text { text: text.into() }],
            model: "mock".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 10,
            output_tokens: 5,
        }
    }
}
