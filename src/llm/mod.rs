//! LLM: multi-provider adapter behind the diagram assistant.
//!
//! DESIGN
//! ======
//! Configured from environment variables. `LlmClient` dispatches to an
//! OpenAI-compatible chat-completions endpoint (Groq by default, or OpenAI)
//! or to Anthropic Messages, based on `LLM_PROVIDER`. Callers depend only on
//! the [`LlmChat`] trait so tests can substitute a mock.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client for the configured provider.
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables (see [`LlmConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let inner = match (config.provider, config.base_url.as_deref()) {
            (LlmProviderKind::Anthropic, _) => LlmProvider::Anthropic(anthropic::AnthropicClient::new(
                config.api_key,
                config.temperature,
                config.max_tokens,
                config.timeouts,
            )?),
            (LlmProviderKind::Groq | LlmProviderKind::OpenAi, Some(base_url)) => {
                LlmProvider::OpenAi(openai::OpenAiClient::new(
                    config.api_key,
                    base_url,
                    config.temperature,
                    config.max_tokens,
                    config.timeouts,
                )?)
            }
            (provider, None) => {
                return Err(LlmError::ConfigParse(format!("{provider:?} provider requires a base URL")));
            }
        };
        Ok(Self { inner, model })
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            LlmProvider::Anthropic(c) => c.chat(&self.model, system, messages).await,
            LlmProvider::OpenAi(c) => c.chat(&self.model, system, messages).await,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
