//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    /// Groq's OpenAI-compatible endpoint.
    Groq,
    /// OpenAI or any other chat-completions compatible endpoint.
    OpenAi,
    Anthropic,
}

impl LlmProviderKind {
    fn default_key_var(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::Groq => "llama-3.1-70b-versatile",
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-sonnet-4-5-20250929",
        }
    }

    fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::Groq => Some(DEFAULT_GROQ_BASE_URL),
            Self::OpenAi => Some(DEFAULT_OPENAI_BASE_URL),
            Self::Anthropic => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: String,
    pub model: String,
    /// Base URL for chat-completions providers; `None` for Anthropic.
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Optional:
    /// - `LLM_PROVIDER`: `groq` (default), `openai` or `anthropic`
    /// - `LLM_API_KEY_ENV`: env var holding the key; provider default when absent
    /// - `LLM_MODEL`: provider default when absent
    /// - `LLM_BASE_URL`: chat-completions base URL, provider default when absent
    /// - `LLM_TEMPERATURE`: default 0.1
    /// - `LLM_MAX_TOKENS`: default 2000
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] for an unknown provider and
    /// [`LlmError::MissingApiKey`] when the key variable is unset or empty.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider = parse_provider(std::env::var("LLM_PROVIDER").ok().as_deref())?;

        let key_var = std::env::var("LLM_API_KEY_ENV").unwrap_or_else(|_| provider.default_key_var().to_string());
        let api_key = std::env::var(&key_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey { var: key_var.clone() })?;

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| provider.default_model().to_string());
        let base_url = provider.default_base_url().map(|default| {
            std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| default.to_string())
                .trim_end_matches('/')
                .to_string()
        });
        let timeouts = LlmTimeouts {
            request_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            temperature: env_parse("LLM_TEMPERATURE", DEFAULT_LLM_TEMPERATURE),
            max_tokens: env_parse("LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS),
            timeouts,
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_provider(raw: Option<&str>) -> Result<LlmProviderKind, LlmError> {
    match raw.unwrap_or("groq") {
        "groq" => Ok(LlmProviderKind::Groq),
        "openai" => Ok(LlmProviderKind::OpenAi),
        "anthropic" => Ok(LlmProviderKind::Anthropic),
        other => Err(LlmError::ConfigParse(format!("unknown LLM_PROVIDER: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
