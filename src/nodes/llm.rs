//! LLM prompt generation nodes
//!
//! The provider node turns widget values into a [`ProviderConfig`]; the processor node
//! hands a [`GenerationRequest`] to whatever [`TextGenerator`] the host supplies.

use serde::{Deserialize, Serialize};

use super::NodeError;

/// Environment variable the provider node reads by default
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Model ids offered when the provider's model list is unavailable
pub const FALLBACK_MODELS: &[&str] = &[
    "openai/gpt-4o",
    "openai/gpt-4o-mini",
    "anthropic/claude-3.5-sonnet",
    "google/gemini-pro-1.5",
];

const MAX_TOKENS_LIMIT: u32 = 32_000;

/// Connection settings for one LLM provider
///
/// The API key is never serialized, so saved workflows do not leak it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider_type", rename_all = "snake_case")]
pub enum ProviderConfig {
    #[serde(rename = "openrouter")]
    OpenRouter {
        env_key: String,
        #[serde(skip)]
        api_key: String,
        model_id: String,
        max_tokens: u32,
        top_p: f64,
    },
}

impl ProviderConfig {
    /// Build an OpenRouter config, reading the key from the `env_key` variable
    pub fn open_router(
        env_key: &str,
        model_id: &str,
        max_tokens: u32,
        top_p: f64,
    ) -> Result<Self, NodeError> {
        let env_key = env_key.trim();
        let api_key = std::env::var(env_key)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| NodeError::MissingApiKey {
                env_key: env_key.to_string(),
            })?;
        Self::open_router_with_key(env_key, api_key, model_id, max_tokens, top_p)
    }

    /// Build an OpenRouter config from an explicit key
    pub fn open_router_with_key(
        env_key: &str,
        api_key: impl Into<String>,
        model_id: &str,
        max_tokens: u32,
        top_p: f64,
    ) -> Result<Self, NodeError> {
        if !(1..=MAX_TOKENS_LIMIT).contains(&max_tokens) {
            return Err(NodeError::InvalidParameter {
                name: "max_tokens",
                value: max_tokens.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&top_p) {
            return Err(NodeError::InvalidParameter {
                name: "top_p",
                value: top_p.to_string(),
            });
        }
        Ok(Self::OpenRouter {
            env_key: env_key.to_string(),
            api_key: api_key.into(),
            model_id: model_id.to_string(),
            max_tokens,
            top_p,
        })
    }

    pub fn model_id(&self) -> &str {
        match self {
            Self::OpenRouter { model_id, .. } => model_id,
        }
    }

    pub fn api_key(&self) -> &str {
        match self {
            Self::OpenRouter { api_key, .. } => api_key,
        }
    }

    pub fn env_key(&self) -> &str {
        match self {
            Self::OpenRouter { env_key, .. } => env_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// One generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub instructions: String,
    pub prompt: String,
    /// `None` lets the provider pick
    pub seed: Option<u64>,
}

impl GenerationRequest {
    /// Trim both texts; a seed of 0 means no seed
    pub fn new(instructions: &str, prompt: &str, seed: u64) -> Self {
        Self {
            instructions: instructions.trim().to_string(),
            prompt: prompt.trim().to_string(),
            seed: (seed > 0).then_some(seed),
        }
    }

    /// Chat messages: the instructions as a system message when present, then the prompt
    pub fn messages(&self) -> Vec<Message> {
        let system = (!self.instructions.is_empty()).then(|| Message {
            role: Role::System,
            content: self.instructions.clone(),
        });
        system
            .into_iter()
            .chain(std::iter::once(Message {
                role: Role::User,
                content: self.prompt.clone(),
            }))
            .collect()
    }
}

/// Backend that turns a request into text
pub trait TextGenerator {
    fn generate(
        &self,
        provider: &ProviderConfig,
        request: &GenerationRequest,
    ) -> Result<String, NodeError>;
}

/// Stateless prompt processor
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmPromptProcessor;

impl LlmPromptProcessor {
    pub fn process(
        &self,
        generator: &dyn TextGenerator,
        provider: &ProviderConfig,
        instructions: &str,
        prompt: &str,
        seed: u64,
    ) -> Result<String, NodeError> {
        if provider.api_key().is_empty() {
            return Err(NodeError::MissingApiKey {
                env_key: provider.env_key().to_string(),
            });
        }
        if provider.model_id().is_empty() {
            return Err(NodeError::MissingModel);
        }

        let request = GenerationRequest::new(instructions, prompt, seed);
        match generator.generate(provider, &request) {
            Ok(text) => {
                log::info!("LLM generation completed using {}", provider.model_id());
                Ok(text)
            }
            Err(err) => {
                log::error!("LLM prompt processing failed: {}", err);
                Err(err)
            }
        }
    }
}
