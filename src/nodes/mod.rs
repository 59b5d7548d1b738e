//! Node adapters for the host graph editor
//!
//! Each node is a plain struct whose method takes typed inputs and returns typed
//! outputs. Anything a node needs from the host (LoRA loading, text encoding, LLM
//! calls, widget updates) comes in through a trait.

mod llm;
mod seed;
mod text;
mod wildcard;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use llm::{
    GenerationRequest, LlmPromptProcessor, Message, ProviderConfig, Role, TextGenerator,
    DEFAULT_API_KEY_ENV, FALLBACK_MODELS,
};
pub use seed::{NoiseToSeed, Seed};
pub use text::{ShowText, ShufflePrompt, TextInput, WrapText};
pub use wildcard::{
    complete_lora_name, find_lora, EncodeOutput, PromptHost, WildcardEncode, WildcardInput,
    WildcardProcessor, SUPPORTED_MODEL_EXTENSIONS,
};

/// Widget that shows the resolved prompt on wildcard nodes
pub const POPULATED_TEXT_WIDGET: &str = "populated_text";
/// Widget that shows incoming text on the show-text node
pub const DISPLAYED_TEXT_WIDGET: &str = "displayed_text";

/// Hard failures of a node execution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("unknown prompt mode '{0}' (expected populate, fixed or reproduce)")]
    InvalidMode(String),

    #[error("noise input does not include a seed value")]
    MissingNoiseSeed,

    #[error("noise seed value must be a non-negative integer, got {0}")]
    InvalidNoiseSeed(String),

    #[error("API key not found in environment variable '{env_key}'")]
    MissingApiKey { env_key: String },

    #[error("model id not specified in provider configuration")]
    MissingModel,

    #[error("{name} out of range: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("text generation failed: {0}")]
    Generation(String),

    #[error("host error: {0}")]
    Host(String),
}

/// How a wildcard node picks the text it resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    /// Resolve the wildcard text and overwrite the populated text
    #[default]
    Populate,
    /// Keep the populated text, which the user may edit
    Fixed,
    /// Like `Fixed` for one run; the UI then switches back to `Populate`
    Reproduce,
}

impl PromptMode {
    pub const ALL: [PromptMode; 3] = [Self::Populate, Self::Fixed, Self::Reproduce];

    /// Pick the input text this mode resolves
    pub fn source<'a>(&self, wildcard_text: &'a str, populated_text: &'a str) -> &'a str {
        match self {
            Self::Populate => wildcard_text,
            Self::Fixed | Self::Reproduce => populated_text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Populate => "populate",
            Self::Fixed => "fixed",
            Self::Reproduce => "reproduce",
        }
    }
}

impl FromStr for PromptMode {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "populate" => Ok(Self::Populate),
            "fixed" => Ok(Self::Fixed),
            "reproduce" => Ok(Self::Reproduce),
            other => Err(NodeError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget channel for pushing values back into node widgets
pub trait FeedbackSink {
    fn send(&self, node_id: &str, widget: &str, value: &str);
}

/// Sink for runs without a UI
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn send(&self, _node_id: &str, _widget: &str, _value: &str) {}
}

/// Registration entry for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo {
    pub class_name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

pub const NODES: &[NodeInfo] = &[
    NodeInfo {
        class_name: "LumiWildcardProcessor",
        display_name: "Lumi Wildcard Processor",
        category: "Lumi/Prompt",
        description: "Processes text prompts written in wildcard syntax and outputs the processed text prompt.",
    },
    NodeInfo {
        class_name: "LumiWildcardEncode",
        display_name: "Lumi Wildcard Encode",
        category: "Lumi/Prompt",
        description: "Processes wildcard text with LoRA support and outputs conditioning. Use BREAK to concatenate conditioning segments.",
    },
    NodeInfo {
        class_name: "LumiShufflePrompt",
        display_name: "Lumi Shuffle Prompt",
        category: "Lumi/Prompt",
        description: "Shuffles tokens in a prompt. Strips newlines and commas, splits by spaces, shuffles, and rejoins.",
    },
    NodeInfo {
        class_name: "LumiTextInput",
        display_name: "Lumi Text Input",
        category: "Lumi/Text",
        description: "Provides an arbitrary multiline text input.",
    },
    NodeInfo {
        class_name: "LumiWrapText",
        display_name: "Lumi Wrap Text",
        category: "Lumi/Text",
        description: "Wraps input text by prepending and appending strings.",
    },
    NodeInfo {
        class_name: "LumiShowText",
        display_name: "Lumi Show Text",
        category: "Lumi/Utils",
        description: "Displays text output. Connect to any STRING output to view its contents.",
    },
    NodeInfo {
        class_name: "LumiSeed",
        display_name: "Lumi Seed",
        category: "Lumi/Utils",
        description: "Outputs a seed value.",
    },
    NodeInfo {
        class_name: "LumiNoiseToSeed",
        display_name: "Lumi Noise To Seed",
        category: "Lumi/Utils",
        description: "Extracts the seed from a NOISE object for nodes expecting an INT seed.",
    },
    NodeInfo {
        class_name: "LumiOpenRouterProvider",
        display_name: "Lumi OpenRouter Provider",
        category: "Lumi/LLM",
        description: "Creates an OpenRouter provider configuration. The API key is read from an environment variable.",
    },
    NodeInfo {
        class_name: "LumiLLMPromptProcessor",
        display_name: "Lumi LLM Prompt Processor",
        category: "Lumi/LLM",
        description: "Generates text from instructions and a prompt using a provider configuration.",
    },
];

/// Look up a node by class name
pub fn node_info(class_name: &str) -> Option<&'static NodeInfo> {
    NODES.iter().find(|n| n.class_name == class_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("populate".parse::<PromptMode>(), Ok(PromptMode::Populate));
        assert_eq!("reproduce".parse::<PromptMode>(), Ok(PromptMode::Reproduce));
        assert_eq!(
            "Fixed".parse::<PromptMode>(),
            Err(NodeError::InvalidMode("Fixed".to_string()))
        );
    }

    #[test]
    fn test_mode_source() {
        assert_eq!(PromptMode::Populate.source("w", "p"), "w");
        assert_eq!(PromptMode::Fixed.source("w", "p"), "p");
        assert_eq!(PromptMode::Reproduce.source("w", "p"), "p");
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in PromptMode::ALL {
            assert_eq!(mode.to_string().parse::<PromptMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_catalog_unique() {
        let mut names: Vec<_> = NODES.iter().map(|n| n.class_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NODES.len());
        assert_eq!(
            node_info("LumiSeed").map(|n| n.category),
            Some("Lumi/Utils")
        );
    }
}
