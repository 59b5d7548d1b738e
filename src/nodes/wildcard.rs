//! Wildcard processor and wildcard encode nodes

use crate::config::ResolverConfig;
use crate::directive::{extract, extract_segments, LoaderKind, LoraDirective};
use crate::error::Diagnostic;
use crate::store::CollectionStore;
use crate::template::{Resolution, Resolver};

use super::{FeedbackSink, NodeError, PromptMode, POPULATED_TEXT_WIDGET};

/// File extensions the host accepts for model weights
pub const SUPPORTED_MODEL_EXTENSIONS: &[&str] = &[
    ".ckpt",
    ".pt",
    ".pt2",
    ".bin",
    ".pth",
    ".safetensors",
    ".pkl",
    ".sft",
];

/// Inputs shared by both wildcard nodes
#[derive(Debug, Clone, Copy)]
pub struct WildcardInput<'a> {
    pub wildcard_text: &'a str,
    pub populated_text: &'a str,
    pub mode: PromptMode,
    pub seed: u64,
    /// Node id for widget feedback; `None` disables feedback
    pub node_id: Option<&'a str>,
}

impl<'a> WildcardInput<'a> {
    pub fn new(wildcard_text: &'a str) -> Self {
        Self {
            wildcard_text,
            populated_text: "",
            mode: PromptMode::Populate,
            seed: 0,
            node_id: None,
        }
    }

    pub fn with_populated_text(mut self, text: &'a str) -> Self {
        self.populated_text = text;
        self
    }

    pub fn with_mode(mut self, mode: PromptMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_node_id(mut self, node_id: &'a str) -> Self {
        self.node_id = Some(node_id);
        self
    }

    /// The text the selected mode resolves
    pub fn source(&self) -> &'a str {
        self.mode.source(self.wildcard_text, self.populated_text)
    }
}

fn send_populated(feedback: &dyn FeedbackSink, input: &WildcardInput<'_>, text: &str) {
    if let Some(node_id) = input.node_id {
        feedback.send(node_id, POPULATED_TEXT_WIDGET, text);
    }
}

/// Resolves wildcard text into a prompt string
#[derive(Debug)]
pub struct WildcardProcessor<'s> {
    store: &'s CollectionStore,
    config: ResolverConfig,
}

impl<'s> WildcardProcessor<'s> {
    pub fn new(store: &'s CollectionStore) -> Self {
        Self {
            store,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Entries for the "add wildcard" dropdown
    pub fn wildcard_choices(&self) -> Vec<String> {
        self.store.get().wildcard_choices()
    }

    pub fn process(&self, input: &WildcardInput<'_>, feedback: &dyn FeedbackSink) -> Resolution {
        let snapshot = self.store.get();
        let resolution = Resolver::new(snapshot.collections())
            .with_config(self.config.clone())
            .resolve(input.source(), input.seed);
        send_populated(feedback, input, &resolution.text);
        resolution
    }
}

/// What the host provides to the encode node
///
/// Loader methods that return `Ok(None)` signal that the host lacks that loader.
pub trait PromptHost {
    type Model;
    type Clip;
    type Conditioning;

    /// Every LoRA file the host can load, as host-relative names
    fn lora_names(&self) -> Vec<String>;

    fn load_lora(
        &mut self,
        model: &Self::Model,
        clip: &Self::Clip,
        name: &str,
        model_weight: f64,
        clip_weight: f64,
    ) -> Result<(Self::Model, Self::Clip), NodeError>;

    fn load_lora_nunchaku(
        &mut self,
        _model: &Self::Model,
        _name: &str,
        _weight: f64,
    ) -> Result<Option<Self::Model>, NodeError> {
        Ok(None)
    }

    fn load_lora_block_weight(
        &mut self,
        _model: &Self::Model,
        _clip: &Self::Clip,
        _name: &str,
        _directive: &LoraDirective,
    ) -> Result<Option<(Self::Model, Self::Clip)>, NodeError> {
        Ok(None)
    }

    fn encode(&mut self, clip: &Self::Clip, text: &str) -> Result<Self::Conditioning, NodeError>;

    fn concat(
        &mut self,
        first: Self::Conditioning,
        second: Self::Conditioning,
    ) -> Result<Self::Conditioning, NodeError>;
}

/// Outputs of [`WildcardEncode::encode`]
pub struct EncodeOutput<H: PromptHost> {
    pub model: H::Model,
    pub clip: H::Clip,
    pub conditioning: H::Conditioning,
    /// Resolved text, directives still included
    pub populated_text: String,
    pub directives: Vec<LoraDirective>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Append `.safetensors` unless the name already ends in a model extension
pub fn complete_lora_name(name: &str) -> String {
    let extension = name.rsplit('.').next().unwrap_or(name);
    if SUPPORTED_MODEL_EXTENSIONS.contains(&format!(".{}", extension).as_str()) {
        name.to_string()
    } else {
        format!("{}.safetensors", name)
    }
}

/// Find a host LoRA by exact name, else the first one whose name ends with `name`
pub fn find_lora<'n>(available: &'n [String], name: &str) -> Option<&'n str> {
    available
        .iter()
        .find(|candidate| *candidate == name)
        .or_else(|| available.iter().find(|candidate| candidate.ends_with(name)))
        .map(String::as_str)
}

/// Resolves wildcard text, applies inline LoRA directives and encodes the prompt
#[derive(Debug)]
pub struct WildcardEncode<'s> {
    store: &'s CollectionStore,
    config: ResolverConfig,
}

impl<'s> WildcardEncode<'s> {
    pub fn new(store: &'s CollectionStore) -> Self {
        Self {
            store,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn encode<H: PromptHost>(
        &self,
        host: &mut H,
        model: H::Model,
        clip: H::Clip,
        input: &WildcardInput<'_>,
        feedback: &dyn FeedbackSink,
    ) -> Result<EncodeOutput<H>, NodeError> {
        let snapshot = self.store.get();
        let resolution = Resolver::new(snapshot.collections())
            .with_config(self.config.clone())
            .resolve(input.source(), input.seed);

        let extraction = extract(&resolution.text);
        let (model, clip) = if extraction.directives.is_empty() {
            (model, clip)
        } else {
            let available = host.lora_names();
            extraction
                .directives
                .iter()
                .try_fold((model, clip), |(model, clip), directive| {
                    apply_lora(host, model, clip, directive, &available)
                })?
        };

        let segments = extract_segments(&extraction.clean_text);
        log::info!("prompt segments: {:?}", segments);

        let mut conditioning: Option<H::Conditioning> = None;
        for segment in &segments {
            let encoded = host.encode(&clip, segment)?;
            conditioning = Some(match conditioning {
                Some(previous) => host.concat(previous, encoded)?,
                None => encoded,
            });
        }
        let conditioning = match conditioning {
            Some(c) => c,
            None => host.encode(&clip, "")?,
        };

        send_populated(feedback, input, &resolution.text);

        Ok(EncodeOutput {
            model,
            clip,
            conditioning,
            populated_text: resolution.text,
            directives: extraction.directives,
            diagnostics: resolution.diagnostics,
        })
    }
}

fn apply_lora<H: PromptHost>(
    host: &mut H,
    model: H::Model,
    clip: H::Clip,
    directive: &LoraDirective,
    available: &[String],
) -> Result<(H::Model, H::Clip), NodeError> {
    let requested = complete_lora_name(&directive.name);
    let Some(name) = find_lora(available, &requested) else {
        log::warn!("LoRA not found: {}", requested);
        return Ok((model, clip));
    };

    log::info!(
        "loading LoRA {}: {}, {}, LBW={}",
        name,
        directive.model_weight,
        directive.clip_weight,
        directive.block_preset.as_deref().unwrap_or("none")
    );

    match &directive.loader {
        Some(LoaderKind::Nunchaku) => {
            match host.load_lora_nunchaku(&model, name, directive.model_weight)? {
                Some(loaded) => Ok((loaded, clip)),
                None => {
                    log::warn!("LOADER=nunchaku is not available on this host, ignoring {}", name);
                    Ok((model, clip))
                }
            }
        }
        Some(LoaderKind::Other(kind)) => {
            log::warn!("unknown LoRA loader '{}', ignoring {}", kind, name);
            Ok((model, clip))
        }
        None if directive.uses_block_weights() => {
            match host.load_lora_block_weight(&model, &clip, name, directive)? {
                Some(loaded) => Ok(loaded),
                None => {
                    log::warn!("block weights are not supported by this host, loading {} without them", name);
                    host.load_lora(&model, &clip, name, directive.model_weight, directive.clip_weight)
                }
            }
        }
        None => host.load_lora(&model, &clip, name, directive.model_weight, directive.clip_weight),
    }
}
