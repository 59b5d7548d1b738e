//! Lumi Pack - wildcard prompt templates for image generation pipelines
//!
//! This library loads named collections of text alternatives from disk, expands
//! wildcard templates against them with seed-deterministic sampling, and pulls inline
//! LoRA directives and `BREAK` segments out of the result.
//!
//! # Example
//!
//! ```rust
//! use lumi_pack::process_prompt;
//! use lumi_pack::store::{Collection, Collections};
//!
//! let collections: Collections = [Collection::from_texts("animal", ["fox"])]
//!     .into_iter()
//!     .collect();
//!
//! let prompt = process_prompt("a __animal__ <lora:detail:0.5> BREAK night", 42, &collections);
//! assert_eq!(prompt.resolved, "a fox <lora:detail:0.5> BREAK night");
//! assert_eq!(prompt.segments, vec!["a fox", "night"]);
//! assert_eq!(prompt.directives[0].name, "detail");
//! ```

pub mod config;
pub mod directive;
pub mod error;
pub mod nodes;
pub mod store;
pub mod template;

pub use config::{ConfigError, LumiConfig, ResolverConfig, StoreConfig};
pub use directive::{extract, extract_segments, Extraction, LoaderKind, LoraDirective};
pub use error::Diagnostic;
pub use store::{resolve_collections, CollectionStore, Collections, StoreError};
pub use template::{resolve, Resolution, Resolver};

/// A template after resolution and directive extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPrompt {
    /// Resolved text, directive tags still in place
    pub resolved: String,
    pub directives: Vec<LoraDirective>,
    /// Directive-free text split on `BREAK`
    pub segments: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve a template, then extract its directives and segments
pub fn process_prompt(template: &str, seed: u64, collections: &Collections) -> ProcessedPrompt {
    process_prompt_with_config(template, seed, collections, &ResolverConfig::default())
}

/// Like [`process_prompt`] with explicit resolver limits
pub fn process_prompt_with_config(
    template: &str,
    seed: u64,
    collections: &Collections,
    config: &ResolverConfig,
) -> ProcessedPrompt {
    let resolution = Resolver::new(collections)
        .with_config(config.clone())
        .resolve(template, seed);
    let extraction = extract(&resolution.text);
    let segments = extract_segments(&extraction.clean_text);

    ProcessedPrompt {
        resolved: resolution.text,
        directives: extraction.directives,
        segments,
        diagnostics: resolution.diagnostics,
    }
}
