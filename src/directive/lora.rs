//! `<lora:...>` directive records

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(\d*\.?\d+|\d+\.?\d*)$").expect("numeric field pattern is valid")
});

/// A preset name written directly after `LBW=` and closed by `:` is folded away
static LBW_PRESET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"LBW=[A-Za-z][A-Za-z0-9_-]*:").expect("block weight pattern is valid")
});

const BLOCK_WEIGHT_PREFIX: &str = "LBW=";
const LOADER_PREFIX: &str = "LOADER=";

/// Alternative loader requested by a directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderKind {
    Nunchaku,
    Other(String),
}

impl LoaderKind {
    pub fn parse(value: &str) -> Self {
        match value {
            "nunchaku" => Self::Nunchaku,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nunchaku => write!(f, "nunchaku"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One LoRA load request extracted from prompt text
#[derive(Debug, Clone, PartialEq)]
pub struct LoraDirective {
    pub name: String,
    pub model_weight: f64,
    pub clip_weight: f64,
    /// Block weight preset or vector
    pub block_preset: Option<String>,
    pub block_a: Option<f64>,
    pub block_b: Option<f64>,
    pub loader: Option<LoaderKind>,
}

impl LoraDirective {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_weight: 1.0,
            clip_weight: 1.0,
            block_preset: None,
            block_a: None,
            block_b: None,
            loader: None,
        }
    }

    pub fn with_weights(mut self, model: f64, clip: f64) -> Self {
        self.model_weight = model;
        self.clip_weight = clip;
        self
    }

    /// Whether block weights were requested
    pub fn uses_block_weights(&self) -> bool {
        self.block_preset.is_some()
    }

    /// Parse the body of a tag (the text between `<lora:` and `>`)
    ///
    /// Returns `None` when the name field is empty.
    pub fn parse(body: &str) -> Option<Self> {
        let body = LBW_PRESET_PREFIX.replace_all(body.trim_matches(':'), BLOCK_WEIGHT_PREFIX);
        let mut fields = body.split(':');

        let name = fields.next().filter(|name| !name.is_empty())?;
        let mut model_weight = None;
        let mut clip_weight = None;
        let mut directive = Self::new(name);

        for field in fields {
            if is_numeric(field) {
                let value = parse_weight(field);
                if model_weight.is_none() {
                    model_weight = Some(value);
                } else if clip_weight.is_none() {
                    clip_weight = Some(value);
                }
            } else if let Some(spec) = field.strip_prefix(BLOCK_WEIGHT_PREFIX) {
                directive.apply_block_weights(spec);
            } else if let Some(loader) = field.strip_prefix(LOADER_PREFIX) {
                directive.loader = Some(LoaderKind::parse(loader));
            }
        }

        directive.model_weight = model_weight.unwrap_or(1.0);
        directive.clip_weight = clip_weight.unwrap_or(directive.model_weight);
        Some(directive)
    }

    fn apply_block_weights(&mut self, spec: &str) {
        for item in spec.split(';') {
            if let Some(a) = item.strip_prefix("A=") {
                self.block_a = Some(weight_or_default(a.trim()));
            } else if let Some(b) = item.strip_prefix("B=") {
                self.block_b = Some(weight_or_default(b.trim()));
            } else if !item.trim().is_empty() {
                self.block_preset = Some(item.to_string());
            }
        }
    }
}

impl fmt::Display for LoraDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<lora:{}:{}:{}", self.name, self.model_weight, self.clip_weight)?;
        if let Some(preset) = &self.block_preset {
            write!(f, ":LBW={}", preset)?;
            if let Some(a) = self.block_a {
                write!(f, ";A={}", a)?;
            }
            if let Some(b) = self.block_b {
                write!(f, ";B={}", b)?;
            }
        }
        if let Some(loader) = &self.loader {
            write!(f, ":LOADER={}", loader)?;
        }
        write!(f, ">")
    }
}

/// Whether `field` is a plain decimal number such as `1`, `-0.5`, `.75` or `2.`
pub fn is_numeric(field: &str) -> bool {
    NUMERIC.is_match(field)
}

fn parse_weight(field: &str) -> f64 {
    field.parse().unwrap_or(1.0)
}

fn weight_or_default(value: &str) -> f64 {
    if is_numeric(value) {
        parse_weight(value)
    } else {
        1.0
    }
}
