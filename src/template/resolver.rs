//! Template resolution - expands wildcard and choice tokens into concrete text

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ResolverConfig;
use crate::error::Diagnostic;
use crate::store::{is_glob, Alternative, Collections};

use super::choice::parse_choice;
use super::lexer::{find_token, TokenKind};
use super::sample::{pick_distinct, pick_index};

/// Per-call resolution state
///
/// Every sampling decision of one call draws from this single stream, in the order
/// tokens are expanded, so a positive seed reproduces the same output.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    rng: StdRng,
    passes: usize,
    diagnostics: Vec<Diagnostic>,
}

impl ResolutionContext {
    /// Seeded stream for `seed > 0`, fresh entropy for `seed == 0`
    pub fn new(seed: u64) -> Self {
        let rng = if seed > 0 {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };
        Self {
            rng,
            passes: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Tokens expanded so far
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn report(&mut self, diag: Diagnostic) {
        log::warn!("{}", diag);
        self.diagnostics.push(diag);
    }
}

/// Output of a resolution call
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Whether the call finished without any diagnostic
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether the overflow guard tripped and the template came back unchanged
    pub fn overflowed(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::ResolutionOverflow { .. }))
    }
}

/// Expands templates against a fixed set of collections
#[derive(Debug, Clone)]
pub struct Resolver<'c> {
    collections: &'c Collections,
    config: ResolverConfig,
}

impl<'c> Resolver<'c> {
    pub fn new(collections: &'c Collections) -> Self {
        Self {
            collections,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `template` with a fresh context for `seed`
    pub fn resolve(&self, template: &str, seed: u64) -> Resolution {
        let mut ctx = ResolutionContext::new(seed);
        self.resolve_with(template, &mut ctx)
    }

    /// Resolve `template`, drawing from an existing context
    ///
    /// Tokens are expanded one per pass, leftmost first. A spliced-in alternative may
    /// contain new tokens, which later passes pick up. When the pass or length budget
    /// runs out the original template is returned with a `ResolutionOverflow`
    /// diagnostic.
    pub fn resolve_with(&self, template: &str, ctx: &mut ResolutionContext) -> Resolution {
        let mut text = template.to_string();
        let mut passes = 0usize;

        while let Some(token) = find_token(&text) {
            if passes >= self.config.max_passes {
                return self.overflow(template, format!("{} passes", self.config.max_passes), ctx);
            }
            passes += 1;
            ctx.passes += 1;

            let replacement = match token.kind {
                TokenKind::Wildcard { name } => self.expand_wildcard(&text[name], ctx),
                TokenKind::Choice { body } => self.expand_choice(&text[body], ctx),
            };
            text.replace_range(token.span, &replacement);

            if text.len().saturating_sub(template.len()) > self.config.max_length {
                return self.overflow(template, format!("{} bytes", self.config.max_length), ctx);
            }
        }

        Resolution {
            text,
            diagnostics: std::mem::take(&mut ctx.diagnostics),
        }
    }

    fn overflow(&self, template: &str, limit: String, ctx: &mut ResolutionContext) -> Resolution {
        ctx.report(Diagnostic::ResolutionOverflow { limit });
        Resolution {
            text: template.to_string(),
            diagnostics: std::mem::take(&mut ctx.diagnostics),
        }
    }

    fn expand_wildcard(&self, name: &str, ctx: &mut ResolutionContext) -> String {
        let pool: Vec<&Alternative> = if is_glob(name) {
            self.collections
                .matching(name)
                .into_iter()
                .flat_map(|c| c.alternatives())
                .collect()
        } else {
            match self.collections.get(name) {
                Some(collection) => collection.alternatives().iter().collect(),
                None => {
                    ctx.report(Diagnostic::UnknownCollection {
                        name: name.to_string(),
                    });
                    return String::new();
                }
            }
        };

        if pool.is_empty() {
            let diag = if is_glob(name) {
                Diagnostic::UnknownCollection {
                    name: name.to_string(),
                }
            } else {
                Diagnostic::EmptyCollection {
                    name: name.to_string(),
                }
            };
            ctx.report(diag);
            return String::new();
        }

        let weights: Vec<Option<f64>> = pool.iter().map(|a| a.weight).collect();
        match pick_index(&weights, &mut ctx.rng) {
            Some(sampled) => {
                if sampled.fell_back {
                    ctx.report(Diagnostic::InvalidWeights {
                        token: format!("__{}__", name),
                    });
                }
                pool[sampled.index].text.clone()
            }
            None => String::new(),
        }
    }

    fn expand_choice(&self, body: &str, ctx: &mut ResolutionContext) -> String {
        let spec = parse_choice(body);
        let count = if spec.min == spec.max {
            spec.min
        } else {
            ctx.rng.gen_range(spec.min..=spec.max)
        };

        let weights: Vec<Option<f64>> = spec.options.iter().map(|o| o.weight).collect();
        let (picked, fell_back) = pick_distinct(&weights, count, &mut ctx.rng);
        if fell_back {
            ctx.report(Diagnostic::InvalidWeights {
                token: format!("{{{}}}", body),
            });
        }

        let joiner = spec.joiner.as_deref().unwrap_or(&self.config.joiner);
        picked
            .iter()
            .map(|&i| spec.options[i].text.as_str())
            .collect::<Vec<_>>()
            .join(joiner)
    }
}

/// Resolve `template` against `collections` with default limits, discarding diagnostics
pub fn resolve(template: &str, seed: u64, collections: &Collections) -> String {
    Resolver::new(collections).resolve(template, seed).text
}
