//! Diagnostics and error types shared across the engine

use std::path::PathBuf;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A recoverable finding collected while loading collections or resolving a template.
///
/// Diagnostics never abort the operation that produced them; the caller gets a usable
/// result plus the list of what went wrong along the way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A `__name__` token referenced a collection that does not exist
    #[error("unknown wildcard collection '{name}'")]
    UnknownCollection { name: String },

    /// The referenced collection exists but holds no alternatives
    #[error("wildcard collection '{name}' has no alternatives")]
    EmptyCollection { name: String },

    /// Weights could not form a distribution; sampling fell back to uniform
    #[error("invalid weights in {token}, sampling uniformly")]
    InvalidWeights { token: String },

    /// One collection file failed to parse and was skipped
    #[error("skipped collection file {}: {message}", path.display())]
    MalformedCollectionFile { path: PathBuf, message: String },

    /// Expansion exceeded its pass or length budget
    #[error("template expansion exceeded {limit}; keeping the original text")]
    ResolutionOverflow { limit: String },
}

impl Diagnostic {
    /// Template token this diagnostic points at, if any
    pub fn token(&self) -> Option<String> {
        match self {
            Self::UnknownCollection { name } | Self::EmptyCollection { name } => {
                Some(format!("__{}__", name))
            }
            Self::InvalidWeights { token } => Some(token.clone()),
            _ => None,
        }
    }

    /// Format the diagnostic with source context using ariadne
    ///
    /// The token is located in `source` by its text, since spans shift while the
    /// template is being expanded. Diagnostics without a locatable token are reported
    /// at the start of the source without a label.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let message = self.to_string();
        let span = self
            .token()
            .and_then(|token| source.find(&token).map(|start| start..start + token.len()));

        let mut report = Report::build(
            ReportKind::Warning,
            filename,
            span.as_ref().map_or(0, |s| s.start),
        )
        .with_config(Config::default().with_color(false))
        .with_message(&message);
        if let Some(span) = span {
            report = report.with_label(
                Label::new((filename, span))
                    .with_message(message)
                    .with_color(Color::Yellow),
            );
        }

        let mut buf = Vec::new();
        if report
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
