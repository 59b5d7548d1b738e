//! Wildcard template resolution
//!
//! A template is ordinary prompt text with two kinds of tokens:
//!
//! ```text
//! a __color__ {cat|dog} on a {2$$ and $$hill|lake|road}
//! ```
//!
//! `__name__` is replaced by one alternative of the named collection, and `{a|b}` by
//! one (or several) of its options. Replacements may themselves contain tokens, so
//! resolution repeats until the text is plain or a budget runs out.

mod choice;
mod lexer;
mod resolver;
mod sample;

pub use choice::{parse_choice, ChoiceOption, ChoiceSpec};
pub use lexer::{find_token, lex, split_options, TemplateToken, Token, TokenKind};
pub use resolver::{resolve, Resolution, ResolutionContext, Resolver};
pub use sample::{pick_distinct, pick_index, Sampled};
