//! Inline choice syntax: `{a|b|c}` with optional count header and option weights
//!
//! ```text
//! {red|green|blue}          one option
//! {2::red|green}            red is twice as likely
//! {2$$red|green|blue}       two distinct options, joined with the default joiner
//! {1-3$$red|green|blue}     one to three options
//! {2$$ and $$red|green}     two options joined with " and "
//! ```

use chumsky::prelude::*;

use super::lexer::split_options;

type Extra<'a> = extra::Err<Rich<'a, char>>;

/// One option of an inline choice
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub text: String,
    pub weight: Option<f64>,
}

/// A parsed inline choice body
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSpec {
    /// Minimum number of options to pick
    pub min: usize,
    /// Maximum number of options to pick
    pub max: usize,
    /// Joiner for multiple picks; `None` means the resolver default
    pub joiner: Option<String>,
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq)]
struct Header {
    min: usize,
    max: usize,
    joiner: Option<String>,
    rest: String,
}

/// `N$$`, `N-M$$` or `N$$joiner$$` followed by the option list
fn header_parser<'a>() -> impl Parser<'a, &'a str, Header, Extra<'a>> {
    let count = text::int(10).try_map(|digits: &str, span| {
        digits
            .parse::<usize>()
            .map_err(|e| Rich::custom(span, e))
    });

    let range = count
        .clone()
        .then(just('-').ignore_then(count).or_not())
        .map(|(min, max)| (min, max.unwrap_or(min)));

    let joiner = none_of("$")
        .repeated()
        .collect::<String>()
        .then_ignore(just("$$"));

    range
        .then_ignore(just("$$"))
        .then(joiner.or_not())
        .then(any().repeated().collect::<String>())
        .map(|(((min, max), joiner), rest)| Header {
            min: min.min(max),
            max: max.max(min),
            joiner,
            rest,
        })
}

/// `weight::text`
fn weighted_option_parser<'a>() -> impl Parser<'a, &'a str, (f64, String), Extra<'a>> {
    none_of(":")
        .repeated()
        .at_least(1)
        .collect::<String>()
        .try_map(|weight: String, span| {
            weight
                .trim()
                .parse::<f64>()
                .map_err(|e| Rich::custom(span, e))
        })
        .then_ignore(just("::"))
        .then(any().repeated().collect::<String>())
}

fn parse_option(raw: &str) -> ChoiceOption {
    match weighted_option_parser().parse(raw).into_result() {
        Ok((weight, text)) => ChoiceOption {
            text,
            weight: Some(weight),
        },
        Err(_) => ChoiceOption {
            text: raw.to_string(),
            weight: None,
        },
    }
}

/// Parse the text between the braces of an inline choice
///
/// Bodies without a valid header pick exactly one option. Text that merely looks
/// like a header (`{2 apples|3 pears}`) is treated as options.
pub fn parse_choice(body: &str) -> ChoiceSpec {
    let (min, max, joiner, options_text) = match header_parser().parse(body).into_result() {
        Ok(header) => (header.min, header.max, header.joiner, header.rest),
        Err(_) => (1, 1, None, body.to_string()),
    };

    ChoiceSpec {
        min,
        max,
        joiner,
        options: split_options(&options_text)
            .into_iter()
            .map(parse_option)
            .collect(),
    }
}
