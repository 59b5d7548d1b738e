//! Lexer for directive tags embedded in resolved prompt text

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    #[token("<lora:")]
    TagOpen,

    #[token(">")]
    TagClose,

    /// A `<` that does not open a tag
    #[token("<")]
    Angle,

    #[regex(r"[^<>]")]
    Text,
}

/// Spans of every `<lora:...>` tag in `input`, left to right
///
/// A tag runs from `<lora:` to the next `>` and needs a non-empty body. The body may
/// contain `<`, including another `<lora:`.
pub fn lora_tags(input: &str) -> Vec<Span> {
    let mut tags = Vec::new();
    let mut open: Option<usize> = None;

    for (token, span) in Token::lexer(input).spanned() {
        match (token, open) {
            (Ok(Token::TagOpen), None) => open = Some(span.start),
            (Ok(Token::TagClose), Some(start)) => {
                if span.start > start + "<lora:".len() {
                    tags.push(start..span.end);
                }
                open = None;
            }
            _ => {}
        }
    }
    tags
}

/// Body of a tag span, between `<lora:` and `>`
pub fn tag_body(tag: &str) -> &str {
    &tag["<lora:".len()..tag.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(input: &str) -> Vec<&str> {
        lora_tags(input).into_iter().map(|s| &input[s]).collect()
    }

    #[test]
    fn test_single_tag() {
        assert_eq!(tags("a <lora:style:0.8> b"), vec!["<lora:style:0.8>"]);
    }

    #[test]
    fn test_adjacent_tags() {
        assert_eq!(
            tags("<lora:x:1><lora:y:2>"),
            vec!["<lora:x:1>", "<lora:y:2>"]
        );
    }

    #[test]
    fn test_other_angles_are_text() {
        assert_eq!(tags("a < b and <emb:x> c"), Vec::<&str>::new());
        assert_eq!(tags("<lora:>"), Vec::<&str>::new());
        assert_eq!(tags("<LORA:x>"), Vec::<&str>::new());
    }

    #[test]
    fn test_unterminated_tag_ignored() {
        assert_eq!(tags("a <lora:x:1"), Vec::<&str>::new());
    }

    #[test]
    fn test_tag_body_may_hold_angles() {
        assert_eq!(tags("<lora:a<lora:b>"), vec!["<lora:a<lora:b>"]);
        assert_eq!(tags("<lora:><lora:x>"), vec!["<lora:x>"]);
    }

    #[test]
    fn test_long_text_between_tags() {
        let input = format!("{}<lora:x>{}", "a".repeat(100_000), "b".repeat(100_000));
        assert_eq!(tags(&input), vec!["<lora:x>"]);
    }

    #[test]
    fn test_tag_body() {
        assert_eq!(tag_body("<lora:x:1:LBW=A=2>"), "x:1:LBW=A=2");
    }
}
