//! Lexer for wildcard templates using logos

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `__`, opening or closing a wildcard name
    #[token("__")]
    Delimiter,
    #[token("_")]
    Underscore,

    // Inline choice delimiters
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("|")]
    Pipe,

    #[regex(r"\s")]
    Whitespace,

    /// A character with no special meaning
    #[regex(r"[^_{}|\s]")]
    Word,
}

/// Lex input string into tokens with spans
///
/// Runs of word or whitespace characters are merged into a single token.
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut tokens: Vec<(Token, Span)> = Vec::new();
    for (token, span) in Token::lexer(input).spanned() {
        let Ok(token) = token else {
            continue;
        };
        if let Some((last, last_span)) = tokens.last_mut() {
            if *last == token
                && matches!(token, Token::Word | Token::Whitespace)
                && last_span.end == span.start
            {
                last_span.end = span.end;
                continue;
            }
        }
        tokens.push((token, span));
    }
    tokens
}

/// What a well-formed template token expands from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `__name__`; the span covers the name only
    Wildcard { name: Span },
    /// `{...}`; the span covers the text between the braces
    Choice { body: Span },
}

/// A well-formed token found in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken {
    pub kind: TokenKind,
    /// Full extent of the token, delimiters included
    pub span: Span,
}

/// Find the leftmost well-formed token in `input`
///
/// A wildcard is `__` followed by one or more name characters and a closing `__`; the
/// name may contain single underscores but no whitespace, braces or pipes. A choice is
/// a balanced `{...}` group, so nested choices are found outermost first. Fragments
/// that do not form a token are left alone and scanning continues after them.
pub fn find_token(input: &str) -> Option<TemplateToken> {
    let tokens = lex(input);

    tokens
        .iter()
        .enumerate()
        .find_map(|(i, (token, _))| match token {
            Token::Delimiter => wildcard_at(&tokens, i),
            Token::BraceOpen => choice_at(&tokens, i),
            _ => None,
        })
}

fn wildcard_at(tokens: &[(Token, Span)], open: usize) -> Option<TemplateToken> {
    let mut end = open + 1;
    while let Some((Token::Word | Token::Underscore, _)) = tokens.get(end) {
        end += 1;
    }
    if end == open + 1 {
        return None;
    }
    match tokens.get(end) {
        Some((Token::Delimiter, close)) => Some(TemplateToken {
            kind: TokenKind::Wildcard {
                name: tokens[open + 1].1.start..tokens[end - 1].1.end,
            },
            span: tokens[open].1.start..close.end,
        }),
        _ => None,
    }
}

fn choice_at(tokens: &[(Token, Span)], open: usize) -> Option<TemplateToken> {
    let mut depth = 0usize;
    for (token, span) in &tokens[open..] {
        match token {
            Token::BraceOpen => depth += 1,
            Token::BraceClose => {
                depth -= 1;
                if depth == 0 {
                    let start = tokens[open].1.start;
                    return Some(TemplateToken {
                        kind: TokenKind::Choice {
                            body: start + 1..span.start,
                        },
                        span: start..span.end,
                    });
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a choice body on `|` separators that are not inside nested braces
pub fn split_options(body: &str) -> Vec<&str> {
    let mut options = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                options.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    options.push(&body[start..]);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        lex(input).into_iter().map(|(t, _)| t).collect()
    }

    fn found(input: &str) -> Option<&str> {
        find_token(input).map(|t| &input[t.span])
    }

    #[test]
    fn test_wildcard_tokens() {
        assert_eq!(
            kinds("__colors__ cat"),
            vec![
                Token::Delimiter,
                Token::Word,
                Token::Delimiter,
                Token::Whitespace,
                Token::Word
            ]
        );
    }

    #[test]
    fn test_single_underscore_in_name() {
        assert_eq!(
            kinds("__my_colors__"),
            vec![
                Token::Delimiter,
                Token::Word,
                Token::Underscore,
                Token::Word,
                Token::Delimiter
            ]
        );
        assert_eq!(found("a __my_colors__ b"), Some("__my_colors__"));
    }

    #[test]
    fn test_choice_tokens() {
        assert_eq!(
            kinds("{a|b}"),
            vec![
                Token::BraceOpen,
                Token::Word,
                Token::Pipe,
                Token::Word,
                Token::BraceClose
            ]
        );
    }

    #[test]
    fn test_find_leftmost() {
        assert_eq!(found("{x|y} then __z__"), Some("{x|y}"));
        assert_eq!(found("__z__ then {x|y}"), Some("__z__"));
    }

    #[test]
    fn test_wildcard_name_span() {
        let input = "a __colors/warm__";
        let token = find_token(input).unwrap();
        match token.kind {
            TokenKind::Wildcard { name } => assert_eq!(&input[name], "colors/warm"),
            other => panic!("expected wildcard, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_choice_outermost_first() {
        assert_eq!(found("{a|{b|c}} end"), Some("{a|{b|c}}"));
    }

    #[test]
    fn test_name_built_from_choice() {
        // The wildcard cannot form until the choice inside it is resolved
        assert_eq!(found("__colors/{warm|cool}__"), Some("{warm|cool}"));
    }

    #[test]
    fn test_whitespace_breaks_wildcard() {
        assert_eq!(found("a__ b __c__"), Some("__c__"));
        assert_eq!(found("snake_case and __ alone"), None);
    }

    #[test]
    fn test_unbalanced_brace_skipped() {
        assert_eq!(found("{open and {x|y}"), Some("{x|y}"));
        assert_eq!(found("close} only"), None);
    }

    #[test]
    fn test_plain_text_has_no_token() {
        assert_eq!(found("a quiet lake at dawn"), None);
        assert_eq!(found(""), None);
    }

    #[test]
    fn test_long_runs_merge_into_one_token() {
        let input = format!("{} {}", "x".repeat(100_000), " ".repeat(50_000));
        assert_eq!(kinds(&input), vec![Token::Word, Token::Whitespace]);
        assert_eq!(found(&input), None);

        let wrapped = format!("__{}__", "y".repeat(100_000));
        assert_eq!(found(&wrapped).map(str::len), Some(100_004));
    }

    #[test]
    fn test_split_options_respects_nesting() {
        assert_eq!(split_options("a|{b|c}|d"), vec!["a", "{b|c}", "d"]);
        assert_eq!(split_options(""), vec![""]);
        assert_eq!(split_options("only"), vec!["only"]);
    }
}
