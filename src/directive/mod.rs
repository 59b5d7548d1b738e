//! Inline directives in resolved prompt text
//!
//! After wildcard resolution a prompt may carry LoRA requests such as
//! `<lora:detail:0.8>` and `BREAK` separators. [`extract`] pulls the tags out and
//! [`extract_segments`] splits what remains into the pieces encoded separately.

mod lexer;
mod lora;

pub use lexer::{lora_tags, tag_body, Token};
pub use lora::{is_numeric, LoaderKind, LoraDirective};

/// Keyword separating independently encoded prompt segments
pub const SEGMENT_SEPARATOR: &str = "BREAK";

/// Directives found in a text plus the text with their tags removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub directives: Vec<LoraDirective>,
    pub clean_text: String,
}

/// Extract every `<lora:...>` tag from `text`
///
/// Tags are deleted verbatim; surrounding whitespace is left as is. Tags with an empty
/// name are deleted without producing a directive, and when a name repeats only its
/// first occurrence is kept. Deleting a tag can join its neighbours into a new tag,
/// so the text is scanned again until none remain.
pub fn extract(text: &str) -> Extraction {
    let mut directives: Vec<LoraDirective> = Vec::new();
    let mut clean_text = text.to_string();

    loop {
        let tags = lora_tags(&clean_text);
        if tags.is_empty() {
            break;
        }

        let mut remaining = String::with_capacity(clean_text.len());
        let mut cursor = 0;
        for span in tags {
            remaining.push_str(&clean_text[cursor..span.start]);
            cursor = span.end;

            let Some(directive) = LoraDirective::parse(tag_body(&clean_text[span])) else {
                continue;
            };
            if !directives.iter().any(|d| d.name == directive.name) {
                directives.push(directive);
            }
        }
        remaining.push_str(&clean_text[cursor..]);
        clean_text = remaining;
    }

    Extraction {
        directives,
        clean_text,
    }
}

/// Split `text` on [`SEGMENT_SEPARATOR`], trimming pieces and dropping empty ones
///
/// The split is a plain case-sensitive substring match. Always returns at least one
/// segment.
pub fn extract_segments(text: &str) -> Vec<String> {
    let segments: Vec<String> = text
        .split(SEGMENT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if segments.is_empty() {
        vec![String::new()]
    } else {
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_removes_tags() {
        let result = extract("a cat <lora:detail:0.8>, sitting");
        assert_eq!(result.clean_text, "a cat , sitting");
        assert_eq!(
            result.directives,
            vec![LoraDirective::new("detail").with_weights(0.8, 0.8)]
        );
    }

    #[test]
    fn test_extract_without_tags() {
        let result = extract("plain <text> here");
        assert_eq!(result.clean_text, "plain <text> here");
        assert!(result.directives.is_empty());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let result = extract("<lora:x:1:1><lora:x:2:2>");
        assert_eq!(result.clean_text, "");
        assert_eq!(
            result.directives,
            vec![LoraDirective::new("x").with_weights(1.0, 1.0)]
        );
    }

    #[test]
    fn test_nameless_tag_removed_silently() {
        let result = extract("a <lora:::> b");
        assert_eq!(result.clean_text, "a  b");
        assert!(result.directives.is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let names: Vec<_> = extract("<lora:b><lora:a><lora:c>")
            .directives
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_second_pass_is_identity() {
        let first = extract("x <lora:a:0.5> y <lora:b> z");
        let second = extract(&first.clean_text);
        assert!(second.directives.is_empty());
        assert_eq!(second.clean_text, first.clean_text);
    }

    #[test]
    fn test_tag_formed_by_removal_is_extracted() {
        let result = extract("a <lo<lora:x>ra:y> b");
        assert_eq!(result.clean_text, "a  b");
        let names: Vec<_> = result.directives.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_segments() {
        assert_eq!(extract_segments("a BREAK b BREAK c"), vec!["a", "b", "c"]);
        assert_eq!(extract_segments("  BREAK  "), vec![""]);
        assert_eq!(extract_segments(""), vec![""]);
        assert_eq!(extract_segments("abreakword"), vec!["abreakword"]);
    }

    #[test]
    fn test_segments_split_inside_words() {
        assert_eq!(extract_segments("outBREAKing news"), vec!["out", "ing news"]);
    }
}
