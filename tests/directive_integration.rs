//! Integration tests for directive extraction

use lumi_pack::{extract, extract_segments, process_prompt, LoaderKind, LoraDirective};
use pretty_assertions::assert_eq;

#[test]
fn test_appended_tag_round_trips() {
    let clean = "portrait of a knight, dramatic light";
    let block_weighted = LoraDirective {
        block_preset: Some("1,0,0,1".to_string()),
        block_a: Some(0.5),
        block_b: Some(0.25),
        ..LoraDirective::new("knight")
    };
    let nunchaku = LoraDirective {
        loader: Some(LoaderKind::Nunchaku),
        ..LoraDirective::new("knight").with_weights(0.9, 0.9)
    };
    let cases = [
        ("<lora:knight:0.7>", LoraDirective::new("knight").with_weights(0.7, 0.7)),
        ("<lora:knight:0.7:0.3>", LoraDirective::new("knight").with_weights(0.7, 0.3)),
        ("<lora:knight:LBW=1,0,0,1;A=0.5;B=0.25>", block_weighted),
        ("<lora:knight:0.9:LOADER=nunchaku>", nunchaku),
    ];

    for (tag, expected) in cases {
        let result = extract(&format!("{clean}{tag}"));
        assert_eq!(result.clean_text, clean);
        assert_eq!(result.directives, vec![expected.clone()]);

        // The rendered form parses back to the same record
        let rendered = extract(&expected.to_string());
        assert_eq!(rendered.directives, vec![expected]);
    }
}

#[test]
fn test_fields_in_any_order() {
    let result = extract("<lora:x:LOADER=nunchaku:LBW=MIDD;A=2:0.4:0.2>");
    let directive = &result.directives[0];
    assert_eq!(directive.loader, Some(LoaderKind::Nunchaku));
    assert_eq!(directive.block_preset.as_deref(), Some("MIDD"));
    assert_eq!(directive.block_a, Some(2.0));
    assert_eq!((directive.model_weight, directive.clip_weight), (0.4, 0.2));
}

#[test]
fn test_extraction_is_idempotent() {
    let text = "a <lora:a:1> b <lora:b:0.5:0.5> c <lora::> <lora:a:9>";
    let once = extract(text);
    let twice = extract(&once.clean_text);
    assert_eq!(once.directives.len(), 2);
    assert!(twice.directives.is_empty());
    assert_eq!(twice.clean_text, once.clean_text);

    let joined = "a <lo<lora:x>ra:y> b";
    let once = extract(joined);
    let twice = extract(&once.clean_text);
    assert_eq!(once.directives.len(), 2);
    assert!(twice.directives.is_empty());
    assert_eq!(twice.clean_text, once.clean_text);
}

#[test]
fn test_duplicate_names_keep_first() {
    let result = extract("<lora:x:1:1><lora:x:2:2>");
    assert_eq!(
        result.directives,
        vec![LoraDirective::new("x").with_weights(1.0, 1.0)]
    );
}

#[test]
fn test_segment_rules() {
    assert_eq!(extract_segments("a BREAK b BREAK c"), vec!["a", "b", "c"]);
    assert_eq!(extract_segments("  BREAK  "), vec![""]);
    assert_eq!(extract_segments("abreakword"), vec!["abreakword"]);
    assert_eq!(extract_segments("one\nBREAK\ntwo"), vec!["one", "two"]);
}

#[test]
fn test_pipeline_summary() {
    let prompt = process_prompt(
        "<lora:ink:0.6> sketch BREAK {night|night} sky <lora:glow:LBW=OUTD>",
        5,
        &lumi_pack::Collections::new(),
    );
    let summary = prompt
        .directives
        .iter()
        .map(ToString::to_string)
        .chain(prompt.segments.iter().map(|s| format!("[{s}]")))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(summary, @r###"
    <lora:ink:0.6:0.6>
    <lora:glow:1:1:LBW=OUTD>
    [sketch]
    [night sky]
    "###);
}
