use pretty_assertions::assert_eq;
use spackle_diagnostics::FixKind;
use spackle_repair::{FixResult, RepairOptions, fix, parse};

fn fix_default(input: &str) -> FixResult {
    fix(input.as_bytes(), &RepairOptions::default())
}

fn kinds(result: &FixResult) -> Vec<FixKind> {
    result.detailed_fixes.iter().map(|f| f.kind).collect()
}

/// A spread of broken inputs covering every repair the engine applies.
const BROKEN_CORPUS: &[&str] = &[
    "",
    "   \n\t ",
    "\"hello\"",
    "42",
    "-0",
    "null",
    "{\"n\": +123}",
    "{\"a\":1 \"b\":2}",
    "{\"coordinates\": -0.1695, 51.4865]}",
    "{\"a\":1}{\"b\":2}",
    "{\"a\":1}\n{\"b\":2}\n",
    "{\"emoji\":\"\\uD83D\\uDE00\"}",
    "{\"s\":\"bad \\u12Z4\"}",
    "{'single': 'quotes'}",
    "{key: \"value\"}",
    "{\"t\": tru, \"f\": FALSE, \"n\": NUL}",
    "{\"x\": tr ue}",
    "{\"u\": undefined, \"nil\": nil}",
    "{\"inf\": Infinity, \"ninf\": -Infinity, \"nan\": NaN}",
    "{\"hex\": 0x1F, \"oct\": 0123, \"lead\": 007}",
    "{\"frac\": .5, \"dot\": 42.}",
    "[1, 2, 3,]",
    "[1,,2]",
    "{\"a\": 1,}",
    "{\"a\": [1, {\"b\": 2",
    "{\"a\": [1, 2}",
    "\"unterminated",
    "{\"ctrl\": \"a\tb\"}",
    "// leading comment\n{\"a\": 1}",
    "/* block */ {\"a\": 1} /* tail",
    "\u{feff}{\"bom\": true}",
    "{\"dup\": 1, \"dup\": 2}",
    "{\"a\"}",
    "{\"a\":}",
    "{1: 2}",
    "{\"v\": bare}",
    "{\"lone\": \"\\uD800\"}",
    "1, 2, 3",
];

// --- end-to-end scenarios ---

#[test]
fn normalizes_plus_signed_number() {
    let result = fix_default("{\"n\": +123}");
    assert_eq!(result.text, "{\n  \"n\": 123\n}");
    assert!(kinds(&result).contains(&FixKind::NormalizedNumber));
}

#[test]
fn inserts_missing_comma() {
    let result = fix_default("{\"a\":1 \"b\":2}");
    assert_eq!(result.text, "{\n  \"a\": 1,\n  \"b\": 2\n}");
    assert!(kinds(&result).contains(&FixKind::MissingComma));
}

#[test]
fn wraps_value_run_in_missing_array() {
    let result = fix_default("{\"coordinates\": -0.1695, 51.4865]}");
    assert_eq!(
        result.text,
        "{\n  \"coordinates\": [\n    -0.1695,\n    51.4865\n  ]\n}"
    );
    assert!(kinds(&result).contains(&FixKind::MissingOpenBracket));
}

#[test]
fn wraps_multiple_roots() {
    let result = fix_default("{\"a\":1}{\"b\":2}");
    assert_eq!(
        result.text,
        "[\n  {\n    \"a\": 1\n  },\n  {\n    \"b\": 2\n  }\n]"
    );
    assert!(kinds(&result).contains(&FixKind::MultipleRoots));
}

#[test]
fn terminated_string_in_final_byte_is_not_flagged() {
    // regression guard: a closing quote in the last byte position must not
    // report UnterminatedString
    let result = fix_default("\"hello\"");
    assert_eq!(result.text, "\"hello\"");
    assert!(!result.was_fixed);
    assert!(result.fixes.is_empty());
}

#[test]
fn surrogate_pair_round_trips_to_one_scalar() {
    let result = fix_default("{\"emoji\":\"\\uD83D\\uDE00\"}");
    assert_eq!(result.text, "{\n  \"emoji\": \"\u{1F600}\"\n}");
    assert!(result.fixes.is_empty());
    assert!(!result.was_fixed);
}

#[test]
fn invalid_escape_becomes_replacement_char() {
    let result = fix_default("{\"s\":\"bad \\u12Z4\"}");
    assert_eq!(result.text, "{\n  \"s\": \"bad \u{fffd}\"\n}");
    assert!(kinds(&result).contains(&FixKind::InvalidEscape));
}

// --- boundary behaviors ---

#[test]
fn empty_input_yields_null() {
    let result = fix_default("");
    assert_eq!(result.text, "null");
    assert!(result.fixes.is_empty());
    assert!(!result.was_fixed);
}

#[test]
fn whitespace_only_input_yields_null() {
    let result = fix_default("  \n \t ");
    assert_eq!(result.text, "null");
    assert!(result.fixes.is_empty());
    assert!(!result.was_fixed);
}

#[test]
fn standalone_scalars_accepted() {
    for input in ["\"s\"", "42", "true", "null"] {
        let result = fix_default(input);
        assert_eq!(result.text, input);
        assert!(!result.was_fixed, "{input} should need no repair");
    }
}

#[test]
fn thousand_deep_nesting_survives() {
    let input = format!("{}1{}", "[".repeat(1000), "]".repeat(1000));
    let result = fix(input.as_bytes(), &RepairOptions::minified());
    assert_eq!(result.text, input);
    assert!(!result.was_fixed);
}

#[test]
fn thousand_deep_unterminated_nesting_survives() {
    let input = "[".repeat(1500);
    let result = fix(input.as_bytes(), &RepairOptions::minified());
    assert!(result.was_fixed);
    assert_eq!(result.text.matches('[').count(), 1500);
    assert_eq!(result.text.matches(']').count(), 1500);
}

// --- universal laws over the corpus ---

#[test]
fn fix_is_idempotent_over_corpus() {
    for input in BROKEN_CORPUS {
        let first = fix_default(input);
        let second = fix_default(&first.text);
        assert_eq!(
            second.text, first.text,
            "second pass changed bytes for {input:?}"
        );
        assert!(
            !second.was_fixed,
            "second pass reported repairs for {input:?}: {:?}",
            second.fixes
        );
    }
}

#[test]
fn fix_is_deterministic() {
    for input in BROKEN_CORPUS {
        let a = fix_default(input);
        let b = fix_default(input);
        assert_eq!(a.text, b.text);
        assert_eq!(a.fixes, b.fixes);
    }
}

#[test]
fn valid_input_is_structurally_preserved() {
    let valid = [
        "{\"a\": 1, \"b\": [true, false, null]}",
        "[0.5, -0, 1e10, 9007199254740993]",
        "{\"nested\": {\"deep\": [{\"x\": \"y\"}]}}",
        "\"plain\"",
        "{\"dup\": 1, \"dup\": 2}",
    ];
    for input in valid {
        let fixed = fix_default(input);
        assert_eq!(
            parse(fixed.text.as_bytes()),
            parse(input.as_bytes()),
            "structure changed for {input:?}"
        );
    }
}

#[test]
fn fix_list_is_ordered_by_source_position() {
    for input in BROKEN_CORPUS {
        let result = fix_default(input);
        let positions: Vec<(usize, usize)> = result
            .detailed_fixes
            .iter()
            .map(|f| (f.line, f.column))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "out-of-order fixes for {input:?}");
    }
}

// --- rendered output snapshots ---

#[test]
fn comment_heavy_input_renders_cleanly() {
    let input = "// config\n{\n  \"port\": 8080, // default\n  /* todo */ \"host\": 'localhost',\n}";
    let result = fix_default(input);
    insta::assert_snapshot!(result.text, @r#"
    {
      "port": 8080,
      "host": "localhost"
    }
    "#);
}

#[test]
fn kitchen_sink_renders_cleanly() {
    let input = "{n: .5, 'list': [1 2,], \"flag\": TRUE, \"drop\": Infinity";
    let result = fix_default(input);
    insta::assert_snapshot!(result.text, @r#"
    {
      "n": 0.5,
      "list": [
        1,
        2
      ],
      "flag": true,
      "drop": null
    }
    "#);
}

#[test]
fn minified_and_indent_widths() {
    let input = "{\"a\": [1, 2]}";
    let minified = fix(input.as_bytes(), &RepairOptions::minified());
    assert_eq!(minified.text, "{\"a\":[1,2]}");

    let four = fix(
        input.as_bytes(),
        &RepairOptions {
            indent: spackle_repair::Indent::Spaces(4),
            ..RepairOptions::default()
        },
    );
    assert_eq!(four.text, "{\n    \"a\": [\n        1,\n        2\n    ]\n}");
}

#[test]
fn ensure_ascii_end_to_end() {
    let result = fix(
        "{\"emoji\":\"\\uD83D\\uDE00\"}".as_bytes(),
        &RepairOptions {
            ensure_ascii: true,
            ..RepairOptions::default()
        },
    );
    assert_eq!(result.text, "{\n  \"emoji\": \"\\uD83D\\uDE00\"\n}");
    assert!(!result.was_fixed);
}
