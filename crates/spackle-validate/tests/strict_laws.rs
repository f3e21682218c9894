//! The contract between the repairer and the validator: whatever bytes go
//! in, the repaired text must validate cleanly (duplicate-key warnings
//! excepted, since duplicates are deliberately preserved).

use spackle_diagnostics::Severity;
use spackle_repair::{RepairOptions, fix};
use spackle_validate::validate;

const BROKEN_CORPUS: &[&str] = &[
    "",
    "   \n\t ",
    "\"hello\"",
    "42",
    "-0",
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
    "{\"deep\": [[[[[[[[[[1]]]]]]]]]]}",
];

#[test]
fn every_repaired_output_validates() {
    let options = RepairOptions::default();
    for input in BROKEN_CORPUS {
        let repaired = fix(input.as_bytes(), &options);
        let errors: Vec<_> = validate(repaired.text.as_bytes())
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert!(
            errors.is_empty(),
            "repaired output of {input:?} does not validate: {errors:#?}\noutput was: {}",
            repaired.text
        );
    }
}

#[test]
fn minified_outputs_validate_too() {
    let options = RepairOptions::minified();
    for input in BROKEN_CORPUS {
        let repaired = fix(input.as_bytes(), &options);
        let errors: Vec<_> = validate(repaired.text.as_bytes())
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert!(
            errors.is_empty(),
            "minified output of {input:?} does not validate: {errors:#?}"
        );
    }
}

#[test]
fn validated_inputs_are_untouched_by_fix() {
    for input in [
        "{\"a\": 1}",
        "[1, 2, 3]",
        "\"scalar\"",
        "{\"nested\": {\"list\": [true, null]}}",
    ] {
        assert!(validate(input.as_bytes()).is_empty());
        let repaired = fix(input.as_bytes(), &RepairOptions::default());
        assert!(!repaired.was_fixed, "{input:?} was reported as fixed");
    }
}
