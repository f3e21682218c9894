use serde::{Deserialize, Serialize};

/// Output configuration for the repair pass.
///
/// All fields use `#[serde(default)]` so that partial configs are filled in
/// with defaults automatically; field names serialize as camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepairOptions {
    /// How to indent the emitted JSON.
    pub indent: Indent,

    /// Escape every non-ASCII scalar in strings as `\uXXXX` (scalars above
    /// the BMP become surrogate pairs). When off, strings are emitted as
    /// UTF-8 and only the mandatory escapes are applied.
    pub ensure_ascii: bool,

    /// Wrap multiple top-level values in a synthetic array. When off, the
    /// first value wins and the rest are dropped (a fix records the loss).
    pub wrap_multiple_roots: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            indent: Indent::Spaces(2),
            ensure_ascii: false,
            wrap_multiple_roots: true,
        }
    }
}

impl RepairOptions {
    /// Options producing minified output: no whitespace between tokens.
    pub fn minified() -> Self {
        Self {
            indent: Indent::None,
            ..Self::default()
        }
    }
}

/// Indentation scheme for emitted JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Indent {
    /// No whitespace between tokens.
    None,
    /// One member or element per line, indented by `n` spaces per depth.
    Spaces(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_two_space_utf8_wrapping() {
        let options = RepairOptions::default();
        assert_eq!(options.indent, Indent::Spaces(2));
        assert!(!options.ensure_ascii);
        assert!(options.wrap_multiple_roots);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let options: RepairOptions =
            serde_json::from_str(r#"{"ensureAscii": true}"#).expect("deserialize");
        assert!(options.ensure_ascii);
        assert_eq!(options.indent, Indent::Spaces(2));
    }

    #[test]
    fn indent_round_trips_through_serde() {
        let json = serde_json::to_string(&Indent::Spaces(4)).expect("serialize");
        let back: Indent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Indent::Spaces(4));
    }
}
