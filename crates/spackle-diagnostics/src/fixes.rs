use serde::Serialize;

/// The closed set of repairs the engine can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FixKind {
    TrailingComma,
    MissingComma,
    MissingColon,
    UnterminatedString,
    UnterminatedObject,
    UnterminatedArray,
    MismatchedCloser,
    MissingOpenBracket,
    SingleQuotedString,
    UnquotedKey,
    NormalizedLiteral,
    NormalizedNumber,
    InvalidEscape,
    LoneSurrogate,
    UnescapedControl,
    CommentRemoved,
    BomRemoved,
    MultipleRoots,
    InfinityOrNanToNull,
    DuplicateKey,
    UndefinedToNull,
}

impl FixKind {
    /// Default human-readable description, built from the affected slices.
    fn describe(self, before: &str, after: &str) -> String {
        match self {
            Self::TrailingComma => "removed trailing comma".to_string(),
            Self::MissingComma => "inserted missing comma".to_string(),
            Self::MissingColon => "inserted missing colon".to_string(),
            Self::UnterminatedString => "added missing closing quote".to_string(),
            Self::UnterminatedObject => "closed unterminated object".to_string(),
            Self::UnterminatedArray => "closed unterminated array".to_string(),
            Self::MismatchedCloser => {
                format!("recovered from mismatched closing delimiter '{before}'")
            }
            Self::MissingOpenBracket => {
                "wrapped comma-separated values in a missing array".to_string()
            }
            Self::SingleQuotedString => "replaced single quotes with double quotes".to_string(),
            Self::UnquotedKey => format!("added quotes around {after}"),
            Self::NormalizedLiteral => format!("rewrote '{before}' as {after}"),
            Self::NormalizedNumber => format!("rewrote number '{before}' as {after}"),
            Self::InvalidEscape => format!("replaced invalid escape '{before}' with U+FFFD"),
            Self::LoneSurrogate => format!("replaced lone surrogate '{before}' with U+FFFD"),
            Self::UnescapedControl => "escaped raw control character in string".to_string(),
            Self::CommentRemoved => "removed comment".to_string(),
            Self::BomRemoved => "removed byte order mark".to_string(),
            Self::MultipleRoots => "wrapped multiple top-level values in an array".to_string(),
            Self::InfinityOrNanToNull => format!("replaced '{before}' with null"),
            Self::DuplicateKey => format!("kept duplicate key {before}"),
            Self::UndefinedToNull => "replaced undefined with null".to_string(),
        }
    }
}

/// One applied repair, located in the original input.
///
/// `before` and `after` are the affected source slice and its replacement;
/// either may be empty (pure insertions and pure removals). `message` is
/// suitable for a "what changed" panel; the rest is machine-readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixRecord {
    pub kind: FixKind,
    pub line: usize,
    pub column: usize,
    pub before: String,
    pub after: String,
    pub message: String,
}

impl FixRecord {
    pub fn new(kind: FixKind, line: usize, column: usize, before: String, after: String) -> Self {
        let message = format!(
            "line {line}, column {column}: {}",
            kind.describe(&before, &after)
        );
        Self {
            kind,
            line,
            column,
            before,
            after,
            message,
        }
    }

    /// Like [`FixRecord::new`], but with a caller-supplied description for
    /// fixes whose default wording does not apply (e.g. NDJSON wrapping).
    pub fn with_description(
        kind: FixKind,
        line: usize,
        column: usize,
        before: String,
        after: String,
        description: &str,
    ) -> Self {
        Self {
            kind,
            line,
            column,
            before,
            after,
            message: format!("line {line}, column {column}: {description}"),
        }
    }
}
