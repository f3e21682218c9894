use miette::{NamedSource, SourceSpan};
use serde::Serialize;
use thiserror::Error;

/// What the strict validator found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnexpectedToken,
    UnexpectedEof,
    InvalidNumber,
    InvalidEscape,
    ControlCharInString,
    LoneSurrogate,
    DuplicateKeyWarning,
    TrailingContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single strict-mode violation with its exact source location.
///
/// `offset`/`length` delimit the offending byte slice; `line`/`column` are
/// 1-based and derived from the same offset, so the slice is always contained
/// in the reported line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Render this diagnostic as a miette report over the named source.
    pub fn to_report(&self, file_name: &str, source: &str) -> StrictViolation {
        StrictViolation {
            src: NamedSource::new(file_name, source.to_string()),
            span: (self.offset, self.length.max(1)).into(),
            message: self.message.clone(),
            help: self.suggestion.clone(),
        }
    }
}

/// miette-renderable form of a [`Diagnostic`].
#[derive(Debug, Error, miette::Diagnostic)]
#[error("{message}")]
#[diagnostic(code(spackle::strict))]
pub struct StrictViolation {
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
    pub message: String,
    #[help]
    pub help: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::UnexpectedToken,
            severity: Severity::Error,
            line: 1,
            column: 8,
            offset: 7,
            length: 1,
            message: "unexpected token ';'".to_string(),
            suggestion: None,
        }
    }

    #[test]
    fn report_code() {
        use miette::Diagnostic as _;

        let report = sample().to_report("test.json", "{\"a\": 1;}");
        assert_eq!(
            report.code().expect("missing diagnostic code").to_string(),
            "spackle::strict"
        );
    }

    #[test]
    fn report_span_matches_offsets() {
        let report = sample().to_report("test.json", "{\"a\": 1;}");
        assert_eq!(report.span.offset(), 7);
        assert_eq!(report.span.len(), 1);
    }

    #[test]
    fn zero_length_spans_render_one_byte() {
        let mut diag = sample();
        diag.length = 0;
        let report = diag.to_report("test.json", "{\"a\": 1;}");
        assert_eq!(report.span.len(), 1);
    }

    #[test]
    fn suggestion_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert!(json.get("suggestion").is_none());
        assert_eq!(json["severity"], "error");
        assert_eq!(json["kind"], "unexpectedToken");
    }
}
