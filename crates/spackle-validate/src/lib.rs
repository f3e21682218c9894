#![doc = include_str!("../README.md")]

use spackle_diagnostics::{Diagnostic, DiagnosticKind, LineIndex, Severity};
use spackle_repair::lexer::LexDiagnostic;
use spackle_repair::{Lexer, Token, TokenKind};

/// Validate bytes against RFC 8259.
///
/// Returns every violation found, ordered by source position; an empty list
/// means the input conforms. The walker continues past the first violation
/// in panic mode, consuming the offending token and resuming at the nearest
/// structurally meaningful point, so one mistake does not cascade.
#[tracing::instrument(skip_all, fields(input_len = input.len()))]
pub fn validate(input: &[u8]) -> Vec<Diagnostic> {
    let text = match core::str::from_utf8(input) {
        Ok(text) => text,
        Err(e) => {
            let offset = e.valid_up_to();
            let prefix = core::str::from_utf8(&input[..offset]).unwrap_or("");
            let (line, column) = LineIndex::new(prefix).locate(offset);
            return vec![Diagnostic {
                kind: DiagnosticKind::UnexpectedToken,
                severity: Severity::Error,
                line,
                column,
                offset,
                length: 1,
                message: "input is not valid UTF-8".to_string(),
                suggestion: None,
            }];
        }
    };

    let mut walker = Walker::new(Lexer::strict(text));
    walker.walk();
    let Walker {
        mut lexer,
        mut violations,
        ..
    } = walker;

    let mut raw = lexer.take_diagnostics();
    raw.append(&mut violations);
    raw.sort_by_key(|d| d.offset);

    let index = LineIndex::new(text);
    let diagnostics: Vec<Diagnostic> = raw
        .into_iter()
        .map(|d| {
            let (line, column) = index.locate(d.offset);
            Diagnostic {
                kind: d.kind,
                severity: severity_of(d.kind),
                line,
                column,
                offset: d.offset,
                length: d.len,
                message: d.message,
                suggestion: d.suggestion,
            }
        })
        .collect();

    tracing::debug!(count = diagnostics.len(), "strict validation complete");
    diagnostics
}

fn severity_of(kind: DiagnosticKind) -> Severity {
    match kind {
        DiagnosticKind::DuplicateKeyWarning => Severity::Warning,
        _ => Severity::Error,
    }
}

// ── Grammar walker ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrState {
    /// Right after `[`: a value or an immediate `]`.
    FirstValueOrClose,
    /// Right after `,`: a value is mandatory.
    Value,
    CommaOrClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjState {
    /// Right after `{`: a key or an immediate `}`.
    KeyOrClose,
    /// Right after `,`: a key is mandatory.
    Key,
    Colon,
    Value,
    CommaOrClose,
}

struct ArrFrame {
    state: ArrState,
}

struct ObjFrame {
    state: ObjState,
    keys: Vec<String>,
}

enum Frame {
    Array(ArrFrame),
    Object(ObjFrame),
}

struct Walker<'a> {
    lexer: Lexer<'a>,
    violations: Vec<LexDiagnostic>,
}

impl<'a> Walker<'a> {
    fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            violations: Vec::new(),
        }
    }

    fn next(&mut self) -> Token {
        self.lexer.next_token()
    }

    fn report(
        &mut self,
        kind: DiagnosticKind,
        offset: usize,
        len: usize,
        message: String,
        suggestion: Option<&str>,
    ) {
        self.violations.push(LexDiagnostic {
            kind,
            offset,
            len,
            message,
            suggestion: suggestion.map(str::to_string),
        });
    }

    fn unexpected(&mut self, token: &Token, expected: &str, suggestion: Option<&str>) {
        self.report(
            DiagnosticKind::UnexpectedToken,
            token.offset,
            token.len.max(1),
            format!("expected {expected}, found {}", describe(token)),
            suggestion,
        );
    }

    fn eof(&mut self, token: &Token, context: &str) {
        self.report(
            DiagnosticKind::UnexpectedEof,
            token.offset,
            0,
            format!("unexpected end of input {context}"),
            None,
        );
    }

    fn walk(&mut self) {
        let first = self.next();
        if first.kind == TokenKind::Eof {
            self.report(
                DiagnosticKind::UnexpectedEof,
                first.offset,
                0,
                "empty input is not a JSON value".to_string(),
                Some("provide a single JSON value"),
            );
            return;
        }
        if !self.value(first) {
            return;
        }
        let trailing = self.next();
        if trailing.kind != TokenKind::Eof {
            self.report(
                DiagnosticKind::TrailingContent,
                trailing.offset,
                trailing.len,
                "content after the top-level value".to_string(),
                Some("a JSON text holds exactly one value"),
            );
        }
    }

    /// Walk one value. Returns `false` when input ended inside it, which
    /// stops the walk (one `UnexpectedEof` instead of a cascade for every
    /// still-open container).
    #[allow(clippy::too_many_lines, clippy::cognitive_complexity)]
    fn value(&mut self, first: Token) -> bool {
        let mut stack: Vec<Frame> = Vec::new();
        let mut current = Some(first);
        let mut closed = false;

        loop {
            if closed {
                closed = false;
                match stack.pop() {
                    None => return true,
                    Some(Frame::Array(mut frame)) => {
                        frame.state = ArrState::CommaOrClose;
                        stack.push(Frame::Array(frame));
                    }
                    Some(Frame::Object(mut frame)) => {
                        frame.state = ObjState::CommaOrClose;
                        stack.push(Frame::Object(frame));
                    }
                }
                continue;
            }

            let token = match current.take() {
                Some(token) => token,
                None => self.next(),
            };

            let Some(frame) = stack.pop() else {
                // value position at the walk's root
                match token.kind {
                    TokenKind::OpenBrace => stack.push(Frame::Object(ObjFrame {
                        state: ObjState::KeyOrClose,
                        keys: Vec::new(),
                    })),
                    TokenKind::OpenBracket => stack.push(Frame::Array(ArrFrame {
                        state: ArrState::FirstValueOrClose,
                    })),
                    kind if kind.starts_value() => return true,
                    TokenKind::Eof => {
                        self.eof(&token, "where a value was expected");
                        return false;
                    }
                    _ => self.unexpected(&token, "a value", None),
                }
                continue;
            };

            match frame {
                Frame::Array(mut frame) => match frame.state {
                    ArrState::FirstValueOrClose | ArrState::Value => match token.kind {
                        TokenKind::CloseBracket => {
                            if frame.state == ArrState::Value {
                                self.unexpected(
                                    &token,
                                    "a value",
                                    Some("remove the trailing comma"),
                                );
                            }
                            closed = true;
                        }
                        TokenKind::OpenBrace => {
                            stack.push(Frame::Array(frame));
                            stack.push(Frame::Object(ObjFrame {
                                state: ObjState::KeyOrClose,
                                keys: Vec::new(),
                            }));
                        }
                        TokenKind::OpenBracket => {
                            stack.push(Frame::Array(frame));
                            stack.push(Frame::Array(ArrFrame {
                                state: ArrState::FirstValueOrClose,
                            }));
                        }
                        TokenKind::Eof => {
                            self.eof(&token, "inside an array");
                            return false;
                        }
                        TokenKind::CloseBrace => {
                            self.unexpected(&token, "a value or ']'", Some("close the array with ']'"));
                            closed = true;
                        }
                        kind if kind.starts_value() => {
                            frame.state = ArrState::CommaOrClose;
                            stack.push(Frame::Array(frame));
                        }
                        _ => {
                            self.unexpected(&token, "a value", None);
                            stack.push(Frame::Array(frame));
                        }
                    },
                    ArrState::CommaOrClose => match token.kind {
                        TokenKind::Comma => {
                            frame.state = ArrState::Value;
                            stack.push(Frame::Array(frame));
                        }
                        TokenKind::CloseBracket => closed = true,
                        TokenKind::Eof => {
                            self.eof(&token, "inside an array");
                            return false;
                        }
                        TokenKind::CloseBrace => {
                            self.unexpected(&token, "',' or ']'", Some("close the array with ']'"));
                            closed = true;
                        }
                        kind if kind.starts_value() => {
                            self.unexpected(&token, "',' or ']'", Some("insert a comma"));
                            current = Some(token);
                            frame.state = ArrState::Value;
                            stack.push(Frame::Array(frame));
                        }
                        _ => {
                            self.unexpected(&token, "',' or ']'", None);
                            stack.push(Frame::Array(frame));
                        }
                    },
                },
                Frame::Object(mut frame) => match frame.state {
                    ObjState::KeyOrClose | ObjState::Key => match token.kind {
                        TokenKind::String => {
                            if frame.keys.iter().any(|k| *k == token.payload) {
                                self.report(
                                    DiagnosticKind::DuplicateKeyWarning,
                                    token.offset,
                                    token.len,
                                    format!("duplicate key \"{}\"", token.payload),
                                    None,
                                );
                            }
                            frame.keys.push(token.payload);
                            frame.state = ObjState::Colon;
                            stack.push(Frame::Object(frame));
                        }
                        TokenKind::CloseBrace => {
                            if frame.state == ObjState::Key {
                                self.unexpected(
                                    &token,
                                    "a string key",
                                    Some("remove the trailing comma"),
                                );
                            }
                            closed = true;
                        }
                        TokenKind::Eof => {
                            self.eof(&token, "inside an object");
                            return false;
                        }
                        TokenKind::Number
                        | TokenKind::True
                        | TokenKind::False
                        | TokenKind::Null
                        | TokenKind::Identifier => {
                            self.unexpected(
                                &token,
                                "a string key",
                                Some("object keys must be quoted strings"),
                            );
                            // pretend it was a key to keep walking the member
                            frame.state = ObjState::Colon;
                            stack.push(Frame::Object(frame));
                        }
                        TokenKind::CloseBracket => {
                            self.unexpected(&token, "a string key", Some("close the object with '}'"));
                            closed = true;
                        }
                        _ => {
                            self.unexpected(&token, "a string key", None);
                            stack.push(Frame::Object(frame));
                        }
                    },
                    ObjState::Colon => match token.kind {
                        TokenKind::Colon => {
                            frame.state = ObjState::Value;
                            stack.push(Frame::Object(frame));
                        }
                        TokenKind::Eof => {
                            self.eof(&token, "inside an object");
                            return false;
                        }
                        TokenKind::CloseBrace => {
                            self.unexpected(&token, "':'", None);
                            closed = true;
                        }
                        kind if kind.starts_value() => {
                            self.unexpected(&token, "':'", Some("insert a colon after the key"));
                            current = Some(token);
                            frame.state = ObjState::Value;
                            stack.push(Frame::Object(frame));
                        }
                        _ => {
                            self.unexpected(&token, "':'", None);
                            stack.push(Frame::Object(frame));
                        }
                    },
                    ObjState::Value => match token.kind {
                        TokenKind::OpenBrace => {
                            stack.push(Frame::Object(frame));
                            stack.push(Frame::Object(ObjFrame {
                                state: ObjState::KeyOrClose,
                                keys: Vec::new(),
                            }));
                        }
                        TokenKind::OpenBracket => {
                            stack.push(Frame::Object(frame));
                            stack.push(Frame::Array(ArrFrame {
                                state: ArrState::FirstValueOrClose,
                            }));
                        }
                        TokenKind::Eof => {
                            self.eof(&token, "inside an object");
                            return false;
                        }
                        TokenKind::CloseBrace => {
                            self.unexpected(&token, "a value", None);
                            closed = true;
                        }
                        TokenKind::Comma => {
                            self.unexpected(&token, "a value", None);
                            frame.state = ObjState::Key;
                            stack.push(Frame::Object(frame));
                        }
                        kind if kind.starts_value() => {
                            frame.state = ObjState::CommaOrClose;
                            stack.push(Frame::Object(frame));
                        }
                        _ => {
                            self.unexpected(&token, "a value", None);
                            stack.push(Frame::Object(frame));
                        }
                    },
                    ObjState::CommaOrClose => match token.kind {
                        TokenKind::Comma => {
                            frame.state = ObjState::Key;
                            stack.push(Frame::Object(frame));
                        }
                        TokenKind::CloseBrace => closed = true,
                        TokenKind::Eof => {
                            self.eof(&token, "inside an object");
                            return false;
                        }
                        TokenKind::CloseBracket => {
                            self.unexpected(&token, "',' or '}'", Some("close the object with '}'"));
                            closed = true;
                        }
                        kind if kind.starts_value() => {
                            self.unexpected(&token, "',' or '}'", Some("insert a comma"));
                            current = Some(token);
                            frame.state = ObjState::Key;
                            stack.push(Frame::Object(frame));
                        }
                        _ => {
                            self.unexpected(&token, "',' or '}'", None);
                            stack.push(Frame::Object(frame));
                        }
                    },
                },
            }
        }
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::OpenBrace => "'{'".to_string(),
        TokenKind::CloseBrace => "'}'".to_string(),
        TokenKind::OpenBracket => "'['".to_string(),
        TokenKind::CloseBracket => "']'".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::Colon => "':'".to_string(),
        TokenKind::String => "a string".to_string(),
        TokenKind::Number => "a number".to_string(),
        TokenKind::True => "'true'".to_string(),
        TokenKind::False => "'false'".to_string(),
        TokenKind::Null => "'null'".to_string(),
        TokenKind::Identifier => format!("'{}'", token.payload),
        TokenKind::Eof => "end of input".to_string(),
    }
}
