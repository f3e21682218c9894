use spackle_diagnostics::DiagnosticKind;
use spackle_diagnostics::FixKind;

use crate::RawFix;
use crate::emit;
use crate::token::{RecoveryFlags, Token, TokenKind};

/// Tokenizer mode. One state machine serves both: the mode bit only toggles
/// whether tolerant-only productions are accepted silently or diagnosed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tolerant,
    Strict,
}

/// A strict-mode violation observed during tokenization, in byte offsets.
#[derive(Debug, Clone)]
pub struct LexDiagnostic {
    pub kind: DiagnosticKind,
    pub offset: usize,
    pub len: usize,
    pub message: String,
    pub suggestion: Option<String>,
}

/// The tolerant/strict tokenizer.
///
/// Produces one token per call to [`Lexer::next_token`], never reading past
/// what it must to classify the current token. In tolerant mode it never
/// fails: deviant lexemes come back with recovery flags set and a fix
/// recorded. In strict mode the same deviations are pushed onto the
/// diagnostic list instead.
pub struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    mode: Mode,
    pub(crate) fixes: Vec<RawFix>,
    diagnostics: Vec<LexDiagnostic>,
    pub(crate) skipped_garbage: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_mode(text, Mode::Tolerant)
    }

    pub fn strict(text: &'a str) -> Self {
        Self::with_mode(text, Mode::Strict)
    }

    fn with_mode(text: &'a str, mode: Mode) -> Self {
        // In strict mode a leading BOM is ignored (RFC 8259 §8.1 permits
        // this); tolerant input arrives pre-cleaned.
        let pos = if mode == Mode::Strict && text.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        Self {
            text,
            bytes: text.as_bytes(),
            pos,
            mode,
            fixes: Vec::new(),
            diagnostics: Vec::new(),
            skipped_garbage: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn text(&self) -> &'a str {
        self.text
    }

    pub fn diagnostics(&self) -> &[LexDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<LexDiagnostic> {
        core::mem::take(&mut self.diagnostics)
    }

    // ── Cursor helpers ──────────────────────────────────────────────────

    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..).and_then(|rest| rest.chars().next())
    }

    fn record(&mut self, kind: FixKind, offset: usize, before: &str, after: &str) {
        if self.mode == Mode::Tolerant {
            self.fixes.push(RawFix::new(
                kind,
                offset,
                before.to_string(),
                after.to_string(),
            ));
        }
    }

    fn diagnose(
        &mut self,
        kind: DiagnosticKind,
        offset: usize,
        len: usize,
        message: impl Into<String>,
        suggestion: Option<&str>,
    ) {
        if self.mode == Mode::Strict {
            self.diagnostics.push(LexDiagnostic {
                kind,
                offset,
                len,
                message: message.into(),
                suggestion: suggestion.map(str::to_string),
            });
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.byte_at(self.pos) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ if b < 0x80 => break,
                _ => {
                    let Some(c) = self.char_at(self.pos) else { break };
                    if !c.is_whitespace() {
                        break;
                    }
                    // Exotic whitespace (NBSP, U+2028, ...) is tolerated
                    // between tokens but violates the RFC 8259 grammar.
                    self.diagnose(
                        DiagnosticKind::UnexpectedToken,
                        self.pos,
                        c.len_utf8(),
                        format!("whitespace U+{:04X} is not allowed in JSON", c as u32),
                        Some("only space, tab, line feed, and carriage return separate tokens"),
                    );
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    // ── Token production ────────────────────────────────────────────────

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(b) = self.byte_at(start) else {
                return Token::eof(start);
            };
            match b {
                b'{' => return self.structural(TokenKind::OpenBrace),
                b'}' => return self.structural(TokenKind::CloseBrace),
                b'[' => return self.structural(TokenKind::OpenBracket),
                b']' => return self.structural(TokenKind::CloseBracket),
                b',' => return self.structural(TokenKind::Comma),
                b':' => return self.structural(TokenKind::Colon),
                b'"' => return self.string_token(start, '"'),
                b'\'' => {
                    self.diagnose(
                        DiagnosticKind::UnexpectedToken,
                        start,
                        1,
                        "strings must use double quotes",
                        Some("replace ' with \""),
                    );
                    return self.string_token(start, '\'');
                }
                b'-' | b'+' | b'.' | b'0'..=b'9' => {
                    if let Some(token) = self.number_token(start) {
                        return token;
                    }
                    // the lexeme had no digits after all; it was dropped
                }
                _ if is_ident_start(b) => return self.identifier_token(start),
                _ => {
                    // coalesce a run of unrecognizable bytes into one skip
                    let mut end = start + self.char_at(start).map_or(1, char::len_utf8);
                    while let Some(c) = self.char_at(end) {
                        if c.is_whitespace() || is_token_start(c) {
                            break;
                        }
                        end += c.len_utf8();
                    }
                    self.diagnose(
                        DiagnosticKind::UnexpectedToken,
                        start,
                        end - start,
                        format!("unexpected characters {:?}", &self.text[start..end]),
                        None,
                    );
                    self.skipped_garbage += 1;
                    self.pos = end;
                }
            }
        }
    }

    fn structural(&mut self, kind: TokenKind) -> Token {
        let token = Token::structural(kind, self.pos);
        self.pos += 1;
        token
    }

    // ── Strings ─────────────────────────────────────────────────────────

    fn string_token(&mut self, start: usize, quote: char) -> Token {
        let mut flags = RecoveryFlags::default();
        if quote == '\'' {
            flags.used_single_quotes = true;
        }
        self.pos += 1;
        let mut payload = String::new();

        // Termination is decided solely by seeing the closing quote, never
        // by the cursor reaching end-of-input: a string whose closing quote
        // is the final byte is well-terminated.
        let mut found_closing_quote = false;

        while let Some(c) = self.char_at(self.pos) {
            if c == quote {
                self.pos += 1;
                found_closing_quote = true;
                break;
            }
            if c == '\\' {
                self.escape_sequence(&mut payload, &mut flags, quote);
                continue;
            }
            if (c as u32) < 0x20 {
                flags.had_control_char = true;
                self.diagnose(
                    DiagnosticKind::ControlCharInString,
                    self.pos,
                    c.len_utf8(),
                    format!("raw control character U+{:04X} in string", c as u32),
                    Some("escape it as \\uXXXX"),
                );
                self.record(
                    FixKind::UnescapedControl,
                    self.pos,
                    &self.text[self.pos..self.pos + c.len_utf8()],
                    &emit::escape_fragment(&c.to_string()),
                );
                payload.push(c);
                self.pos += c.len_utf8();
                continue;
            }
            payload.push(c);
            self.pos += c.len_utf8();
        }

        if !found_closing_quote {
            flags.was_unterminated = true;
            self.record(FixKind::UnterminatedString, start, &self.text[start..self.pos], "");
            self.diagnose(
                DiagnosticKind::UnexpectedEof,
                self.pos,
                0,
                "unterminated string",
                Some("add a closing \""),
            );
        }
        if flags.used_single_quotes {
            self.record(FixKind::SingleQuotedString, start, &self.text[start..self.pos], "");
        }

        Token {
            kind: TokenKind::String,
            offset: start,
            len: self.pos - start,
            payload,
            flags,
        }
    }

    fn escape_sequence(&mut self, payload: &mut String, flags: &mut RecoveryFlags, quote: char) {
        let esc_start = self.pos;
        self.pos += 1;
        let Some(c) = self.char_at(self.pos) else {
            // lone backslash at end of input; the unterminated-string repair
            // covers the rest
            flags.had_invalid_escape = true;
            self.record(FixKind::InvalidEscape, esc_start, "\\", "\u{fffd}");
            self.diagnose(
                DiagnosticKind::InvalidEscape,
                esc_start,
                1,
                "incomplete escape sequence",
                None,
            );
            payload.push('\u{fffd}');
            return;
        };
        match c {
            '"' | '\\' | '/' => {
                payload.push(c);
                self.pos += 1;
            }
            'b' => {
                payload.push('\u{0008}');
                self.pos += 1;
            }
            'f' => {
                payload.push('\u{000C}');
                self.pos += 1;
            }
            'n' => {
                payload.push('\n');
                self.pos += 1;
            }
            'r' => {
                payload.push('\r');
                self.pos += 1;
            }
            't' => {
                payload.push('\t');
                self.pos += 1;
            }
            'u' => {
                self.pos += 1;
                self.unicode_escape(esc_start, payload, flags);
            }
            '\'' if quote == '\'' => {
                // escaped quote inside a single-quoted string; subsumed by
                // the quote repair itself
                payload.push('\'');
                self.pos += 1;
            }
            other => {
                self.pos += other.len_utf8();
                flags.had_invalid_escape = true;
                let lexeme = &self.text[esc_start..self.pos];
                self.record(FixKind::InvalidEscape, esc_start, lexeme, "\u{fffd}");
                self.diagnose(
                    DiagnosticKind::InvalidEscape,
                    esc_start,
                    self.pos - esc_start,
                    format!("invalid escape sequence '{lexeme}'"),
                    None,
                );
                payload.push('\u{fffd}');
            }
        }
    }

    fn unicode_escape(&mut self, esc_start: usize, payload: &mut String, flags: &mut RecoveryFlags) {
        let Some(unit) = self.hex4() else {
            flags.had_invalid_escape = true;
            let lexeme = &self.text[esc_start..self.pos];
            self.record(FixKind::InvalidEscape, esc_start, lexeme, "\u{fffd}");
            self.diagnose(
                DiagnosticKind::InvalidEscape,
                esc_start,
                self.pos - esc_start,
                format!("invalid unicode escape '{lexeme}'"),
                Some("\\u must be followed by four hex digits"),
            );
            payload.push('\u{fffd}');
            return;
        };

        if (0xD800..0xDC00).contains(&unit) {
            // high surrogate: compose with a following \uLOW when present
            let save = self.pos;
            if self.char_at(self.pos) == Some('\\') && self.char_at(self.pos + 1) == Some('u') {
                self.pos += 2;
                if let Some(low) = self.hex4() {
                    if (0xDC00..0xE000).contains(&low) {
                        let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                        if let Some(c) = char::from_u32(scalar) {
                            payload.push(c);
                            return;
                        }
                    }
                }
                // not a low surrogate: let the second escape lex on its own
                self.pos = save;
            }
            self.lone_surrogate(esc_start, payload, flags);
        } else if (0xDC00..0xE000).contains(&unit) {
            self.lone_surrogate(esc_start, payload, flags);
        } else if let Some(c) = char::from_u32(unit) {
            payload.push(c);
        }
    }

    fn lone_surrogate(&mut self, esc_start: usize, payload: &mut String, flags: &mut RecoveryFlags) {
        flags.had_lone_surrogate = true;
        let lexeme = &self.text[esc_start..self.pos];
        self.record(FixKind::LoneSurrogate, esc_start, lexeme, "\u{fffd}");
        self.diagnose(
            DiagnosticKind::LoneSurrogate,
            esc_start,
            self.pos - esc_start,
            format!("lone surrogate '{lexeme}'"),
            Some("surrogates must appear in high/low pairs"),
        );
        payload.push('\u{fffd}');
    }

    /// Read exactly four hex digits. On failure, consume the offending
    /// characters (still at most four, stopping at quotes, backslashes, and
    /// control characters) and return `None`.
    fn hex4(&mut self) -> Option<u32> {
        let mut value = 0u32;
        let mut valid = true;
        for _ in 0..4 {
            match self.char_at(self.pos) {
                Some(c) if c.is_ascii_hexdigit() => {
                    value = value * 16 + c.to_digit(16).unwrap_or(0);
                    self.pos += c.len_utf8();
                }
                Some(c) if c != '"' && c != '\'' && c != '\\' && (c as u32) >= 0x20 => {
                    self.pos += c.len_utf8();
                    valid = false;
                }
                _ => return None,
            }
        }
        valid.then_some(value)
    }

    // ── Numbers ─────────────────────────────────────────────────────────

    /// Lex a number starting at `start`. Returns `None` when the lexeme
    /// turned out to contain no digits at all (a stray sign or dot), which
    /// the caller drops.
    #[allow(clippy::too_many_lines, clippy::cognitive_complexity)]
    fn number_token(&mut self, start: usize) -> Option<Token> {
        let mut pos = start;
        let mut flags = RecoveryFlags::default();

        if matches!(self.byte_at(pos), Some(b'-' | b'+')) {
            pos += 1;
        }

        // signed Infinity / NaN reach us through the sign; bare ones come in
        // through the identifier path
        if self.byte_at(pos).is_some_and(|b| b.is_ascii_alphabetic()) {
            let mut end = pos;
            while self.byte_at(end).is_some_and(|b| b.is_ascii_alphabetic()) {
                end += 1;
            }
            let word = &self.text[pos..end];
            self.pos = end;
            let lexeme = &self.text[start..end];
            if word.eq_ignore_ascii_case("infinity") || word.eq_ignore_ascii_case("nan") {
                flags.normalized_number = true;
                self.record(FixKind::InfinityOrNanToNull, start, lexeme, "null");
                self.diagnose(
                    DiagnosticKind::InvalidNumber,
                    start,
                    end - start,
                    format!("'{lexeme}' is not a JSON number"),
                    Some("no JSON number can represent it; it becomes null"),
                );
                return Some(Token {
                    kind: TokenKind::Null,
                    offset: start,
                    len: end - start,
                    payload: String::new(),
                    flags,
                });
            }
            // a sign stuck to some other word: hand it back as bare text
            self.diagnose(
                DiagnosticKind::UnexpectedToken,
                start,
                end - start,
                format!("unexpected token '{lexeme}'"),
                None,
            );
            return Some(Token {
                kind: TokenKind::Identifier,
                offset: start,
                len: end - start,
                payload: lexeme.to_string(),
                flags,
            });
        }

        // hexadecimal
        if self.byte_at(pos) == Some(b'0')
            && matches!(self.byte_at(pos + 1), Some(b'x' | b'X'))
            && self.byte_at(pos + 2).is_some_and(|b| b.is_ascii_hexdigit())
        {
            let digits_start = pos + 2;
            let mut end = digits_start;
            while self.byte_at(end).is_some_and(|b| b.is_ascii_hexdigit()) {
                end += 1;
            }
            self.pos = end;
            let lexeme = &self.text[start..end];
            let sign = if lexeme.starts_with('-') { "-" } else { "" };
            let canonical = format!(
                "{sign}{}",
                radix_to_decimal(&self.text[digits_start..end], 16)
            );
            flags.normalized_number = true;
            self.record(FixKind::NormalizedNumber, start, lexeme, &canonical);
            self.diagnose(
                DiagnosticKind::InvalidNumber,
                start,
                end - start,
                format!("hexadecimal literal '{lexeme}' is not a JSON number"),
                None,
            );
            return Some(Token {
                kind: TokenKind::Number,
                offset: start,
                len: end - start,
                payload: canonical,
                flags,
            });
        }

        // integer part
        while self.byte_at(pos).is_some_and(|b| b.is_ascii_digit()) {
            pos += 1;
        }
        // fraction
        if self.byte_at(pos) == Some(b'.') {
            pos += 1;
            while self.byte_at(pos).is_some_and(|b| b.is_ascii_digit()) {
                pos += 1;
            }
        }
        // exponent, only when digits actually follow
        if matches!(self.byte_at(pos), Some(b'e' | b'E')) {
            let mut probe = pos + 1;
            if matches!(self.byte_at(probe), Some(b'-' | b'+')) {
                probe += 1;
            }
            if self.byte_at(probe).is_some_and(|b| b.is_ascii_digit()) {
                pos = probe;
                while self.byte_at(pos).is_some_and(|b| b.is_ascii_digit()) {
                    pos += 1;
                }
            }
        }

        let lexeme = &self.text[start..pos];
        self.pos = pos;
        if !lexeme.bytes().any(|b| b.is_ascii_digit()) {
            self.diagnose(
                DiagnosticKind::UnexpectedToken,
                start,
                pos - start,
                format!("unexpected token '{lexeme}'"),
                None,
            );
            self.skipped_garbage += 1;
            return None;
        }

        let canonical = canonical_number(lexeme);
        if canonical != lexeme {
            flags.normalized_number = true;
            self.record(FixKind::NormalizedNumber, start, lexeme, &canonical);
            self.diagnose(
                DiagnosticKind::InvalidNumber,
                start,
                pos - start,
                format!("'{lexeme}' does not match the JSON number grammar"),
                Some(format!("write it as {canonical}").as_str()),
            );
        }

        Some(Token {
            kind: TokenKind::Number,
            offset: start,
            len: pos - start,
            payload: canonical,
            flags,
        })
    }

    // ── Literals and identifiers ────────────────────────────────────────

    #[allow(clippy::too_many_lines)]
    fn identifier_token(&mut self, start: usize) -> Token {
        let mut end = start;
        while self.byte_at(end).is_some_and(is_ident_continue) {
            end += 1;
        }
        let word = &self.text[start..end];
        self.pos = end;
        let mut flags = RecoveryFlags::default();

        // A following colon makes this a key, whatever the word says.
        if self.colon_follows() {
            flags.was_unquoted_identifier = true;
            let quoted = format!("\"{word}\"");
            self.record(FixKind::UnquotedKey, start, word, &quoted);
            self.diagnose(
                DiagnosticKind::UnexpectedToken,
                start,
                end - start,
                format!("object keys must be quoted strings, found '{word}'"),
                Some(format!("write it as {quoted}").as_str()),
            );
            return Token {
                kind: TokenKind::String,
                offset: start,
                len: end - start,
                payload: word.to_string(),
                flags,
            };
        }

        let lower = word.to_ascii_lowercase();

        // exact, correctly-cased literals
        if let Some(kind) = exact_literal(word) {
            return Token {
                kind,
                offset: start,
                len: end - start,
                payload: String::new(),
                flags,
            };
        }

        // case variants and unique prefixes, possibly split across one run
        // of spaces or tabs ("tr ue")
        if let Some(literal) = literal_for_prefix(&lower) {
            let mut end = end;
            if lower != literal {
                end = self.complete_split_literal(end, &lower, literal);
            }
            let lexeme = &self.text[start..end];
            flags.normalized_literal = true;
            self.record(FixKind::NormalizedLiteral, start, lexeme, literal);
            self.diagnose(
                DiagnosticKind::UnexpectedToken,
                start,
                end - start,
                format!("unexpected token '{lexeme}'"),
                Some(format!("did you mean {literal}?").as_str()),
            );
            let kind = match literal {
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                _ => TokenKind::Null,
            };
            return Token {
                kind,
                offset: start,
                len: end - start,
                payload: String::new(),
                flags,
            };
        }

        if lower == "undefined" || lower == "nil" {
            flags.normalized_literal = true;
            let kind = if lower == "undefined" {
                FixKind::UndefinedToNull
            } else {
                FixKind::NormalizedLiteral
            };
            self.record(kind, start, word, "null");
            self.diagnose(
                DiagnosticKind::UnexpectedToken,
                start,
                end - start,
                format!("unexpected token '{word}'"),
                Some("did you mean null?"),
            );
            return Token {
                kind: TokenKind::Null,
                offset: start,
                len: end - start,
                payload: String::new(),
                flags,
            };
        }

        if lower == "infinity" || lower == "nan" {
            flags.normalized_number = true;
            self.record(FixKind::InfinityOrNanToNull, start, word, "null");
            self.diagnose(
                DiagnosticKind::InvalidNumber,
                start,
                end - start,
                format!("'{word}' is not a JSON number"),
                Some("no JSON number can represent it; it becomes null"),
            );
            return Token {
                kind: TokenKind::Null,
                offset: start,
                len: end - start,
                payload: String::new(),
                flags,
            };
        }

        self.diagnose(
            DiagnosticKind::UnexpectedToken,
            start,
            end - start,
            format!("unexpected token '{word}'"),
            None,
        );
        Token {
            kind: TokenKind::Identifier,
            offset: start,
            len: end - start,
            payload: word.to_string(),
            flags,
        }
    }

    /// Try to close a partial literal split by one run of spaces/tabs, as in
    /// `tr ue`. Consumes the continuation only when the combined letters
    /// close the literal exactly; otherwise backtracks and the prefix stands
    /// alone.
    fn complete_split_literal(&mut self, end: usize, lower: &str, literal: &str) -> usize {
        let mut gap = end;
        while matches!(self.byte_at(gap), Some(b' ' | b'\t')) {
            gap += 1;
        }
        if gap == end {
            return end;
        }
        let mut cont = gap;
        while self.byte_at(cont).is_some_and(|b| b.is_ascii_alphabetic()) {
            cont += 1;
        }
        if cont == gap {
            return end;
        }
        let combined = format!("{lower}{}", self.text[gap..cont].to_ascii_lowercase());
        if combined == literal {
            self.pos = cont;
            return cont;
        }
        end
    }

    /// Whether the next non-whitespace character is a colon; used to detect
    /// unquoted object keys without consuming anything.
    fn colon_follows(&self) -> bool {
        let mut probe = self.pos;
        while let Some(b) = self.byte_at(probe) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => probe += 1,
                b':' => return true,
                _ => return false,
            }
        }
        false
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Whether a character can begin some token; ends a garbage run.
fn is_token_start(c: char) -> bool {
    matches!(
        c,
        '{' | '}' | '[' | ']' | ',' | ':' | '"' | '\'' | '-' | '+' | '.' | '0'..='9'
    ) || c.is_ascii_alphabetic()
        || c == '_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn exact_literal(word: &str) -> Option<TokenKind> {
    match word {
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "null" => Some(TokenKind::Null),
        _ => None,
    }
}

/// The literal a (lowercased) word resolves to, for exact case variants and
/// the unique prefixes that identify one literal.
fn literal_for_prefix(lower: &str) -> Option<&'static str> {
    match lower {
        "true" | "tru" | "tr" => Some("true"),
        "false" | "fals" | "fal" => Some("false"),
        "null" | "nul" | "nu" => Some("null"),
        _ => None,
    }
}

/// Rewrite a tolerant number lexeme into its RFC 8259 canonical form.
///
/// Rules applied in order: drop a leading `+`; convert octal (a leading zero
/// followed only by octal digits, no fraction or exponent); strip surplus
/// leading zeros keeping one; prepend `0` to a bare fraction; put a `0`
/// after a dangling decimal point. `-0` survives unchanged, and the digits
/// are never routed through floating point, so every value is preserved
/// exactly.
fn canonical_number(lexeme: &str) -> String {
    let (sign, rest) = if let Some(r) = lexeme.strip_prefix('-') {
        ("-", r)
    } else if let Some(r) = lexeme.strip_prefix('+') {
        ("", r)
    } else {
        ("", lexeme)
    };

    if rest.len() > 1 && rest.starts_with('0') && rest[1..].bytes().all(|b| (b'0'..=b'7').contains(&b))
    {
        return format!("{sign}{}", radix_to_decimal(&rest[1..], 8));
    }

    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(at) => (&rest[..at], &rest[at..]),
        None => (rest, ""),
    };
    let (int_part, fraction) = match mantissa.find('.') {
        Some(at) => (&mantissa[..at], Some(&mantissa[at + 1..])),
        None => (mantissa, None),
    };

    let trimmed = int_part.trim_start_matches('0');
    let int_norm = if trimmed.is_empty() { "0" } else { trimmed };
    let frac_norm = match fraction {
        None => String::new(),
        Some("") => ".0".to_string(),
        Some(digits) => format!(".{digits}"),
    };

    format!("{sign}{int_norm}{frac_norm}{exponent}")
}

/// Convert a digit string in the given radix to decimal, exactly, without
/// floating point. Schoolbook multiply-add over little-endian decimal
/// digits; inputs are pre-validated by the scanner.
#[allow(clippy::cast_possible_truncation)]
fn radix_to_decimal(digits: &str, radix: u32) -> String {
    let mut acc: Vec<u8> = vec![0];
    for d in digits.chars() {
        let mut carry = d.to_digit(radix).unwrap_or(0);
        for slot in &mut acc {
            let v = u32::from(*slot) * radix + carry;
            *slot = (v % 10) as u8;
            carry = v / 10;
        }
        while carry > 0 {
            acc.push((carry % 10) as u8);
            carry /= 10;
        }
    }
    while acc.len() > 1 && acc.last() == Some(&0) {
        acc.pop();
    }
    acc.iter().rev().map(|d| char::from(b'0' + d)).collect()
}
