use alloc::collections::VecDeque;

use spackle_diagnostics::FixKind;

use crate::RawFix;
use crate::emit;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// A parsed JSON value. `was_repaired` is set when any repair was needed
/// anywhere in the subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: NodeValue,
    pub was_repaired: bool,
}

/// The value itself. Object members are an ordered sequence, not a map:
/// insertion order is preserved and duplicate keys survive.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Null,
    Bool(bool),
    /// Canonical digit string, carried verbatim to output.
    Number(String),
    /// Decoded Unicode scalar sequence; all escape policy is applied on
    /// output.
    String(String),
    Array(Vec<Node>),
    Object(Vec<(String, Node)>),
}

impl Node {
    pub(crate) fn clean(value: NodeValue) -> Self {
        Self {
            value,
            was_repaired: false,
        }
    }

    pub(crate) fn repaired(value: NodeValue) -> Self {
        Self {
            value,
            was_repaired: true,
        }
    }

    pub fn null() -> Self {
        Self::clean(NodeValue::Null)
    }
}

// ── Builder frames ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrState {
    ValueOrClose,
    CommaOrClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjState {
    KeyOrClose,
    Colon,
    Value,
    CommaOrClose,
}

struct ArrayFrame {
    elements: Vec<Node>,
    state: ArrState,
    repaired: bool,
}

struct ObjectFrame {
    members: Vec<(String, usize, Node)>,
    pending_key: Option<(String, usize)>,
    state: ObjState,
    repaired: bool,
}

enum Frame {
    Array(ArrayFrame),
    Object(ObjectFrame),
}

impl ArrayFrame {
    fn new() -> Self {
        Self {
            elements: Vec::new(),
            state: ArrState::ValueOrClose,
            repaired: false,
        }
    }

    fn close(self) -> Node {
        Node {
            value: NodeValue::Array(self.elements),
            was_repaired: self.repaired,
        }
    }
}

impl ObjectFrame {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            pending_key: None,
            state: ObjState::KeyOrClose,
            repaired: false,
        }
    }

    fn take_key(&mut self) -> (String, usize) {
        debug_assert!(self.pending_key.is_some(), "no key pending in object frame");
        self.pending_key.take().unwrap_or_default()
    }

    /// Finish the member under construction with a synthesized null.
    fn null_member(&mut self) {
        let (key, key_offset) = self.take_key();
        self.members
            .push((key, key_offset, Node::repaired(NodeValue::Null)));
        self.repaired = true;
    }
}

/// Everything a tolerant parse produces.
pub(crate) struct BuildOutcome {
    pub root: Node,
    pub fixes: Vec<RawFix>,
    pub stray_tokens: usize,
    pub skipped_garbage: usize,
}

/// Recursive-descent over the token stream with local recovery at every
/// production. The descent is driven by an explicit heap stack, so nesting
/// depth is bounded by memory, not the call stack.
pub(crate) struct TreeBuilder<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token>,
    fixes: Vec<RawFix>,
    last_end: usize,
    stray_tokens: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            lookahead: VecDeque::new(),
            fixes: Vec::new(),
            last_end: 0,
            stray_tokens: 0,
        }
    }

    fn next(&mut self) -> Token {
        let token = self
            .lookahead
            .pop_front()
            .unwrap_or_else(|| self.lexer.next_token());
        self.last_end = token.end();
        token
    }

    fn peek(&mut self) -> &Token {
        if self.lookahead.is_empty() {
            let token = self.lexer.next_token();
            self.lookahead.push_back(token);
        }
        &self.lookahead[0]
    }

    fn put_back(&mut self, token: Token) {
        self.lookahead.push_front(token);
    }

    fn record(&mut self, kind: FixKind, offset: usize, before: &str, after: &str) {
        self.fixes
            .push(RawFix::new(kind, offset, before.to_string(), after.to_string()));
    }

    fn record_desc(
        &mut self,
        kind: FixKind,
        offset: usize,
        before: &str,
        after: &str,
        description: &str,
    ) {
        self.fixes.push(RawFix::with_description(
            kind,
            offset,
            before.to_string(),
            after.to_string(),
            description,
        ));
    }

    // ── Roots ───────────────────────────────────────────────────────────

    /// Parse every top-level value. Empty input is a bare `null` with no
    /// repairs; more than one root is wrapped in a synthetic array (or
    /// dropped, per configuration) with a `MultipleRoots` fix.
    pub fn build(mut self, wrap_multiple_roots: bool) -> BuildOutcome {
        if self.peek().kind == TokenKind::Eof {
            return self.finish(Node::null());
        }

        let first = self.parse_value();
        let mut roots = vec![first];
        let mut ndjson = true;
        let mut second_root_offset = None;
        let mut prev_end = self.last_end;

        loop {
            let mut separators = 0usize;
            while matches!(
                self.peek().kind,
                TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::CloseBrace
                    | TokenKind::CloseBracket
            ) {
                let _ = self.next();
                separators += 1;
            }
            if self.peek().kind == TokenKind::Eof {
                // trailing separators with nothing after them were garbage
                self.stray_tokens += separators;
                break;
            }

            let start = self.peek().offset;
            let gap = &self.lexer.text()[prev_end..start];
            ndjson = ndjson && separators == 0 && gap.contains('\n');
            if second_root_offset.is_none() {
                second_root_offset = Some(start);
            }
            roots.push(self.parse_value());
            prev_end = self.last_end;
        }

        if roots.len() > 1 {
            let offset = second_root_offset.unwrap_or(0);
            let root = if wrap_multiple_roots {
                if ndjson {
                    self.record_desc(
                        FixKind::MultipleRoots,
                        offset,
                        "",
                        "",
                        "wrapped newline-delimited values in an array",
                    );
                } else {
                    self.record(FixKind::MultipleRoots, offset, "", "");
                }
                Node::repaired(NodeValue::Array(roots))
            } else {
                self.record_desc(
                    FixKind::MultipleRoots,
                    offset,
                    "",
                    "",
                    "dropped trailing top-level values",
                );
                let mut first = roots.swap_remove(0);
                first.was_repaired = true;
                first
            };
            self.finish(root)
        } else {
            let root = roots.pop().unwrap_or_else(Node::null);
            self.finish(root)
        }
    }

    fn finish(mut self, root: Node) -> BuildOutcome {
        let mut fixes = core::mem::take(&mut self.lexer.fixes);
        fixes.append(&mut self.fixes);
        BuildOutcome {
            root,
            fixes,
            stray_tokens: self.stray_tokens,
            skipped_garbage: self.lexer.skipped_garbage,
        }
    }

    // ── Values ──────────────────────────────────────────────────────────

    fn scalar(&mut self, token: Token) -> Node {
        let repaired = token.flags.any();
        let value = match token.kind {
            TokenKind::String => NodeValue::String(token.payload),
            TokenKind::Number => NodeValue::Number(token.payload),
            TokenKind::True => NodeValue::Bool(true),
            TokenKind::False => NodeValue::Bool(false),
            TokenKind::Null => NodeValue::Null,
            TokenKind::Identifier => {
                // bare text in value position becomes a string
                let quoted = format!("\"{}\"", emit::escape_fragment(&token.payload));
                self.record_desc(
                    FixKind::UnquotedKey,
                    token.offset,
                    &token.payload,
                    &quoted,
                    &format!("quoted bare text '{}'", token.payload),
                );
                return Node::repaired(NodeValue::String(token.payload));
            }
            _ => {
                debug_assert!(false, "scalar() called with {:?}", token.kind);
                NodeValue::Null
            }
        };
        Node {
            value,
            was_repaired: repaired,
        }
    }

    /// Text to use when a non-string token lands in key position.
    fn key_text(token: &Token) -> String {
        match token.kind {
            TokenKind::True => "true".to_string(),
            TokenKind::False => "false".to_string(),
            TokenKind::Null => "null".to_string(),
            _ => token.payload.clone(),
        }
    }

    /// Parse one value. Containers are handled with an explicit frame stack
    /// so deeply nested input cannot overflow the call stack; `pending`
    /// carries each completed value up to its parent frame. Each iteration
    /// pops the top frame, consumes one token against it, and either pushes
    /// the frame back (possibly with a child on top) or converts it into a
    /// completed value.
    fn parse_value(&mut self) -> Node {
        let mut stack: Vec<Frame> = Vec::new();
        let mut pending: Option<Node> = None;

        loop {
            if let Some(node) = pending.take() {
                match stack.pop() {
                    None => return node,
                    Some(Frame::Array(mut frame)) => {
                        frame.repaired |= node.was_repaired;
                        frame.elements.push(node);
                        frame.state = ArrState::CommaOrClose;
                        stack.push(Frame::Array(frame));
                    }
                    Some(Frame::Object(mut frame)) => {
                        frame.repaired |= node.was_repaired;
                        let (key, key_offset) = frame.take_key();
                        frame.members.push((key, key_offset, node));
                        frame.state = ObjState::CommaOrClose;
                        stack.push(Frame::Object(frame));
                    }
                }
                continue;
            }

            match stack.pop() {
                None => {
                    // root value position
                    let token = self.next();
                    match token.kind {
                        TokenKind::OpenBrace => stack.push(Frame::Object(ObjectFrame::new())),
                        TokenKind::OpenBracket => stack.push(Frame::Array(ArrayFrame::new())),
                        TokenKind::Eof => return Node::null(),
                        kind if kind.starts_value() => pending = Some(self.scalar(token)),
                        _ => self.stray_tokens += 1,
                    }
                }
                Some(Frame::Array(frame)) => {
                    pending = self.step_array(&mut stack, frame);
                }
                Some(Frame::Object(frame)) => {
                    pending = self.step_object(&mut stack, frame);
                }
            }
        }
    }

    /// Advance an array frame by one token. Returns the finished node when
    /// the array closed; otherwise the frame (and possibly a child) is back
    /// on the stack.
    #[allow(clippy::cognitive_complexity)]
    fn step_array(&mut self, stack: &mut Vec<Frame>, mut frame: ArrayFrame) -> Option<Node> {
        let token = self.next();
        match frame.state {
            ArrState::ValueOrClose => match token.kind {
                TokenKind::CloseBracket => return Some(frame.close()),
                TokenKind::OpenBrace => {
                    stack.push(Frame::Array(frame));
                    stack.push(Frame::Object(ObjectFrame::new()));
                }
                TokenKind::OpenBracket => {
                    stack.push(Frame::Array(frame));
                    stack.push(Frame::Array(ArrayFrame::new()));
                }
                TokenKind::Comma => {
                    // leading or doubled comma
                    self.record_desc(
                        FixKind::TrailingComma,
                        token.offset,
                        ",",
                        "",
                        "removed extra comma",
                    );
                    frame.repaired = true;
                    stack.push(Frame::Array(frame));
                }
                TokenKind::CloseBrace => {
                    self.record(FixKind::MismatchedCloser, token.offset, "}", "]");
                    frame.repaired = true;
                    return Some(frame.close());
                }
                TokenKind::Eof => {
                    self.record(FixKind::UnterminatedArray, token.offset, "", "]");
                    frame.repaired = true;
                    return Some(frame.close());
                }
                TokenKind::Colon => {
                    self.stray_tokens += 1;
                    stack.push(Frame::Array(frame));
                }
                _ => {
                    let node = self.scalar(token);
                    stack.push(Frame::Array(frame));
                    return Some(node);
                }
            },
            ArrState::CommaOrClose => match token.kind {
                TokenKind::Comma => {
                    if self.peek().kind == TokenKind::CloseBracket {
                        let _ = self.next();
                        self.record(FixKind::TrailingComma, token.offset, ",", "");
                        frame.repaired = true;
                        return Some(frame.close());
                    }
                    frame.state = ArrState::ValueOrClose;
                    stack.push(Frame::Array(frame));
                }
                TokenKind::CloseBracket => return Some(frame.close()),
                TokenKind::CloseBrace => {
                    self.record(FixKind::MismatchedCloser, token.offset, "}", "]");
                    frame.repaired = true;
                    return Some(frame.close());
                }
                TokenKind::Eof => {
                    self.record(FixKind::UnterminatedArray, token.offset, "", "]");
                    frame.repaired = true;
                    return Some(frame.close());
                }
                TokenKind::Colon => {
                    self.stray_tokens += 1;
                    stack.push(Frame::Array(frame));
                }
                _ => {
                    // a value where a separator belongs
                    self.record(FixKind::MissingComma, token.offset, "", ",");
                    frame.repaired = true;
                    frame.state = ArrState::ValueOrClose;
                    self.put_back(token);
                    stack.push(Frame::Array(frame));
                }
            },
        }
        None
    }

    /// Advance an object frame by one token; the object analogue of
    /// [`TreeBuilder::step_array`].
    #[allow(clippy::too_many_lines, clippy::cognitive_complexity)]
    fn step_object(&mut self, stack: &mut Vec<Frame>, mut frame: ObjectFrame) -> Option<Node> {
        let token = self.next();
        match frame.state {
            ObjState::KeyOrClose => match token.kind {
                TokenKind::CloseBrace => return Some(self.close_object(frame)),
                TokenKind::String => {
                    frame.repaired |= token.flags.any();
                    frame.pending_key = Some((token.payload, token.offset));
                    frame.state = ObjState::Colon;
                    stack.push(Frame::Object(frame));
                }
                TokenKind::Comma => {
                    self.record_desc(
                        FixKind::TrailingComma,
                        token.offset,
                        ",",
                        "",
                        "removed extra comma",
                    );
                    frame.repaired = true;
                    stack.push(Frame::Object(frame));
                }
                TokenKind::CloseBracket => {
                    self.record(FixKind::MismatchedCloser, token.offset, "]", "}");
                    frame.repaired = true;
                    return Some(self.close_object(frame));
                }
                TokenKind::Eof => {
                    self.record(FixKind::UnterminatedObject, token.offset, "", "}");
                    frame.repaired = true;
                    return Some(self.close_object(frame));
                }
                TokenKind::Colon => {
                    self.stray_tokens += 1;
                    stack.push(Frame::Object(frame));
                }
                _ => {
                    let opens_container =
                        matches!(token.kind, TokenKind::OpenBrace | TokenKind::OpenBracket);
                    if !opens_container && self.peek().kind == TokenKind::Colon {
                        // an unquoted key the tokenizer could not see as one
                        // (a number, or a literal)
                        let key = Self::key_text(&token);
                        let quoted = format!("\"{}\"", emit::escape_fragment(&key));
                        self.record(FixKind::UnquotedKey, token.offset, &key, &quoted);
                        frame.repaired = true;
                        frame.pending_key = Some((key, token.offset));
                        frame.state = ObjState::Colon;
                        stack.push(Frame::Object(frame));
                    } else if let Some((key, key_offset, value)) = frame.members.pop() {
                        // `"key": v1, v2` — a comma-separated run inside an
                        // object: the `[` is missing. Collect the run as an
                        // array assigned to the previous key.
                        self.record(FixKind::MissingOpenBracket, token.offset, "", "[");
                        frame.repaired = true;
                        frame.pending_key = Some((key, key_offset));
                        frame.state = ObjState::Value;
                        self.put_back(token);
                        stack.push(Frame::Object(frame));
                        stack.push(Frame::Array(ArrayFrame {
                            elements: vec![value],
                            state: ArrState::ValueOrClose,
                            repaired: true,
                        }));
                    } else {
                        // nothing to extend: treat it as a member whose key
                        // or colon went missing
                        let (key, reparse) = if opens_container {
                            (String::new(), true)
                        } else {
                            (Self::key_text(&token), false)
                        };
                        self.record(FixKind::MissingColon, token.offset, "", ":");
                        frame.repaired = true;
                        frame.pending_key = Some((key, token.offset));
                        frame.state = ObjState::Value;
                        if reparse {
                            self.put_back(token);
                        }
                        stack.push(Frame::Object(frame));
                    }
                }
            },
            ObjState::Colon => match token.kind {
                TokenKind::Colon => {
                    frame.state = ObjState::Value;
                    stack.push(Frame::Object(frame));
                }
                TokenKind::CloseBrace => {
                    self.record(FixKind::MissingColon, token.offset, "", ":");
                    frame.null_member();
                    return Some(self.close_object(frame));
                }
                TokenKind::Comma => {
                    self.record(FixKind::MissingColon, token.offset, "", ":");
                    frame.null_member();
                    frame.state = ObjState::KeyOrClose;
                    stack.push(Frame::Object(frame));
                }
                TokenKind::Eof => {
                    self.record(FixKind::UnterminatedObject, token.offset, "", "}");
                    frame.null_member();
                    return Some(self.close_object(frame));
                }
                TokenKind::CloseBracket => {
                    self.record(FixKind::MismatchedCloser, token.offset, "]", "}");
                    frame.null_member();
                    return Some(self.close_object(frame));
                }
                _ => {
                    self.record(FixKind::MissingColon, token.offset, "", ":");
                    frame.repaired = true;
                    frame.state = ObjState::Value;
                    self.put_back(token);
                    stack.push(Frame::Object(frame));
                }
            },
            ObjState::Value => match token.kind {
                TokenKind::OpenBrace => {
                    stack.push(Frame::Object(frame));
                    stack.push(Frame::Object(ObjectFrame::new()));
                }
                TokenKind::OpenBracket => {
                    stack.push(Frame::Object(frame));
                    stack.push(Frame::Array(ArrayFrame::new()));
                }
                TokenKind::CloseBrace => {
                    self.record_desc(
                        FixKind::NormalizedLiteral,
                        token.offset,
                        "",
                        "null",
                        "inserted null for missing value",
                    );
                    frame.null_member();
                    return Some(self.close_object(frame));
                }
                TokenKind::Comma => {
                    self.record_desc(
                        FixKind::NormalizedLiteral,
                        token.offset,
                        "",
                        "null",
                        "inserted null for missing value",
                    );
                    frame.null_member();
                    frame.state = ObjState::KeyOrClose;
                    stack.push(Frame::Object(frame));
                }
                TokenKind::CloseBracket => {
                    self.record(FixKind::MismatchedCloser, token.offset, "]", "}");
                    frame.null_member();
                    return Some(self.close_object(frame));
                }
                TokenKind::Eof => {
                    self.record(FixKind::UnterminatedObject, token.offset, "", "}");
                    frame.null_member();
                    return Some(self.close_object(frame));
                }
                TokenKind::Colon => {
                    self.stray_tokens += 1;
                    stack.push(Frame::Object(frame));
                }
                _ => {
                    let node = self.scalar(token);
                    stack.push(Frame::Object(frame));
                    return Some(node);
                }
            },
            ObjState::CommaOrClose => match token.kind {
                TokenKind::Comma => {
                    if self.peek().kind == TokenKind::CloseBrace {
                        let _ = self.next();
                        self.record(FixKind::TrailingComma, token.offset, ",", "");
                        frame.repaired = true;
                        return Some(self.close_object(frame));
                    }
                    frame.state = ObjState::KeyOrClose;
                    stack.push(Frame::Object(frame));
                }
                TokenKind::CloseBrace => return Some(self.close_object(frame)),
                TokenKind::CloseBracket => {
                    self.record(FixKind::MismatchedCloser, token.offset, "]", "}");
                    frame.repaired = true;
                    return Some(self.close_object(frame));
                }
                TokenKind::Eof => {
                    self.record(FixKind::UnterminatedObject, token.offset, "", "}");
                    frame.repaired = true;
                    return Some(self.close_object(frame));
                }
                TokenKind::Colon => {
                    self.stray_tokens += 1;
                    stack.push(Frame::Object(frame));
                }
                _ => {
                    self.record(FixKind::MissingComma, token.offset, "", ",");
                    frame.repaired = true;
                    frame.state = ObjState::KeyOrClose;
                    self.put_back(token);
                    stack.push(Frame::Object(frame));
                }
            },
        }
        None
    }

    /// Turn an object frame into a node, emitting `DuplicateKey` records for
    /// repeated names. Duplicates are kept in order; the records announce
    /// them without counting as repairs.
    fn close_object(&mut self, frame: ObjectFrame) -> Node {
        for (i, (key, key_offset, _)) in frame.members.iter().enumerate() {
            if frame.members[..i].iter().any(|(k, _, _)| k == key) {
                self.fixes.push(RawFix::new(
                    FixKind::DuplicateKey,
                    *key_offset,
                    key.clone(),
                    key.clone(),
                ));
            }
        }
        let members = frame.members.into_iter().map(|(k, _, v)| (k, v)).collect();
        Node {
            value: NodeValue::Object(members),
            was_repaired: frame.repaired,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn build(input: &str) -> (Node, Vec<RawFix>) {
        let builder = TreeBuilder::new(Lexer::new(input));
        let outcome = builder.build(true);
        (outcome.root, outcome.fixes)
    }

    fn kinds(fixes: &[RawFix]) -> Vec<FixKind> {
        fixes.iter().map(|f| f.kind).collect()
    }

    fn object(node: &Node) -> &[(String, Node)] {
        match &node.value {
            NodeValue::Object(members) => members,
            other => panic!("expected object, got {other:?}"),
        }
    }

    fn array(node: &Node) -> &[Node] {
        match &node.value {
            NodeValue::Array(elements) => elements,
            other => panic!("expected array, got {other:?}"),
        }
    }

    // --- clean parses ---

    #[test]
    fn simple_object() {
        let (root, fixes) = build(r#"{"a": 1, "b": [true, null]}"#);
        assert!(fixes.is_empty());
        assert!(!root.was_repaired);
        let members = object(&root);
        assert_eq!(members[0].0, "a");
        assert_eq!(members[0].1.value, NodeValue::Number("1".to_string()));
        assert_eq!(array(&members[1].1).len(), 2);
    }

    #[test]
    fn empty_input_is_null() {
        let (root, fixes) = build("");
        assert_eq!(root.value, NodeValue::Null);
        assert!(fixes.is_empty());
        assert!(!root.was_repaired);
    }

    #[test]
    fn whitespace_only_input_is_null() {
        let (root, fixes) = build("  \n\t ");
        assert_eq!(root.value, NodeValue::Null);
        assert!(fixes.is_empty());
    }

    #[test]
    fn standalone_scalar() {
        let (root, fixes) = build(r#""hello""#);
        assert_eq!(root.value, NodeValue::String("hello".to_string()));
        assert!(fixes.is_empty());
        assert!(!root.was_repaired);
    }

    // --- local recovery ---

    #[test]
    fn missing_colon_synthesized() {
        let (root, fixes) = build(r#"{"a" 1}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::MissingColon]);
        assert_eq!(object(&root)[0].1.value, NodeValue::Number("1".to_string()));
        assert!(root.was_repaired);
    }

    #[test]
    fn missing_comma_between_members() {
        let (root, fixes) = build(r#"{"a":1 "b":2}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::MissingComma]);
        assert_eq!(object(&root).len(), 2);
    }

    #[test]
    fn missing_comma_between_elements() {
        let (root, fixes) = build("[1 2]");
        assert_eq!(kinds(&fixes), vec![FixKind::MissingComma]);
        assert_eq!(array(&root).len(), 2);
    }

    #[test]
    fn trailing_comma_in_object() {
        let (root, fixes) = build(r#"{"a": 1,}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::TrailingComma]);
        assert_eq!(object(&root).len(), 1);
    }

    #[test]
    fn trailing_comma_in_array() {
        let (root, fixes) = build("[1, 2,]");
        assert_eq!(kinds(&fixes), vec![FixKind::TrailingComma]);
        assert_eq!(array(&root).len(), 2);
    }

    #[test]
    fn doubled_comma_dropped() {
        let (root, fixes) = build("[1,,2]");
        assert_eq!(kinds(&fixes), vec![FixKind::TrailingComma]);
        assert_eq!(array(&root).len(), 2);
    }

    #[test]
    fn unterminated_object_closed() {
        let (root, fixes) = build(r#"{"a": 1"#);
        assert_eq!(kinds(&fixes), vec![FixKind::UnterminatedObject]);
        assert_eq!(object(&root).len(), 1);
    }

    #[test]
    fn unterminated_array_closed() {
        let (root, fixes) = build("[1, 2");
        assert_eq!(kinds(&fixes), vec![FixKind::UnterminatedArray]);
        assert_eq!(array(&root).len(), 2);
    }

    #[test]
    fn nested_unterminated_containers() {
        let (root, fixes) = build(r#"{"a": [1, {"b": 2"#);
        assert_eq!(
            kinds(&fixes),
            vec![
                FixKind::UnterminatedObject,
                FixKind::UnterminatedArray,
                FixKind::UnterminatedObject,
            ]
        );
        let inner = array(&object(&root)[0].1);
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn mismatched_closer_closes_innermost() {
        let (root, fixes) = build(r#"{"a": [1, 2}"#);
        // '}' closes the array, then the object needs its own close
        assert!(kinds(&fixes).contains(&FixKind::MismatchedCloser));
        assert_eq!(array(&object(&root)[0].1).len(), 2);
    }

    #[test]
    fn missing_open_bracket_wraps_value_run() {
        let (root, fixes) = build(r#"{"coordinates": -0.1695, 51.4865]}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::MissingOpenBracket]);
        let members = object(&root);
        assert_eq!(members.len(), 1);
        let coords = array(&members[0].1);
        assert_eq!(coords[0].value, NodeValue::Number("-0.1695".to_string()));
        assert_eq!(coords[1].value, NodeValue::Number("51.4865".to_string()));
    }

    #[test]
    fn duplicate_keys_kept_and_reported() {
        let (root, fixes) = build(r#"{"a": 1, "a": 2}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::DuplicateKey]);
        let members = object(&root);
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].1.value, NodeValue::Number("2".to_string()));
    }

    #[test]
    fn missing_value_becomes_null() {
        let (root, fixes) = build(r#"{"a":}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::NormalizedLiteral]);
        assert_eq!(object(&root)[0].1.value, NodeValue::Null);
    }

    #[test]
    fn key_without_colon_or_value() {
        let (root, fixes) = build(r#"{"a"}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::MissingColon]);
        assert_eq!(object(&root)[0].1.value, NodeValue::Null);
    }

    #[test]
    fn unquoted_number_key() {
        let (root, fixes) = build("{1: 2}");
        assert_eq!(kinds(&fixes), vec![FixKind::UnquotedKey]);
        assert_eq!(object(&root)[0].0, "1");
    }

    #[test]
    fn bare_identifier_value_becomes_string() {
        let (root, fixes) = build("{\"a\": hello}");
        assert_eq!(kinds(&fixes), vec![FixKind::UnquotedKey]);
        assert_eq!(
            object(&root)[0].1.value,
            NodeValue::String("hello".to_string())
        );
    }

    // --- multiple roots ---

    #[test]
    fn two_roots_wrap_into_array() {
        let (root, fixes) = build(r#"{"a":1}{"b":2}"#);
        assert_eq!(kinds(&fixes), vec![FixKind::MultipleRoots]);
        assert_eq!(array(&root).len(), 2);
        assert!(root.was_repaired);
    }

    #[test]
    fn ndjson_gets_its_own_wording() {
        let (_, fixes) = build("{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(fixes.len(), 1);
        assert!(fixes[0]
            .description
            .as_deref()
            .is_some_and(|d| d.contains("newline-delimited")));
    }

    #[test]
    fn comma_separated_roots_are_not_ndjson() {
        let (root, fixes) = build("1, 2, 3");
        assert_eq!(kinds(&fixes), vec![FixKind::MultipleRoots]);
        assert!(fixes[0].description.is_none());
        assert_eq!(array(&root).len(), 3);
    }

    #[test]
    fn unwrapped_mode_keeps_first_root() {
        let builder = TreeBuilder::new(Lexer::new(r#"{"a":1} {"b":2}"#));
        let outcome = builder.build(false);
        let members = object(&outcome.root);
        assert_eq!(members[0].0, "a");
        assert_eq!(kinds(&outcome.fixes), vec![FixKind::MultipleRoots]);
    }

    #[test]
    fn single_root_with_trailing_comma_garbage() {
        let builder = TreeBuilder::new(Lexer::new("1,"));
        let outcome = builder.build(true);
        assert_eq!(outcome.root.value, NodeValue::Number("1".to_string()));
        assert!(outcome.fixes.is_empty());
        assert_eq!(outcome.stray_tokens, 1);
    }

    // --- depth ---

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 2000;
        let input = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        let (root, fixes) = build(&input);
        assert!(fixes.is_empty());
        let mut node = &root;
        let mut seen = 0;
        while let NodeValue::Array(elements) = &node.value {
            node = &elements[0];
            seen += 1;
        }
        assert_eq!(seen, depth);
        assert_eq!(node.value, NodeValue::Number("1".to_string()));
    }

    #[test]
    fn repair_bit_propagates_upward() {
        let (root, _) = build(r#"{"a": {"b": [01]}}"#);
        assert!(root.was_repaired);
        let inner = &object(&root)[0].1;
        assert!(inner.was_repaired);
    }

    #[test]
    fn clean_sibling_subtree_stays_unrepaired() {
        let (root, _) = build(r#"{"clean": [1], "dirty": 0x1}"#);
        let members = object(&root);
        assert!(!members[0].1.was_repaired);
        assert!(members[1].1.was_repaired);
        assert!(root.was_repaired);
    }
}
