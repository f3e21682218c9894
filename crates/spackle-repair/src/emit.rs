use core::fmt::Write as _;

use crate::options::{Indent, RepairOptions};
use crate::tree::{Node, NodeValue};

/// Emit a node tree as canonical JSON text.
///
/// Driven by an explicit task stack rather than recursion, so the output
/// depth is bounded by memory like the parse itself. Numbers are emitted
/// verbatim from their canonical digit strings; all string escape policy
/// lives here, never in the tree.
pub(crate) fn write_node(root: &Node, options: &RepairOptions) -> String {
    let mut out = String::new();
    let mut stack: Vec<Task<'_>> = vec![Task::Node(root, 0)];

    while let Some(task) = stack.pop() {
        match task {
            Task::Lit(s) => out.push_str(s),
            Task::Sep(depth) => {
                if let Indent::Spaces(n) = options.indent {
                    out.push('\n');
                    for _ in 0..n * depth {
                        out.push(' ');
                    }
                }
            }
            Task::Key(key) => {
                write_string(&mut out, key, options.ensure_ascii);
                out.push(':');
                if options.indent != Indent::None {
                    out.push(' ');
                }
            }
            Task::Node(node, depth) => match &node.value {
                NodeValue::Null => out.push_str("null"),
                NodeValue::Bool(true) => out.push_str("true"),
                NodeValue::Bool(false) => out.push_str("false"),
                NodeValue::Number(digits) => out.push_str(digits),
                NodeValue::String(text) => write_string(&mut out, text, options.ensure_ascii),
                NodeValue::Array(elements) => {
                    if elements.is_empty() {
                        out.push_str("[]");
                    } else {
                        out.push('[');
                        stack.push(Task::Lit("]"));
                        stack.push(Task::Sep(depth));
                        for (i, element) in elements.iter().enumerate().rev() {
                            stack.push(Task::Node(element, depth + 1));
                            stack.push(Task::Sep(depth + 1));
                            if i > 0 {
                                stack.push(Task::Lit(","));
                            }
                        }
                    }
                }
                NodeValue::Object(members) => {
                    if members.is_empty() {
                        out.push_str("{}");
                    } else {
                        out.push('{');
                        stack.push(Task::Lit("}"));
                        stack.push(Task::Sep(depth));
                        for (i, (key, value)) in members.iter().enumerate().rev() {
                            stack.push(Task::Node(value, depth + 1));
                            stack.push(Task::Key(key));
                            stack.push(Task::Sep(depth + 1));
                            if i > 0 {
                                stack.push(Task::Lit(","));
                            }
                        }
                    }
                }
            },
        }
    }

    out
}

enum Task<'a> {
    Node(&'a Node, usize),
    Key(&'a str),
    Lit(&'static str),
    Sep(usize),
}

fn write_string(out: &mut String, text: &str, ensure_ascii: bool) {
    out.push('"');
    escape_into(out, text, ensure_ascii);
    out.push('"');
}

/// The escaped form of a string's contents, without surrounding quotes.
/// Used for fix-record rendering.
pub(crate) fn escape_fragment(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text, false);
    out
}

/// Escape policy: the two mandatory escapes, the five named controls, other
/// C0 controls and the U+007F–U+009F range as uppercase `\uXXXX`, and with
/// `ensure_ascii` everything else non-ASCII too, splitting scalars above the
/// BMP into surrogate pairs.
fn escape_into(out: &mut String, text: &str, ensure_ascii: bool) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c if ensure_ascii && !c.is_ascii() => {
                let v = c as u32;
                if v > 0xFFFF {
                    let v = v - 0x10000;
                    let high = 0xD800 + (v >> 10);
                    let low = 0xDC00 + (v & 0x3FF);
                    let _ = write!(out, "\\u{high:04X}\\u{low:04X}");
                } else {
                    let _ = write!(out, "\\u{v:04X}");
                }
            }
            c => out.push(c),
        }
    }
}
