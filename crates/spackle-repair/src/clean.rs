use spackle_diagnostics::FixKind;

use crate::RawFix;

/// A UTF-8 BOM (byte order mark).
const BOM: &str = "\u{feff}";

/// Pre-cleaned input: BOM and comments stripped, everything else intact.
///
/// Offsets in `fixes` are already in original-input space. `original_offset`
/// maps positions in the cleaned text back to the original input so that
/// downstream diagnostics stay faithful to what the user wrote.
#[derive(Debug)]
pub(crate) struct Cleaned {
    pub text: String,
    pub fixes: Vec<RawFix>,
    segments: Vec<Segment>,
}

/// One contiguous copied run: cleaned bytes starting at `cleaned` came from
/// original bytes starting at `original`.
#[derive(Debug, Clone, Copy)]
struct Segment {
    cleaned: usize,
    original: usize,
}

impl Cleaned {
    pub fn original_offset(&self, cleaned: usize) -> usize {
        let idx = self.segments.partition_point(|s| s.cleaned <= cleaned);
        match idx.checked_sub(1).and_then(|i| self.segments.get(i)) {
            Some(segment) => segment.original + (cleaned - segment.cleaned),
            None => cleaned,
        }
    }
}

/// Strip a leading BOM and all line/block comments, quote-state aware.
///
/// Each removed comment is replaced by a single space so adjacent tokens
/// cannot fuse. Comment markers inside string literals are left alone, which
/// requires tracking quote state with escape awareness (single quotes
/// included, since the tokenizer tolerates them). A raw newline ends quote
/// state so an unterminated string cannot swallow comments on later lines.
pub(crate) fn clean(input: &str) -> Cleaned {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut fixes = Vec::new();
    let mut segments: Vec<Segment> = Vec::new();

    let mut i = 0;
    if input.starts_with(BOM) {
        fixes.push(RawFix::new(
            FixKind::BomRemoved,
            0,
            BOM.to_string(),
            String::new(),
        ));
        i = BOM.len();
    }

    let mut run_start = i;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q || b == b'\n' {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'\'' => {
                quote = Some(b);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                flush(&mut out, &mut segments, input, run_start, i);
                let start = i;
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
                fixes.push(RawFix::new(
                    FixKind::CommentRemoved,
                    start,
                    input[start..i].to_string(),
                    String::new(),
                ));
                space(&mut out, &mut segments, start);
                run_start = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                flush(&mut out, &mut segments, input, run_start, i);
                let start = i;
                i += 2;
                let mut terminated = false;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        i += 2;
                        terminated = true;
                        break;
                    }
                    i += 1;
                }
                let fix = if terminated {
                    RawFix::new(
                        FixKind::CommentRemoved,
                        start,
                        input[start..i].to_string(),
                        String::new(),
                    )
                } else {
                    RawFix::with_description(
                        FixKind::CommentRemoved,
                        start,
                        input[start..i].to_string(),
                        String::new(),
                        "removed unterminated block comment",
                    )
                };
                fixes.push(fix);
                space(&mut out, &mut segments, start);
                run_start = i;
            }
            _ => i += 1,
        }
    }
    flush(&mut out, &mut segments, input, run_start, bytes.len());

    Cleaned {
        text: out,
        fixes,
        segments,
    }
}

fn flush(out: &mut String, segments: &mut Vec<Segment>, input: &str, from: usize, to: usize) {
    if from < to {
        segments.push(Segment {
            cleaned: out.len(),
            original: from,
        });
        out.push_str(&input[from..to]);
    }
}

/// Stand in for a removed comment so adjacent tokens cannot fuse. The space
/// maps back to the comment's first byte.
fn space(out: &mut String, segments: &mut Vec<Segment>, comment_start: usize) {
    segments.push(Segment {
        cleaned: out.len(),
        original: comment_start,
    });
    out.push(' ');
}
