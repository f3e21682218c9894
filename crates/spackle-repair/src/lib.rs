#![doc = include_str!("../README.md")]

extern crate alloc;

use alloc::borrow::Cow;
use std::collections::HashSet;

use serde::Serialize;
use spackle_diagnostics::{FixKind, FixRecord, LineIndex};

mod clean;
mod emit;
pub mod lexer;
pub mod options;
pub mod token;
pub mod tree;

pub use lexer::{LexDiagnostic, Lexer, Mode};
pub use options::{Indent, RepairOptions};
pub use token::{RecoveryFlags, Token, TokenKind};
pub use tree::{Node, NodeValue};

use tree::TreeBuilder;

/// An applied repair in byte offsets, before line/column resolution.
#[derive(Debug, Clone)]
pub(crate) struct RawFix {
    pub kind: FixKind,
    pub offset: usize,
    pub before: String,
    pub after: String,
    pub description: Option<String>,
}

impl RawFix {
    fn new(kind: FixKind, offset: usize, before: String, after: String) -> Self {
        Self {
            kind,
            offset,
            before,
            after,
            description: None,
        }
    }

    fn with_description(
        kind: FixKind,
        offset: usize,
        before: String,
        after: String,
        description: &str,
    ) -> Self {
        Self {
            kind,
            offset,
            before,
            after,
            description: Some(description.to_string()),
        }
    }

    fn resolve(self, index: &LineIndex<'_>) -> FixRecord {
        let (line, column) = index.locate(self.offset);
        match self.description {
            Some(description) => FixRecord::with_description(
                self.kind,
                line,
                column,
                self.before,
                self.after,
                &description,
            ),
            None => FixRecord::new(self.kind, line, column, self.before, self.after),
        }
    }
}

/// The outcome of one repair pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    /// Syntactically valid JSON text.
    pub text: String,
    /// Whether anything had to change to get there.
    pub was_fixed: bool,
    /// Human-readable summaries, one per repair, in source order.
    pub fixes: Vec<String>,
    /// Machine-readable records for UI annotations.
    pub detailed_fixes: Vec<FixRecord>,
}

/// Repair a byte sequence into valid JSON.
///
/// Never fails: every input produces well-formed output. Invalid UTF-8 is
/// decoded lossily and counts as a repair. Running the result through `fix`
/// again changes nothing and reports `was_fixed == false`, except for
/// inherently information-losing inputs (invalid escapes, Infinity/NaN)
/// which stabilize after the first pass.
#[tracing::instrument(skip_all, fields(input_len = input.len()))]
pub fn fix(input: &[u8], options: &RepairOptions) -> FixResult {
    let decoded = String::from_utf8_lossy(input);
    let lossy = matches!(decoded, Cow::Owned(_));

    let cleaned = clean::clean(&decoded);
    let builder = TreeBuilder::new(Lexer::new(&cleaned.text));
    let outcome = builder.build(options.wrap_multiple_roots);
    let text = emit::write_node(&outcome.root, options);

    let index = LineIndex::new(&decoded);
    let mut raw: Vec<RawFix> = cleaned.fixes.clone();
    for mut fix in outcome.fixes {
        fix.offset = cleaned.original_offset(fix.offset);
        raw.push(fix);
    }
    raw.sort_by_key(|fix| fix.offset);

    let mut seen = HashSet::new();
    let mut detailed_fixes = Vec::with_capacity(raw.len());
    for fix in raw {
        let record = fix.resolve(&index);
        if seen.insert((record.kind, record.line, record.column)) {
            detailed_fixes.push(record);
        }
    }

    let was_fixed = detailed_fixes
        .iter()
        .any(|record| record.kind != FixKind::DuplicateKey)
        || lossy
        || outcome.stray_tokens > 0
        || outcome.skipped_garbage > 0;
    let fixes = detailed_fixes
        .iter()
        .map(|record| record.message.clone())
        .collect();

    tracing::debug!(
        fix_count = detailed_fixes.len(),
        was_fixed,
        output_len = text.len(),
        "repair pass complete"
    );

    FixResult {
        text,
        was_fixed,
        fixes,
        detailed_fixes,
    }
}

/// Parse bytes into the tolerant value tree, discarding the fix list.
///
/// For structural inspection: the tree preserves member order, duplicate
/// keys, and canonical number strings, and each node's `was_repaired` bit
/// says whether its subtree needed recovery.
pub fn parse(input: &[u8]) -> Node {
    let decoded = String::from_utf8_lossy(input);
    let cleaned = clean::clean(&decoded);
    let builder = TreeBuilder::new(Lexer::new(&cleaned.text));
    builder.build(true).root
}
