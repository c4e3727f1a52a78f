//! Chunk extraction: collapsing an edit script into changed line regions
//!
//! Walks an edit script with a cursor pair (old line, new line) and closes a
//! chunk whenever an `Equal` run crosses a clean line boundary. An equal run
//! that starts or ends mid-line is absorbed into the surrounding chunk, so a
//! chunk always covers whole lines on both sides.
//!
//! Every changed line belongs to exactly one chunk and unchanged lines
//! belong to none; chunks come out in ascending, non-overlapping order.

use crate::types::{Chunk, DiffOp, OpKind, Pos};
use tracing::warn;

/// Collapse an edit script into contiguous change regions with line ranges
/// in both documents.
///
/// A chunk with `old_from == old_to` is a pure insertion and one with
/// `new_from == new_to` a pure deletion. A chunk that would be empty on both
/// sides is an internal invariant violation; it is dropped with a warning
/// rather than emitted.
pub fn chunks(ops: &[DiffOp]) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut start_old = 0usize;
    let mut start_new = 0usize;
    let mut old = Pos::default();
    let mut new = Pos::default();

    for (i, op) in ops.iter().enumerate() {
        match op.kind {
            OpKind::Equal => {
                let start_off = usize::from(!start_of_line_clean(ops, i));
                let clean_from_old = old.line + start_off;
                let clean_from_new = new.line + start_off;
                old.advance(&op.text);
                new.advance(&op.text);
                let end_off = usize::from(end_of_line_clean(ops, i));
                let clean_to_old = old.line + end_off;
                let clean_to_new = new.line + end_off;
                if clean_to_new > clean_from_new {
                    if i > 0 {
                        push_chunk(
                            &mut out,
                            Chunk {
                                old_from: start_old,
                                old_to: clean_from_old,
                                new_from: start_new,
                                new_to: clean_from_new,
                            },
                        );
                    }
                    start_old = clean_to_old;
                    start_new = clean_to_new;
                }
            }
            OpKind::Insert => new.advance(&op.text),
            OpKind::Delete => old.advance(&op.text),
        }
    }

    // Close the trailing chunk. A cursor resting at column zero sits just
    // past the last affected line; mid-line it is still on one.
    let old_to = old.line + usize::from(old.ch > 0);
    let new_to = new.line + usize::from(new.ch > 0);
    if start_old < old_to || start_new < new_to {
        push_chunk(
            &mut out,
            Chunk {
                old_from: start_old,
                old_to: old_to.max(start_old),
                new_from: start_new,
                new_to: new_to.max(start_new),
            },
        );
    }
    out
}

fn push_chunk(out: &mut Vec<Chunk>, chunk: Chunk) {
    if chunk.is_degenerate() {
        warn!(?chunk, "dropping zero-content chunk");
        return;
    }
    out.push(chunk);
}

/// An equal run starts cleanly when the preceding operation ends with a line
/// terminator (looking one further back to catch an edit pair that together
/// ends a line).
fn start_of_line_clean(ops: &[DiffOp], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    if !ops[i - 1].text.ends_with('\n') {
        return false;
    }
    if i == 1 {
        return true;
    }
    ops[i - 2].text.ends_with('\n')
}

/// An equal run ends cleanly when the following operation begins a fresh
/// line (starts with a terminator and carries more text after it), with the
/// symmetric one-further lookahead.
fn end_of_line_clean(ops: &[DiffOp], i: usize) -> bool {
    if i == ops.len() - 1 {
        return true;
    }
    let next = &ops[i + 1].text;
    if next.len() == 1 || !next.starts_with('\n') {
        return false;
    }
    if i == ops.len() - 2 {
        return true;
    }
    let next = &ops[i + 2].text;
    next.len() > 1 && next.starts_with('\n')
}
