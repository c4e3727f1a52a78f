//! Minimal edit-script computation between two documents
//!
//! This module implements the diff core: a Myers O(ND) shortest-edit-script
//! search over interned token symbols, followed by a semantic cleanup pass
//! that merges edits to human-meaningful boundaries.
//!
//! ## Overview
//!
//! 1. Both documents are tokenized and interned ([`crate::tokenize`]) so the
//!    search compares `u32` symbols instead of strings.
//! 2. A common prefix and suffix are trimmed before the search; this is a
//!    pure optimization that anchors unchanged context to the earliest
//!    possible alignment.
//! 3. The Myers search breaks ties deterministically, so identical inputs
//!    always produce identical scripts.
//! 4. Cleanup merges adjacent operations of the same kind, drops empty
//!    operations and absorbs short equal runs sandwiched between edits, so
//!    the chunk extractor sees one contiguous region instead of several
//!    fragments separated by trivial equalities.
//!
//! Symbol comparison is exact: case-sensitive and whitespace-sensitive
//! unless the caller pre-normalizes the text.
//!
//! ## Examples
//!
//! ```rust
//! use twinpane::{diff_lines, OpKind};
//!
//! let ops = diff_lines("a\nb\n", "a\nx\nb\n");
//! assert_eq!(ops.len(), 3);
//! assert_eq!(ops[1].kind, OpKind::Insert);
//! assert_eq!(ops[1].text, "x\n");
//! ```

use crate::tokenize::{intern, Interned};
use crate::types::{DiffOp, Granularity, OpKind};
use tracing::{debug, trace};

/// Compute a line-granularity edit script between two documents.
///
/// Each token is a full line including its terminator; the last line of an
/// unterminated document is a token without one. An empty document on either
/// side yields a single `Insert`/`Delete` covering the whole other document.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffOp> {
    diff_text(old, new, Granularity::Line)
}

/// Compute a word-granularity edit script between two documents.
///
/// Tokens alternate between runs of non-whitespace and runs of whitespace,
/// which keeps the script lossless while letting the position mapper locate
/// changed words inside otherwise-unchanged lines.
pub fn diff_words(old: &str, new: &str) -> Vec<DiffOp> {
    diff_text(old, new, Granularity::Word)
}

/// Compute an edit script at the requested granularity.
///
/// The result satisfies the round-trip invariant: concatenating the text of
/// all `Equal` and `Delete` operations reconstructs `old`, and `Equal` plus
/// `Insert` reconstructs `new`. The script is already cleaned: no empty
/// operations, no two consecutive operations of the same kind.
pub fn diff_text(old: &str, new: &str, granularity: Granularity) -> Vec<DiffOp> {
    debug!(
        old_len = old.len(),
        new_len = new.len(),
        ?granularity,
        "computing edit script"
    );
    let Interned { old: a, new: b, table } = intern(old, new, granularity);
    let steps = myers_steps(&a, &b);
    trace!(steps = steps.len(), symbols = table.len(), "edit script found");

    // Fold per-token steps into text runs
    let mut ops: Vec<DiffOp> = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    for step in steps {
        let token = match step {
            OpKind::Equal => {
                let t = table[a[i] as usize];
                i += 1;
                j += 1;
                t
            }
            OpKind::Delete => {
                let t = table[a[i] as usize];
                i += 1;
                t
            }
            OpKind::Insert => {
                let t = table[b[j] as usize];
                j += 1;
                t
            }
        };
        match ops.last_mut() {
            Some(last) if last.kind == step => last.text.push_str(token),
            _ => ops.push(DiffOp { kind: step, text: token.to_string() }),
        }
    }

    cleanup_semantic(ops)
}

/// Semantic cleanup of an edit script.
///
/// Merges adjacent operations of the same kind, removes operations with
/// empty text, and reassigns short equal runs flanked by edits on both
/// sides: an equality no longer than either neighbouring edit is split into
/// a `Delete` and an `Insert` carrying the same text, which then merge into
/// the neighbours. Net content is unchanged on both sides; the number of
/// distinct change regions only ever shrinks.
///
/// The pass runs to a fixed point, so applying it to already-cleaned input
/// returns an identical script.
pub fn cleanup_semantic(mut ops: Vec<DiffOp>) -> Vec<DiffOp> {
    loop {
        ops = merge_adjacent(ops);
        let (absorbed, changed) = absorb_short_equalities(ops);
        ops = absorbed;
        if !changed {
            return ops;
        }
    }
}

/// Drop empty operations and merge consecutive operations of the same kind.
fn merge_adjacent(ops: Vec<DiffOp>) -> Vec<DiffOp> {
    let mut out: Vec<DiffOp> = Vec::with_capacity(ops.len());
    for op in ops {
        if op.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.kind == op.kind => last.text.push_str(&op.text),
            _ => out.push(op),
        }
    }
    out
}

/// Split equalities that are no longer than both flanking edits into a
/// delete/insert pair of the same text. The emission order is chosen so the
/// pieces merge with their neighbours rather than fragmenting the script.
fn absorb_short_equalities(ops: Vec<DiffOp>) -> (Vec<DiffOp>, bool) {
    let mut out: Vec<DiffOp> = Vec::with_capacity(ops.len());
    let mut changed = false;
    let mut iter = ops.into_iter().peekable();
    while let Some(op) = iter.next() {
        let absorb = op.kind == OpKind::Equal
            && matches!(out.last(), Some(prev) if prev.kind != OpKind::Equal)
            && matches!(iter.peek(), Some(next) if next.kind != OpKind::Equal)
            && out.last().is_some_and(|prev| op.text.len() <= prev.text.len())
            && iter.peek().is_some_and(|next| op.text.len() <= next.text.len());
        if absorb {
            trace!(len = op.text.len(), "absorbing short equality into flanking edits");
            changed = true;
            // Emit the piece matching the previous edit first so both halves
            // merge with their neighbours.
            let prev_kind = out.last().map(|prev| prev.kind);
            let (first, second) = if prev_kind == Some(OpKind::Insert) {
                (OpKind::Insert, OpKind::Delete)
            } else {
                (OpKind::Delete, OpKind::Insert)
            };
            out.push(DiffOp { kind: first, text: op.text.clone() });
            out.push(DiffOp { kind: second, text: op.text });
        } else {
            out.push(op);
        }
    }
    (out, changed)
}

/// Per-token edit steps in document order, computed with the Myers
/// shortest-edit-script algorithm over symbol sequences.
fn myers_steps(a: &[u32], b: &[u32]) -> Vec<OpKind> {
    // Anchor unchanged context at both ends before the search
    let prefix = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut steps = vec![OpKind::Equal; prefix];
    steps.extend(myers_core(
        &a[prefix..a.len() - suffix],
        &b[prefix..b.len() - suffix],
    ));
    steps.extend(std::iter::repeat(OpKind::Equal).take(suffix));
    steps
}

/// Greedy forward Myers search with full trace, then backtracking.
fn myers_core(a: &[u32], b: &[u32]) -> Vec<OpKind> {
    let n = a.len();
    let m = b.len();
    if n == 0 {
        return vec![OpKind::Insert; m];
    }
    if m == 0 {
        return vec![OpKind::Delete; n];
    }

    let max = n + m;
    let offset = max as isize;
    let mut v = vec![0usize; 2 * max + 1];
    let mut trace: Vec<Vec<usize>> = Vec::new();
    let mut found_d = 0isize;

    'search: for d in 0..=(max as isize) {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            // Tie-break: prefer stepping down (insertion) when the paths are
            // equally far, which keeps results deterministic.
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && a[x] == b[y] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                found_d = d;
                break 'search;
            }
            k += 2;
        }
    }

    // Walk the trace backwards from (n, m) to (0, 0)
    let mut steps: Vec<OpKind> = Vec::with_capacity(max);
    let mut x = n;
    let mut y = m;
    for d in (0..=found_d).rev() {
        if d == 0 {
            while x > 0 && y > 0 {
                steps.push(OpKind::Equal);
                x -= 1;
                y -= 1;
            }
            break;
        }
        let v = &trace[d as usize];
        let k = x as isize - y as isize;
        let prev_k = if k == -d || (k != d && v[(k - 1 + offset) as usize] < v[(k + 1 + offset) as usize])
        {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = (prev_x as isize - prev_k) as usize;
        while x > prev_x && y > prev_y {
            steps.push(OpKind::Equal);
            x -= 1;
            y -= 1;
        }
        if x == prev_x {
            steps.push(OpKind::Insert);
            y -= 1;
        } else {
            steps.push(OpKind::Delete);
            x -= 1;
        }
    }
    steps.reverse();
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old_side(ops: &[DiffOp]) -> String {
        ops.iter()
            .filter(|op| op.kind != OpKind::Insert)
            .map(|op| op.text.as_str())
            .collect()
    }

    fn new_side(ops: &[DiffOp]) -> String {
        ops.iter()
            .filter(|op| op.kind != OpKind::Delete)
            .map(|op| op.text.as_str())
            .collect()
    }

    fn assert_clean(ops: &[DiffOp]) {
        for op in ops {
            assert!(!op.text.is_empty(), "empty op in {:?}", ops);
        }
        for pair in ops.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "unmerged ops in {:?}", ops);
        }
    }

    #[test]
    fn test_identical_documents() {
        let ops = diff_lines("a\nb\n", "a\nb\n");
        assert_eq!(ops, vec![DiffOp::equal("a\nb\n")]);
    }

    #[test]
    fn test_both_empty() {
        assert!(diff_lines("", "").is_empty());
    }

    #[test]
    fn test_empty_old_is_single_insert() {
        let ops = diff_lines("", "x\ny\n");
        assert_eq!(ops, vec![DiffOp::insert("x\ny\n")]);
    }

    #[test]
    fn test_empty_new_is_single_delete() {
        let ops = diff_lines("a\nb", "");
        assert_eq!(ops, vec![DiffOp::delete("a\nb")]);
    }

    #[test]
    fn test_insertion_round_trip() {
        let ops = diff_lines("a\nb\n", "a\nx\nb\n");
        assert_eq!(old_side(&ops), "a\nb\n");
        assert_eq!(new_side(&ops), "a\nx\nb\n");
        assert_clean(&ops);
    }

    #[test]
    fn test_deletion_round_trip() {
        let ops = diff_lines("a\nb\nc\n", "a\nc\n");
        assert_eq!(old_side(&ops), "a\nb\nc\n");
        assert_eq!(new_side(&ops), "a\nc\n");
        assert_clean(&ops);
    }

    #[test]
    fn test_replacement() {
        let ops = diff_lines("foo\n", "bar\n");
        assert_eq!(ops.len(), 2);
        assert_eq!(old_side(&ops), "foo\n");
        assert_eq!(new_side(&ops), "bar\n");
    }

    #[test]
    fn test_word_diff_locates_changed_word() {
        let ops = diff_words("the quick fox", "the slow fox");
        assert_eq!(old_side(&ops), "the quick fox");
        assert_eq!(new_side(&ops), "the slow fox");
        assert!(ops
            .iter()
            .any(|op| op.kind == OpKind::Delete && op.text == "quick"));
        assert!(ops
            .iter()
            .any(|op| op.kind == OpKind::Insert && op.text == "slow"));
    }

    #[test]
    fn test_unterminated_last_line() {
        let ops = diff_lines("a\nb", "a\nc");
        assert_eq!(old_side(&ops), "a\nb");
        assert_eq!(new_side(&ops), "a\nc");
        assert_clean(&ops);
    }

    #[test]
    fn test_deterministic() {
        let a = "x\ny\nz\nx\ny\n";
        let b = "y\nx\nz\ny\nx\n";
        assert_eq!(diff_lines(a, b), diff_lines(a, b));
    }

    #[test]
    fn test_cleanup_merges_adjacent_and_drops_empty() {
        let ops = vec![
            DiffOp::delete("a"),
            DiffOp::equal(""),
            DiffOp::delete("b"),
            DiffOp::insert("c"),
            DiffOp::insert("d"),
        ];
        let cleaned = cleanup_semantic(ops);
        assert_eq!(cleaned, vec![DiffOp::delete("ab"), DiffOp::insert("cd")]);
    }

    #[test]
    fn test_cleanup_absorbs_sandwiched_equality() {
        let ops = vec![
            DiffOp::delete("alpha\n"),
            DiffOp::insert("ALPHA\n"),
            DiffOp::equal("x\n"),
            DiffOp::delete("beta\n"),
            DiffOp::insert("BETA\n"),
        ];
        let cleaned = cleanup_semantic(ops);
        // One contiguous edit region; content preserved on both sides
        assert_eq!(
            cleaned
                .iter()
                .filter(|op| op.kind == OpKind::Equal)
                .count(),
            0
        );
        let old: String = cleaned
            .iter()
            .filter(|op| op.kind != OpKind::Insert)
            .map(|op| op.text.as_str())
            .collect();
        let new: String = cleaned
            .iter()
            .filter(|op| op.kind != OpKind::Delete)
            .map(|op| op.text.as_str())
            .collect();
        assert_eq!(old, "alpha\nx\nbeta\n");
        assert_eq!(new, "ALPHA\nx\nBETA\n");
    }

    #[test]
    fn test_cleanup_keeps_long_equality() {
        let ops = vec![
            DiffOp::delete("a"),
            DiffOp::equal("a long stretch of shared text\n"),
            DiffOp::insert("b"),
        ];
        let cleaned = cleanup_semantic(ops.clone());
        assert_eq!(cleaned, ops);
    }

    #[test]
    fn test_cleanup_idempotent() {
        let ops = diff_lines("foo\nmid\nbar\n", "FOO\nmid\nBAR\n");
        let once = cleanup_semantic(ops);
        let twice = cleanup_semantic(once.clone());
        assert_eq!(once, twice);
    }
}
