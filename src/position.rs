//! Position mapping: locating edits at exact line/column coordinates
//!
//! Walks an edit script with two independent cursors (one per side) and
//! records where every inserted or deleted span starts and ends. `Equal`
//! operations advance both cursors, `Insert` only the new-side cursor and
//! `Delete` only the old-side cursor; columns reset to zero at every line
//! terminator. The resulting spans are what a presentation layer needs to
//! underline the exact changed substrings inside otherwise-unchanged lines.

use crate::types::{DiffOp, LineRange, LineRangeSet, OpKind, Pos, PositionedSpan, SpanKind, SpanSet};

/// Compute character-accurate spans for every insert and delete in an edit
/// script. Used for word/char-granularity highlighting.
pub fn positioned_spans(ops: &[DiffOp]) -> SpanSet {
    let mut old = Pos::default();
    let mut new = Pos::default();
    let mut set = SpanSet::default();

    for op in ops {
        match op.kind {
            OpKind::Equal => {
                old.advance(&op.text);
                new.advance(&op.text);
            }
            OpKind::Delete => {
                let start = old;
                old.advance(&op.text);
                set.removed.push(span(start, old, SpanKind::Removed, &op.text));
            }
            OpKind::Insert => {
                let start = new;
                new.advance(&op.text);
                set.added.push(span(start, new, SpanKind::Added, &op.text));
            }
        }
    }
    set
}

fn span(start: Pos, end: Pos, kind: SpanKind, text: &str) -> PositionedSpan {
    PositionedSpan {
        start_line: start.line,
        start_char: start.ch,
        end_line: end.line,
        end_char: end.ch,
        kind,
        text: text.to_string(),
    }
}

/// Compute changed whole-line ranges per side, the line-mode companion of
/// [`positioned_spans`]. Intended for edit scripts whose operations end on
/// line boundaries (line granularity).
pub fn changed_line_ranges(ops: &[DiffOp]) -> LineRangeSet {
    let mut old_line = 0usize;
    let mut new_line = 0usize;
    let mut set = LineRangeSet::default();

    for op in ops {
        let terminators = op.text.matches('\n').count();
        // A run without a trailing terminator still occupies one more line
        let covered = if op.text.ends_with('\n') {
            terminators
        } else {
            terminators + 1
        };
        match op.kind {
            OpKind::Equal => {
                old_line += terminators;
                new_line += terminators;
            }
            OpKind::Delete => {
                set.removed.push(LineRange { from: old_line, to: old_line + covered });
                old_line += terminators;
            }
            OpKind::Insert => {
                set.added.push(LineRange { from: new_line, to: new_line + covered });
                new_line += terminators;
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{diff_lines, diff_words};

    #[test]
    fn test_no_changes_no_spans() {
        let set = positioned_spans(&diff_words("same text\n", "same text\n"));
        assert!(set.removed.is_empty());
        assert!(set.added.is_empty());
    }

    #[test]
    fn test_whole_token_replacement() {
        let set = positioned_spans(&diff_words("foo\n", "bar\n"));
        assert_eq!(set.removed.len(), 1);
        assert_eq!(set.added.len(), 1);
        let removed = &set.removed[0];
        assert_eq!(
            (removed.start_line, removed.start_char, removed.end_line, removed.end_char),
            (0, 0, 0, 3)
        );
        assert_eq!(removed.text, "foo");
        assert_eq!(removed.kind, SpanKind::Removed);
        let added = &set.added[0];
        assert_eq!(
            (added.start_line, added.start_char, added.end_line, added.end_char),
            (0, 0, 0, 3)
        );
        assert_eq!(added.text, "bar");
    }

    #[test]
    fn test_word_change_on_later_line() {
        let set = positioned_spans(&diff_words("aa bb\ncc dd\n", "aa bb\ncc ee\n"));
        assert_eq!(set.removed.len(), 1);
        let removed = &set.removed[0];
        assert_eq!((removed.start_line, removed.start_char), (1, 3));
        assert_eq!((removed.end_line, removed.end_char), (1, 5));
        assert_eq!(removed.text, "dd");
    }

    #[test]
    fn test_span_crossing_line_boundary() {
        let ops = vec![
            DiffOp::equal("head "),
            DiffOp::insert("one\ntwo"),
            DiffOp::equal(" tail\n"),
        ];
        let set = positioned_spans(&ops);
        let added = &set.added[0];
        assert_eq!((added.start_line, added.start_char), (0, 5));
        assert_eq!((added.end_line, added.end_char), (1, 3));
    }

    #[test]
    fn test_column_resets_after_terminator() {
        let ops = vec![DiffOp::equal("ab\n"), DiffOp::insert("xy")];
        let set = positioned_spans(&ops);
        assert_eq!((set.added[0].start_line, set.added[0].start_char), (1, 0));
    }

    #[test]
    fn test_line_ranges_for_insertion() {
        let set = changed_line_ranges(&diff_lines("a\nb\n", "a\nx\nb\n"));
        assert!(set.removed.is_empty());
        assert_eq!(set.added, vec![LineRange { from: 1, to: 2 }]);
    }

    #[test]
    fn test_line_ranges_for_deletion() {
        let set = changed_line_ranges(&diff_lines("a\nb\nc\n", "a\nc\n"));
        assert_eq!(set.removed, vec![LineRange { from: 1, to: 2 }]);
        assert!(set.added.is_empty());
    }

    #[test]
    fn test_line_ranges_unterminated_tail() {
        let set = changed_line_ranges(&diff_lines("a\nfoo", "a\nbar"));
        assert_eq!(set.removed, vec![LineRange { from: 1, to: 2 }]);
        assert_eq!(set.added, vec![LineRange { from: 1, to: 2 }]);
    }
}
