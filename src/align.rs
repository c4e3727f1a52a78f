//! Alignment engine: vertical padding so chunk boundaries line up
//!
//! In a three-pane layout (left original, shared edit pane, right original)
//! each original pane has its own chunk list relating it to the edit pane.
//! This module merges the chunk end boundaries of both relations into a
//! single sorted list of aligned line triples, then measures each pane's
//! height up to every boundary and emits spacers for the panes that fall
//! short of the tallest one.
//!
//! Lines outside any chunk map between panes by the running offset between
//! matched unchanged regions; a line inside a chunk has no counterpart and
//! maps to `None`.

use crate::types::{AlignedLines, AlignmentPlan, Chunk, PaneGeometry, Spacer};

/// Map an edit-pane line to the corresponding original-pane line via the
/// given chunk list, or `None` when the line falls inside a chunk.
pub fn matching_pane_line(edit_line: usize, chunks: &[Chunk]) -> Option<usize> {
    let mut edit_start = 0usize;
    let mut orig_start = 0usize;
    for chunk in chunks {
        if chunk.new_to > edit_line && chunk.new_from <= edit_line {
            return None;
        }
        if chunk.new_from > edit_line {
            break;
        }
        edit_start = chunk.new_to;
        orig_start = chunk.old_to;
    }
    Some(orig_start + (edit_line - edit_start))
}

/// Merge the chunk end boundaries of up to two diff relations into sorted,
/// deduplicated aligned-line triples `[left, edit, right]`.
///
/// A boundary contributed by only one relation is back-mapped into the other
/// pane through that pane's own chunk list. With a single relation the
/// missing pane's entries are `None`, which also covers 2-pane layouts.
pub fn aligned_line_triples(
    left: Option<&[Chunk]>,
    right: Option<&[Chunk]>,
) -> Vec<AlignedLines> {
    let mut triples: Vec<AlignedLines> = Vec::new();

    if let Some(left_chunks) = left {
        for chunk in left_chunks {
            let right_line =
                right.and_then(|rc| matching_pane_line(chunk.new_to, rc));
            triples.push([Some(chunk.old_to), Some(chunk.new_to), right_line]);
        }
    }

    if let Some(right_chunks) = right {
        for chunk in right_chunks {
            let edit_line = chunk.new_to;
            match triples.binary_search_by_key(&edit_line, edit_key) {
                // Already aligned by the left relation
                Ok(_) => {}
                Err(insert_at) => {
                    let left_line =
                        left.and_then(|lc| matching_pane_line(edit_line, lc));
                    triples.insert(
                        insert_at,
                        [left_line, Some(edit_line), Some(chunk.old_to)],
                    );
                }
            }
        }
    }

    triples
}

fn edit_key(triple: &AlignedLines) -> usize {
    // The edit entry of a triple is always present
    triple[1].unwrap_or(0)
}

/// Compute the spacer plan that makes every aligned boundary sit at the same
/// vertical offset across panes.
///
/// `panes` is indexed like the triples: `[left, edit, right]`; absent panes
/// are `None` and receive no spacers. For each boundary the tallest pane
/// sets the target and every other pane gets a spacer above the boundary
/// line covering the difference (differences of at most one unit are
/// ignored). A boundary past a pane's last line attaches its spacer below
/// the final line instead.
pub fn compute_alignment(
    panes: [Option<&dyn PaneGeometry>; 3],
    triples: &[AlignedLines],
) -> AlignmentPlan {
    let mut plan = AlignmentPlan::new();
    for triple in triples {
        let mut offsets = [None::<f64>; 3];
        let mut max_offset = 0f64;
        for (i, pane) in panes.iter().enumerate() {
            if let (Some(pane), Some(line)) = (pane, triple[i]) {
                let off = pane.height_at_line(line);
                offsets[i] = Some(off);
                max_offset = max_offset.max(off);
            }
        }
        for (i, pane) in panes.iter().enumerate() {
            if let (Some(pane), Some(off), Some(line)) = (pane, offsets[i], triple[i]) {
                let shortfall = max_offset - off;
                if shortfall > 1.0 {
                    plan.push(pad_above(*pane, line, shortfall, i));
                }
            }
        }
    }
    plan
}

fn pad_above(pane: &dyn PaneGeometry, line: usize, height: f64, index: usize) -> Spacer {
    if line > pane.last_line() {
        Spacer { pane: index, line: line - 1, height, above: false }
    } else {
        Spacer { pane: index, line, height, above: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScrollInfo;

    struct UniformPane {
        lines: usize,
        line_height: f64,
    }

    impl PaneGeometry for UniformPane {
        fn height_at_line(&self, line: usize) -> f64 {
            line as f64 * self.line_height
        }
        fn line_at_height(&self, y: f64) -> usize {
            (y / self.line_height).floor().max(0.0) as usize
        }
        fn last_line(&self) -> usize {
            self.lines - 1
        }
        fn scroll_info(&self) -> ScrollInfo {
            ScrollInfo { top: 0.0, left: 0.0, client_height: 100.0, height: self.lines as f64 * self.line_height }
        }
    }

    fn chunk(old_from: usize, old_to: usize, new_from: usize, new_to: usize) -> Chunk {
        Chunk { old_from, old_to, new_from, new_to }
    }

    #[test]
    fn test_matching_line_before_any_chunk() {
        let chunks = vec![chunk(5, 7, 5, 6)];
        assert_eq!(matching_pane_line(2, &chunks), Some(2));
    }

    #[test]
    fn test_matching_line_after_chunk_applies_offset() {
        // Old side lost one line relative to new at the chunk
        let chunks = vec![chunk(5, 7, 5, 6)];
        assert_eq!(matching_pane_line(8, &chunks), Some(9));
    }

    #[test]
    fn test_matching_line_inside_chunk_is_none() {
        let chunks = vec![chunk(5, 7, 5, 6)];
        assert_eq!(matching_pane_line(5, &chunks), None);
    }

    #[test]
    fn test_matching_line_no_chunks_is_identity() {
        assert_eq!(matching_pane_line(13, &[]), Some(13));
    }

    #[test]
    fn test_triples_from_single_relation() {
        let left = vec![chunk(0, 2, 0, 3)];
        let triples = aligned_line_triples(Some(&left), None);
        assert_eq!(triples, vec![[Some(2), Some(3), None]]);
    }

    #[test]
    fn test_triples_merge_two_relations() {
        let left = vec![chunk(0, 2, 0, 3)];
        let right = vec![chunk(1, 2, 1, 2)];
        let triples = aligned_line_triples(Some(&left), Some(&right));
        assert_eq!(
            triples,
            vec![
                // Right boundary at edit line 2 falls inside the left chunk
                [None, Some(2), Some(2)],
                // Left boundary at edit line 3 back-maps through the right list
                [Some(2), Some(3), Some(3)],
            ]
        );
    }

    #[test]
    fn test_triples_deduplicate_shared_boundary() {
        let left = vec![chunk(0, 1, 0, 1)];
        let right = vec![chunk(0, 2, 0, 1)];
        let triples = aligned_line_triples(Some(&left), Some(&right));
        assert_eq!(triples, vec![[Some(1), Some(1), Some(2)]]);
    }

    #[test]
    fn test_alignment_pads_shorter_panes() {
        let left = UniformPane { lines: 50, line_height: 10.0 };
        let edit = UniformPane { lines: 50, line_height: 10.0 };
        let right = UniformPane { lines: 50, line_height: 10.0 };
        let triples = vec![[Some(10), Some(12), Some(8)]];
        let plan = compute_alignment(
            [Some(&left), Some(&edit), Some(&right)],
            &triples,
        );
        assert_eq!(
            plan,
            vec![
                Spacer { pane: 0, line: 10, height: 20.0, above: true },
                Spacer { pane: 2, line: 8, height: 40.0, above: true },
            ]
        );
    }

    #[test]
    fn test_alignment_skips_tiny_differences() {
        let a = UniformPane { lines: 10, line_height: 10.0 };
        let b = UniformPane { lines: 10, line_height: 10.0 };
        let triples = vec![[Some(4), Some(4), None]];
        let plan = compute_alignment([Some(&a), Some(&b), None], &triples);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_alignment_boundary_past_last_line_pads_below() {
        let short = UniformPane { lines: 5, line_height: 10.0 };
        let tall = UniformPane { lines: 9, line_height: 10.0 };
        let triples = vec![[Some(5), Some(9), None]];
        let plan = compute_alignment([Some(&short), Some(&tall), None], &triples);
        assert_eq!(
            plan,
            vec![Spacer { pane: 0, line: 4, height: 40.0, above: false }]
        );
    }

    #[test]
    fn test_alignment_ignores_absent_panes() {
        let edit = UniformPane { lines: 10, line_height: 10.0 };
        let triples = vec![[None, Some(3), None]];
        let plan = compute_alignment([None, Some(&edit), None], &triples);
        assert!(plan.is_empty());
    }
}
