//! Collapsing long identical stretches
//!
//! Large documents that differ in a few places waste most of their vertical
//! space on unchanged text. This module finds runs of edit-pane lines that
//! are unchanged in every active diff relation and far enough from any chunk
//! to be safely folded away. The caller decides how the fold is presented;
//! here we only report where the stretches are.

use crate::types::{Chunk, Stretch};
use tracing::debug;

/// Find maximal runs of unchanged edit-pane lines longer than `margin`,
/// keeping `margin` lines of context around every chunk.
///
/// `chunk_sets` holds one chunk list per active diff relation; a line must
/// be clear of all of them to be collapsible. Lines are edit-pane (new
/// document) coordinates and `total_lines` is the edit document's height.
pub fn collapsible_stretches(
    chunk_sets: &[&[Chunk]],
    total_lines: usize,
    margin: usize,
) -> Vec<Stretch> {
    let mut clear = vec![true; total_lines];
    for chunks in chunk_sets {
        unclear_near_chunks(chunks, margin, &mut clear);
    }

    let mut out = Vec::new();
    let mut i = 0;
    while i < clear.len() {
        if clear[i] {
            let line = i;
            let mut size = 1;
            while i + 1 < clear.len() && clear[i + 1] {
                i += 1;
                size += 1;
            }
            if size > margin {
                debug!(line, size, "collapsible stretch");
                out.push(Stretch { line, size });
            }
        }
        i += 1;
    }
    out
}

fn unclear_near_chunks(chunks: &[Chunk], margin: usize, clear: &mut [bool]) {
    for chunk in chunks {
        let from = chunk.new_from.saturating_sub(margin).min(clear.len());
        let to = (chunk.new_to + margin).min(clear.len());
        for flag in &mut clear[from..to] {
            *flag = false;
        }
    }
}
