//! Scroll synchronization between paired panes
//!
//! Maps one pane's scroll position to the equivalent position in its paired
//! pane. When panes are boundary-aligned the top offset transfers directly;
//! otherwise the mapper interpolates: it finds the chunk boundaries around
//! the source viewport's vertical midpoint, computes the midpoint's
//! fractional position between them in source pixel space and applies the
//! same fraction to the corresponding boundaries in the target pane. Near
//! the document edges the raw target is blended with the edge-anchored
//! offset so neither pane shows out-of-bounds space the other does not.
//!
//! [`ScrollEcho`] suppresses the feedback loop that arises when both panes
//! react to each other's scroll events: a pane written by the mapper ignores
//! scroll events it emits within a short window of that write.

use crate::types::{Chunk, PaneGeometry, ScrollTarget, Side, SyncMode};
use std::time::{Duration, Instant};
use tracing::trace;

/// A chunk boundary expressed as the lines just before and after a point,
/// `None` at the document edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundary {
    /// Nearest boundary line at or before the reference point
    pub before: Option<usize>,
    /// Nearest boundary line after the reference point
    pub after: Option<usize>,
}

/// Chunk boundaries around a line, in both coordinate systems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryPair {
    /// Boundaries in edit-pane (new document) lines
    pub edit: Boundary,
    /// Boundaries in original-pane (old document) lines
    pub orig: Boundary,
}

/// Find the chunk boundaries immediately surrounding `line`, where `line`
/// is an edit-pane line if `line_in_edit`, an original-pane line otherwise.
pub fn chunk_boundaries_around(
    chunks: &[Chunk],
    line: usize,
    line_in_edit: bool,
) -> BoundaryPair {
    let mut pair = BoundaryPair::default();
    for chunk in chunks {
        let (from_local, to_local) = if line_in_edit {
            (chunk.new_from, chunk.new_to)
        } else {
            (chunk.old_from, chunk.old_to)
        };
        if pair.edit.after.is_none() {
            if from_local > line {
                pair.edit.after = Some(chunk.new_from);
                pair.orig.after = Some(chunk.old_from);
            } else if to_local > line {
                pair.edit.after = Some(chunk.new_to);
                pair.orig.after = Some(chunk.old_to);
            }
        }
        if to_local <= line {
            pair.edit.before = Some(chunk.new_to);
            pair.orig.before = Some(chunk.old_to);
        } else if from_local <= line {
            pair.edit.before = Some(chunk.new_from);
            pair.orig.before = Some(chunk.old_from);
        }
    }
    pair
}

/// Pixel offsets of a boundary's enclosing span in one pane: the `before`
/// line's top and the `after` line's top, defaulting to the document edges.
fn offsets(pane: &dyn PaneGeometry, boundary: Boundary) -> (f64, f64) {
    let top = pane.height_at_line(boundary.before.unwrap_or(0));
    let bot = pane.height_at_line(boundary.after.unwrap_or(pane.last_line() + 1));
    (top, bot)
}

/// Map the source pane's current scroll position to the equivalent position
/// in the target pane.
///
/// `source_is_edit` states which document the source pane holds: the edit
/// (new) document or an original (old) document; `chunks` is the relation
/// between the two panes. The horizontal offset always transfers directly.
pub fn map_scroll_position(
    source: &dyn PaneGeometry,
    target: &dyn PaneGeometry,
    chunks: &[Chunk],
    source_is_edit: bool,
    mode: SyncMode,
) -> ScrollTarget {
    let info = source.scroll_info();
    if mode == SyncMode::Aligned {
        // Aligned panes occupy identical vertical space
        return ScrollTarget { top: info.top, left: info.left };
    }

    let half_screen = 0.5 * info.client_height;
    let mid_y = info.top + half_screen;
    let mid_line = source.line_at_height(mid_y);
    let around = chunk_boundaries_around(chunks, mid_line, source_is_edit);
    let (local, other) = if source_is_edit {
        (around.edit, around.orig)
    } else {
        (around.orig, around.edit)
    };
    let (top, bot) = offsets(source, local);
    let (other_top, other_bot) = offsets(target, other);

    let span = bot - top;
    let ratio = if span > 0.0 { (mid_y - top) / span } else { 0.0 };
    let mut target_pos = other_top - half_screen + ratio * (other_bot - other_top);
    trace!(mid_line, ratio, target_pos, "ratio-mapped scroll position");

    // Blend toward the raw edge-anchored offset near the top and bottom so
    // no content is stranded off-screen in either pane. The top blend only
    // applies within half a screen of the top; past that the bottom branch
    // still gets its chance.
    let top_mix = info.top / half_screen;
    if target_pos > info.top && top_mix < 1.0 {
        target_pos = target_pos * top_mix + info.top * (1.0 - top_mix);
    } else {
        let bot_dist = info.height - info.client_height - info.top;
        if bot_dist < half_screen {
            let other_info = target.scroll_info();
            let other_bot_dist = other_info.height - other_info.client_height - target_pos;
            if other_bot_dist > bot_dist {
                let mix = bot_dist / half_screen;
                if mix < 1.0 {
                    let anchored = other_info.height - other_info.client_height - bot_dist;
                    target_pos = target_pos * mix + anchored * (1.0 - mix);
                }
            }
        }
    }

    ScrollTarget { top: target_pos, left: info.left }
}

/// Feedback-loop suppression for scroll synchronization.
///
/// Any component that both receives and triggers scroll events records its
/// own writes here; a scroll event arriving within the suppression window
/// of our own write to that side is an echo and must be ignored. One value
/// per diff session, never a global.
#[derive(Debug)]
pub struct ScrollEcho {
    window: Duration,
    last_write: Option<(Side, Instant)>,
}

impl ScrollEcho {
    /// Default suppression window matching interactive scroll latency.
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(50);

    /// Create an echo guard with the default window
    pub fn new() -> Self {
        Self::with_window(Self::DEFAULT_WINDOW)
    }

    /// Create an echo guard with a custom suppression window
    pub fn with_window(window: Duration) -> Self {
        ScrollEcho { window, last_write: None }
    }

    /// Record that we just set `side`'s scroll position
    pub fn note_write(&mut self, side: Side) {
        self.last_write = Some((side, Instant::now()));
    }

    /// True when a scroll event from `side` should be ignored because we
    /// wrote that pane's position within the suppression window.
    pub fn should_suppress(&self, side: Side) -> bool {
        matches!(
            self.last_write,
            Some((written, at)) if written == side && at.elapsed() < self.window
        )
    }
}

impl Default for ScrollEcho {
    fn default() -> Self {
        Self::new()
    }
}
