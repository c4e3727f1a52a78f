//! # Twinpane
//!
//! A text comparison engine for side-by-side pane views: it diffs two
//! documents, projects the result into the shapes a presentation layer
//! needs (changed-line chunks, character-accurate spans, alignment
//! spacers, scroll mappings, collapsible stretches) and manages the
//! recompute lifecycle of a live editing session.
//!
//! ## Pipeline
//!
//! - **[`diff`]**: token-level edit scripts (Myers) with semantic cleanup,
//!   at line or word granularity
//! - **[`chunks`]**: collapse an edit script into whole-line change regions
//! - **[`position`]**: exact line/column spans for inline highlighting
//! - **[`align`]**: spacer plans that keep chunk boundaries level across panes
//! - **[`scroll`]**: map one pane's scroll position onto its partner
//! - **[`collapse`]**: find long unchanged stretches worth folding away
//! - **[`session`]**: per-comparison state: debounce, request ids, staleness
//! - **[`worker`]**: background diff thread and its JSON wire protocol
//!
//! The engine never renders anything. Pane measurements come in through
//! the [`PaneGeometry`] trait and results go out as plain data.
//!
//! ## Example
//!
//! ```
//! use twinpane::{diff_lines, chunks, Chunk};
//!
//! let ops = diff_lines("a\nb\nc\n", "a\nx\nc\n");
//! assert_eq!(
//!     chunks(&ops),
//!     vec![Chunk { old_from: 1, old_to: 2, new_from: 1, new_to: 2 }]
//! );
//! ```

pub mod align;
pub mod chunks;
pub mod collapse;
pub mod diff;
pub mod error;
pub mod position;
pub mod scroll;
pub mod session;
pub mod types;
pub mod worker;

mod tokenize;

pub use align::{aligned_line_triples, compute_alignment, matching_pane_line};
pub use chunks::chunks;
pub use collapse::collapsible_stretches;
pub use diff::{cleanup_semantic, diff_lines, diff_text, diff_words};
pub use error::{Result, TwinpaneError};
pub use position::{changed_line_ranges, positioned_spans};
pub use scroll::{chunk_boundaries_around, map_scroll_position, ScrollEcho};
pub use session::{DebouncePolicy, DiffResult, DiffSession, EditKind, SessionState};
pub use types::{
    AlignedLines, AlignmentPlan, Chunk, DiffOp, Granularity, LineRange, LineRangeSet,
    OpKind, PaneGeometry, PositionedSpan, ScrollInfo, ScrollTarget, Side, Spacer,
    SpanKind, SpanSet, Stretch, SyncMode,
};
pub use worker::{handle_json, handle_request, DiffWorker, WorkerRequest, WorkerResponse};
