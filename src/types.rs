//! Core data types shared across the twinpane engine
//!
//! This module contains the data structures that flow between the engine's
//! stages: edit-script operations, line chunks, character-accurate spans,
//! viewport descriptions and the outputs consumed by a presentation layer
//! (alignment plans, scroll targets, collapsible stretches).
//!
//! All wire-visible types derive `Serialize`/`Deserialize` with camelCase
//! field names so they match the worker protocol of the host editor.

use crate::error::TwinpaneError;
use serde::{Deserialize, Serialize};

/// Comparison granularity for a diff run.
///
/// `Line` treats each line (including its trailing terminator) as one token;
/// `Word` alternates runs of non-whitespace and whitespace so that
/// concatenating tokens always reproduces the input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One token per line, terminator included
    Line,
    /// One token per word or whitespace run
    Word,
}

impl Granularity {
    /// Wire discriminator used by the worker protocol (`0` = line, `1` = word)
    pub fn mode(self) -> u8 {
        match self {
            Granularity::Line => 0,
            Granularity::Word => 1,
        }
    }
}

impl TryFrom<u8> for Granularity {
    type Error = TwinpaneError;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(Granularity::Line),
            1 => Ok(Granularity::Word),
            other => Err(TwinpaneError::InvalidMode(other)),
        }
    }
}

/// Kind of a single diff operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Text present in both documents
    Equal,
    /// Text present only in the new document
    Insert,
    /// Text present only in the old document
    Delete,
}

/// One operation of an edit script over a run of tokens.
///
/// Invariant (after cleanup): the ordered concatenation of the `text` of all
/// `Delete` and `Equal` operations reconstructs the old document exactly, and
/// `Insert` plus `Equal` reconstructs the new document exactly. No operation
/// has empty text and no two consecutive operations share a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOp {
    /// Operation kind
    pub kind: OpKind,
    /// Concatenation of one or more tokens
    pub text: String,
}

impl DiffOp {
    /// Create an `Equal` operation
    pub fn equal(text: impl Into<String>) -> Self {
        DiffOp { kind: OpKind::Equal, text: text.into() }
    }

    /// Create an `Insert` operation
    pub fn insert(text: impl Into<String>) -> Self {
        DiffOp { kind: OpKind::Insert, text: text.into() }
    }

    /// Create a `Delete` operation
    pub fn delete(text: impl Into<String>) -> Self {
        DiffOp { kind: OpKind::Delete, text: text.into() }
    }
}

/// A `(line, column)` cursor into a document.
///
/// Columns are byte offsets within the line and reset to zero after every
/// line terminator the cursor walks over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pos {
    /// 0-based line index
    pub line: usize,
    /// 0-based column within the line
    pub ch: usize,
}

impl Pos {
    /// Advance the cursor over `text`, incrementing the line on every
    /// terminator and tracking the column within the final line.
    pub fn advance(&mut self, text: &str) {
        let mut at = 0;
        for (idx, _) in text.match_indices('\n') {
            self.line += 1;
            at = idx + 1;
        }
        self.ch = if at > 0 { text.len() - at } else { self.ch + text.len() };
    }
}

/// A maximal contiguous changed region with line ranges in both documents.
///
/// Ranges are half-open and 0-based. Chunks are produced in ascending,
/// non-overlapping order; `old_from == old_to` marks a pure insertion and
/// `new_from == new_to` a pure deletion, but never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// First changed line in the old document
    pub old_from: usize,
    /// One past the last changed line in the old document
    pub old_to: usize,
    /// First changed line in the new document
    pub new_from: usize,
    /// One past the last changed line in the new document
    pub new_to: usize,
}

impl Chunk {
    /// True when the chunk covers no lines on either side. Such a chunk is
    /// an internal invariant violation and must be dropped, not emitted.
    pub fn is_degenerate(&self) -> bool {
        self.old_from == self.old_to && self.new_from == self.new_to
    }
}

/// Which side of a span carries the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Present only in the old document
    Removed,
    /// Present only in the new document
    Added,
}

/// A character-accurate location of one inserted or deleted span, used for
/// inline highlighting nested within line-level chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedSpan {
    /// Line the span starts on (0-based)
    pub start_line: usize,
    /// Column the span starts at
    pub start_char: usize,
    /// Line the span ends on
    pub end_line: usize,
    /// Column the span ends at (exclusive)
    pub end_char: usize,
    /// Whether the span was removed or added
    pub kind: SpanKind,
    /// The span's text
    pub text: String,
}

/// Positioned spans for both sides of a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSet {
    /// Spans present only in the old document
    pub removed: Vec<PositionedSpan>,
    /// Spans present only in the new document
    pub added: Vec<PositionedSpan>,
}

/// A half-open range of whole lines on one side of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    /// First line of the range
    pub from: usize,
    /// One past the last line of the range
    pub to: usize,
}

/// Changed whole-line ranges for both sides, the line-mode analogue of
/// [`SpanSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRangeSet {
    /// Ranges deleted from the old document
    pub removed: Vec<LineRange>,
    /// Ranges inserted into the new document
    pub added: Vec<LineRange>,
}

/// Snapshot of a pane's scroll state, mirroring the host editor's
/// `getScrollInfo()` contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollInfo {
    /// Current vertical scroll offset in pixels
    pub top: f64,
    /// Current horizontal scroll offset in pixels
    pub left: f64,
    /// Visible height of the pane in pixels
    pub client_height: f64,
    /// Total content height in pixels
    pub height: f64,
}

/// Destination scroll offset for a paired pane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollTarget {
    /// Target vertical offset in pixels
    pub top: f64,
    /// Target horizontal offset in pixels
    pub left: f64,
}

/// One spacer of an [`AlignmentPlan`]: insert a blank widget of `height`
/// units adjacent to `line` in pane `pane` so chunk boundaries line up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spacer {
    /// Index of the pane receiving the spacer
    pub pane: usize,
    /// Line the spacer attaches to
    pub line: usize,
    /// Spacer height in the pane's pixel units
    pub height: f64,
    /// Whether the spacer sits above the line (below when the boundary falls
    /// past the last line of the pane)
    pub above: bool,
}

/// Instructions for the presentation layer to vertically align panes.
pub type AlignmentPlan = Vec<Spacer>;

/// Lines that correspond to one chunk boundary across up to three panes,
/// indexed `[left-original, edit, right-original]`. An entry is `None` when
/// the pane is absent or the boundary falls inside one of its chunks.
pub type AlignedLines = [Option<usize>; 3];

/// A run of unchanged lines long enough to collapse behind a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stretch {
    /// First line of the run, in edit-pane coordinates
    pub line: usize,
    /// Number of lines in the run
    pub size: usize,
}

/// Which pane a scroll event or mapping refers to: the shared edit pane
/// (new document) or an original pane (old document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The shared editable pane holding the new document
    Edit,
    /// An original (old document) pane
    Original,
}

/// Scroll mapping policy, see [`crate::scroll::map_scroll_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Panes are boundary-aligned; the top offset transfers directly
    Aligned,
    /// Default chunk-ratio interpolation between boundaries
    Ratio,
}

/// Geometry queries the engine needs from a host editor pane.
///
/// This is the consumed collaborator surface: the engine never draws or
/// styles anything, it only measures. Heights are in the pane's own pixel
/// units ("local" coordinates, ignoring scroll position).
pub trait PaneGeometry {
    /// Pixel offset of the top of `line`
    fn height_at_line(&self, line: usize) -> f64;
    /// Line whose vertical extent contains the pixel offset `y`
    fn line_at_height(&self, y: f64) -> usize;
    /// Index of the last line in the pane
    fn last_line(&self) -> usize;
    /// Current scroll state
    fn scroll_info(&self) -> ScrollInfo;
}
