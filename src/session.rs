//! Per-comparison session state
//!
//! Each pair of compared documents gets its own [`DiffSession`] owning the
//! request counter, the debounce policy, the latest accepted result and the
//! scroll-echo guard. Nothing here is global: two sessions never share
//! state, so several comparisons can recompute concurrently without
//! interfering.
//!
//! The session is a small state machine. An edit schedules a recompute after
//! a debounce delay chosen by edit kind; starting a compute hands out a
//! fresh request id; a finished compute is accepted only if it carries the
//! id of the most recent request, so a slow result for an outdated document
//! can never overwrite a newer one.

use crate::chunks::chunks;
use crate::diff::diff_text;
use crate::scroll::ScrollEcho;
use crate::types::{Chunk, DiffOp, Granularity, Side};
use crate::worker::WorkerResponse;
use std::time::Duration;
use tracing::{debug, trace};

/// What a recompute produced: the edit script and its chunk projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub ops: Vec<DiffOp>,
    pub chunks: Vec<Chunk>,
}

/// Whether the session is waiting on an in-flight compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Computing,
}

/// Classification of a document edit, used to pick the debounce delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Lines were added or removed; the chunk layout is stale
    Structural,
    /// Text changed within existing lines
    InPlace,
}

/// Debounce delays per edit kind. Structural edits invalidate pane
/// geometry and are recomputed quickly; in-place typing can wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncePolicy {
    pub fast: Duration,
    pub slow: Duration,
}

impl Default for DebouncePolicy {
    fn default() -> Self {
        DebouncePolicy {
            fast: Duration::from_millis(20),
            slow: Duration::from_millis(250),
        }
    }
}

impl DebouncePolicy {
    /// Delay before recomputing after an edit of the given kind
    pub fn delay_for(&self, kind: EditKind) -> Duration {
        match kind {
            EditKind::Structural => self.fast,
            EditKind::InPlace => self.slow,
        }
    }
}

/// State for one document comparison.
#[derive(Debug)]
pub struct DiffSession {
    granularity: Granularity,
    policy: DebouncePolicy,
    state: SessionState,
    next_id: u64,
    pending_id: Option<u64>,
    result: Option<DiffResult>,
    echo: ScrollEcho,
}

impl DiffSession {
    /// Create an idle session comparing at the given granularity
    pub fn new(granularity: Granularity) -> Self {
        Self::with_policy(granularity, DebouncePolicy::default())
    }

    /// Create a session with a custom debounce policy
    pub fn with_policy(granularity: Granularity, policy: DebouncePolicy) -> Self {
        DiffSession {
            granularity,
            policy,
            state: SessionState::Idle,
            next_id: 0,
            pending_id: None,
            result: None,
            echo: ScrollEcho::new(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record an edit and return how long to wait before recomputing.
    /// Another edit inside the window restarts it; the caller owns the
    /// timer, the session only picks the delay.
    pub fn note_edit(&mut self, kind: EditKind) -> Duration {
        let delay = self.policy.delay_for(kind);
        trace!(?kind, ?delay, "edit noted");
        delay
    }

    /// Start a compute and return its request id. Calling this again before
    /// the previous compute finishes supersedes it: the earlier result will
    /// be rejected as stale on arrival.
    pub fn begin_compute(&mut self) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.pending_id = Some(id);
        self.state = SessionState::Computing;
        trace!(id, "compute started");
        id
    }

    /// Offer a finished worker response to the session. Returns `true` and
    /// stores the result when it answers the most recent request; a stale
    /// response is discarded and leaves the session unchanged.
    pub fn accept(&mut self, response: &WorkerResponse) -> bool {
        if self.pending_id != Some(response.id) {
            debug!(
                id = response.id,
                pending = ?self.pending_id,
                "discarding stale diff result"
            );
            return false;
        }
        let ops = response.raw.clone();
        let chunk_list = chunks(&ops);
        self.result = Some(DiffResult { ops, chunks: chunk_list });
        self.pending_id = None;
        self.state = SessionState::Idle;
        true
    }

    /// Compute synchronously on the caller's thread, bypassing the worker.
    /// Supersedes any in-flight request.
    pub fn compute_local(&mut self, old: &str, new: &str) -> &DiffResult {
        let id = self.begin_compute();
        let ops = diff_text(old, new, self.granularity);
        let chunk_list = chunks(&ops);
        self.pending_id = None;
        self.state = SessionState::Idle;
        trace!(id, "local compute finished");
        self.result.insert(DiffResult { ops, chunks: chunk_list })
    }

    /// Latest accepted result, if any compute has finished yet
    pub fn result(&self) -> Option<&DiffResult> {
        self.result.as_ref()
    }

    /// Chunk list of the latest result; empty before the first compute
    pub fn chunks(&self) -> &[Chunk] {
        self.result.as_ref().map_or(&[], |r| &r.chunks)
    }

    /// Record that this session just wrote `side`'s scroll position
    pub fn note_scroll_write(&mut self, side: Side) {
        self.echo.note_write(side);
    }

    /// True when a scroll event from `side` is an echo of our own write
    pub fn is_scroll_echo(&self, side: Side) -> bool {
        self.echo.should_suppress(side)
    }
}
