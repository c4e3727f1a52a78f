//! Background diff worker and its wire protocol
//!
//! Diffing large documents blocks for long enough to be felt, so computes
//! run on a dedicated thread. The protocol is a pair of JSON messages: a
//! request `{id, mode, o, n}` where `mode` selects line (0) or word (1)
//! granularity, and a response carrying the same `id`, the changed regions
//! in the shape that granularity calls for, and the raw edit script for
//! chunk extraction on the receiving side.
//!
//! Results can be delivered over a channel for callers that poll, or pushed
//! straight into a [`DiffSession`], which applies its own staleness check.
//!
//! # Examples
//!
//! ```
//! use twinpane::worker::{DiffWorker, WorkerRequest};
//! use std::time::Duration;
//!
//! let worker = DiffWorker::spawn();
//! worker.request(WorkerRequest {
//!     id: 1,
//!     mode: 0,
//!     o: "a\nb\n".into(),
//!     n: "a\nx\nb\n".into(),
//! }).unwrap();
//! let response = worker.recv_timeout(Duration::from_secs(1)).unwrap();
//! assert_eq!(response.id, 1);
//! ```

use crate::diff::{diff_lines, diff_words};
use crate::error::{Result, TwinpaneError};
use crate::position::{changed_line_ranges, positioned_spans};
use crate::session::DiffSession;
use crate::types::{DiffOp, Granularity, LineRange, PositionedSpan};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A diff request: compare document `o` against document `n` at the
/// granularity selected by `mode` (0 lines, 1 words).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerRequest {
    pub id: u64,
    pub mode: u8,
    pub o: String,
    pub n: String,
}

/// Changed regions in the shape the request's mode calls for: whole-line
/// ranges for line mode, character-accurate spans for word mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SpanPayload {
    Lines(Vec<LineRange>),
    Spans(Vec<PositionedSpan>),
}

/// Answer to a [`WorkerRequest`], tagged with its request id so the
/// receiver can discard answers to superseded requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerResponse {
    pub id: u64,
    pub mode: u8,
    pub removed: SpanPayload,
    pub added: SpanPayload,
    /// Full edit script, for chunk extraction by the receiver
    pub raw: Vec<DiffOp>,
}

/// Run one request to completion on the calling thread.
pub fn handle_request(request: WorkerRequest) -> Result<WorkerResponse> {
    let granularity = Granularity::try_from(request.mode)?;
    trace!(id = request.id, ?granularity, "handling diff request");
    let (raw, removed, added) = match granularity {
        Granularity::Line => {
            let ops = diff_lines(&request.o, &request.n);
            let set = changed_line_ranges(&ops);
            (ops, SpanPayload::Lines(set.removed), SpanPayload::Lines(set.added))
        }
        Granularity::Word => {
            let ops = diff_words(&request.o, &request.n);
            let set = positioned_spans(&ops);
            (ops, SpanPayload::Spans(set.removed), SpanPayload::Spans(set.added))
        }
    };
    Ok(WorkerResponse { id: request.id, mode: request.mode, removed, added, raw })
}

/// Decode a JSON request, run it and encode the JSON response. The entry
/// point for transports that move serialized messages.
pub fn handle_json(input: &str) -> Result<String> {
    let request: WorkerRequest = serde_json::from_str(input)?;
    let response = handle_request(request)?;
    Ok(serde_json::to_string(&response)?)
}

enum Sink {
    Channel(Sender<WorkerResponse>),
    Session(Arc<Mutex<DiffSession>>),
}

/// A dedicated diff thread fed through a channel.
///
/// Dropping the worker closes the request channel and joins the thread.
pub struct DiffWorker {
    requests: Option<Sender<WorkerRequest>>,
    results: Option<Receiver<WorkerResponse>>,
    handle: Option<JoinHandle<()>>,
}

impl DiffWorker {
    /// Spawn a worker whose responses are read back with [`try_recv`] or
    /// [`recv_timeout`].
    ///
    /// [`try_recv`]: DiffWorker::try_recv
    /// [`recv_timeout`]: DiffWorker::recv_timeout
    pub fn spawn() -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        let mut worker = Self::spawn_with_sink(Sink::Channel(result_tx));
        worker.results = Some(result_rx);
        worker
    }

    /// Spawn a worker that pushes every response into `session`, which
    /// keeps current results and drops stale ones.
    pub fn spawn_into(session: Arc<Mutex<DiffSession>>) -> Self {
        Self::spawn_with_sink(Sink::Session(session))
    }

    fn spawn_with_sink(sink: Sink) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let handle = thread::spawn(move || {
            for request in request_rx {
                let id = request.id;
                match handle_request(request) {
                    Ok(response) => match &sink {
                        Sink::Channel(tx) => {
                            if tx.send(response).is_err() {
                                // Receiver dropped, nothing left to do
                                break;
                            }
                        }
                        Sink::Session(session) => {
                            let accepted = session.lock().accept(&response);
                            debug!(id, accepted, "delivered diff result to session");
                        }
                    },
                    Err(error) => warn!(id, %error, "diff request failed"),
                }
            }
        });
        DiffWorker {
            requests: Some(request_tx),
            results: None,
            handle: Some(handle),
        }
    }

    /// Queue a request. Fails only if the worker thread has exited.
    pub fn request(&self, request: WorkerRequest) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or(TwinpaneError::WorkerDisconnected)?
            .send(request)
            .map_err(|_| TwinpaneError::WorkerDisconnected)
    }

    /// Take a finished response without blocking, if one is waiting.
    /// Always `None` for session-backed workers.
    pub fn try_recv(&self) -> Option<WorkerResponse> {
        self.results.as_ref().and_then(|rx| rx.try_recv().ok())
    }

    /// Wait up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<WorkerResponse> {
        let rx = self
            .results
            .as_ref()
            .ok_or(TwinpaneError::WorkerDisconnected)?;
        rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => {
                TwinpaneError::internal("timed out waiting for diff result")
            }
            RecvTimeoutError::Disconnected => TwinpaneError::WorkerDisconnected,
        })
    }
}

impl Drop for DiffWorker {
    fn drop(&mut self) {
        // Closing the request channel lets the thread's loop end
        drop(self.requests.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpKind;

    fn request(id: u64, mode: u8, o: &str, n: &str) -> WorkerRequest {
        WorkerRequest { id, mode, o: o.to_string(), n: n.to_string() }
    }

    #[test]
    fn test_line_mode_reports_line_ranges() {
        let response = handle_request(request(7, 0, "a\nb\n", "a\nx\nb\n")).unwrap();
        assert_eq!(response.id, 7);
        assert_eq!(response.removed, SpanPayload::Lines(vec![]));
        assert_eq!(
            response.added,
            SpanPayload::Lines(vec![LineRange { from: 1, to: 2 }])
        );
    }

    #[test]
    fn test_word_mode_reports_spans() {
        let response = handle_request(request(1, 1, "foo\n", "bar\n")).unwrap();
        match &response.added {
            SpanPayload::Spans(spans) => {
                assert_eq!(spans.len(), 1);
                assert_eq!(spans[0].text, "bar");
                assert_eq!((spans[0].start_line, spans[0].start_char), (0, 0));
            }
            other => panic!("expected spans, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = handle_request(request(1, 2, "", "")).unwrap_err();
        assert!(matches!(err, TwinpaneError::InvalidMode(2)));
    }

    #[test]
    fn test_response_carries_raw_edit_script() {
        let response = handle_request(request(1, 0, "a\n", "b\n")).unwrap();
        let kinds: Vec<OpKind> = response.raw.iter().map(|op| op.kind).collect();
        assert!(kinds.contains(&OpKind::Delete));
        assert!(kinds.contains(&OpKind::Insert));
    }

    #[test]
    fn test_json_round_trip() {
        let input = r#"{"id":3,"mode":0,"o":"a\n","n":"a\nb\n"}"#;
        let output = handle_json(input).unwrap();
        let response: WorkerResponse = serde_json::from_str(&output).unwrap();
        assert_eq!(response.id, 3);
        assert_eq!(response.mode, 0);
        assert_eq!(
            response.added,
            SpanPayload::Lines(vec![LineRange { from: 1, to: 2 }])
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            handle_json("{not json").unwrap_err(),
            TwinpaneError::Json(_)
        ));
    }

    #[test]
    fn test_worker_round_trip() {
        let worker = DiffWorker::spawn();
        worker.request(request(5, 0, "a\nb\n", "a\n")).unwrap();
        let response = worker.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(response.id, 5);
        assert_eq!(
            response.removed,
            SpanPayload::Lines(vec![LineRange { from: 1, to: 2 }])
        );
    }

    #[test]
    fn test_worker_preserves_request_order() {
        let worker = DiffWorker::spawn();
        for id in 1..=3 {
            worker.request(request(id, 0, "a\n", "b\n")).unwrap();
        }
        for expected in 1..=3 {
            let response = worker.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(response.id, expected);
        }
    }

    #[test]
    fn test_session_backed_worker_updates_session() {
        let session = Arc::new(Mutex::new(DiffSession::new(Granularity::Line)));
        let worker = DiffWorker::spawn_into(Arc::clone(&session));
        let id = session.lock().begin_compute();
        worker.request(request(id, 0, "a\nb\n", "a\nx\nb\n")).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            if session.lock().result().is_some() {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "worker never delivered");
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(session.lock().chunks().len(), 1);
    }
}
