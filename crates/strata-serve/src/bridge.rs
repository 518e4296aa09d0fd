//! The request bridge: one HTTP request, one command dispatch.
//!
//! Any method on any path is accepted. The repeated `args` query parameter
//! supplies the argument vector in appearance order; a fresh registry is
//! built per request around a channel-backed sink, and the command's output
//! is streamed to the response body as it is produced. The HTTP status is
//! always 200: callers learn about command failure from the body or from
//! the server log, never from the status line. That asymmetry is part of
//! the bridge's compatibility contract.

use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{error, info};

use strata_commands::{dispatch, CommandRegistry};
use strata_core::{ConsoleMirror, OutputSink, SharedConfig, Ui};

/// Shared state for the bridge handler.
pub struct BridgeState {
    pub config: Arc<SharedConfig>,
    /// Optional synchronized mirror of all request output on the server
    /// console.
    pub mirror: Option<ConsoleMirror>,
}

/// Build the bridge router. A single handler serves every method and path.
pub fn router(state: Arc<BridgeState>) -> Router {
    Router::new().fallback(any(handle)).with_state(state)
}

/// Sink forwarding each output line into the response body stream.
///
/// A send failure means the response stream is gone (client disconnect);
/// the error is surfaced so the `Ui` can drop the line, but the command
/// itself keeps running.
struct ChannelSink {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl OutputSink for ChannelSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.tx
            .send(Bytes::from(format!("{line}\n")))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response stream closed"))
    }
}

async fn handle(State(state): State<Arc<BridgeState>>, uri: Uri) -> Response {
    let args = parse_args(uri.query().unwrap_or(""));
    info!(args = ?args, "command request");

    let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();
    let mut ui = Ui::new(Box::new(ChannelSink { tx }), state.config.color);
    if let Some(mirror) = &state.mirror {
        ui = ui.with_mirror(Arc::clone(mirror));
    }

    // The command runs on the blocking pool: command bodies are synchronous
    // and may block on filesystem I/O for their full duration. All sender
    // handles live inside the task, so the body stream ends exactly when
    // the dispatch finishes and the last Ui clone drops.
    let config = Arc::clone(&state.config);
    let task = tokio::task::spawn_blocking(move || {
        let registry = CommandRegistry::build(config, ui.clone());
        match dispatch(&registry, &args, &ui) {
            Ok(code) => (code, None),
            Err(e) => {
                ui.error(&format!("Error executing command: {e:#}"));
                (1, Some(format!("{e:#}")))
            }
        }
    });

    // Outcome logging is observability only; it must not hold up the
    // response, so it runs on its own task.
    tokio::spawn(async move {
        match task.await {
            Ok((code, None)) => info!(code, "command complete"),
            Ok((code, Some(err))) => error!(code, error = %err, "command failed to execute"),
            Err(e) => error!(error = %e, "command task panicked"),
        }
    });

    let body = Body::from_stream(async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            yield Ok::<_, io::Error>(chunk);
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body)
        .unwrap_or_else(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to build streaming response",
            )
                .into_response()
        })
}

/// Collect the repeated `args` query parameter, in appearance order.
///
/// Occurrences without a value (`?args`) are skipped; every other query
/// parameter is ignored.
fn parse_args(query: &str) -> Vec<String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == "args").then(|| percent_decode(value))
        })
        .collect()
}

/// Minimal percent-decoding for URL query parameters.
///
/// Escapes are decoded into raw bytes first so multi-byte UTF-8 sequences
/// (e.g. `%C3%A9`) come out as the characters they encode, not one Latin-1
/// character per byte.
fn percent_decode(s: &str) -> String {
    let mut result = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next().unwrap_or(b'0');
            let lo = bytes.next().unwrap_or(b'0');
            if let (Some(h), Some(l)) = (hex_val(hi), hex_val(lo)) {
                result.push(h << 4 | l);
            } else {
                result.push(b'%');
                result.push(hi);
                result.push(lo);
            }
        } else if b == b'+' {
            result.push(b' ');
        } else {
            result.push(b);
        }
    }
    String::from_utf8_lossy(&result).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
