//! Per-request output sinks and the shared [`Ui`] wrapper.
//!
//! Every command writes its human-readable output through a [`Ui`]. The
//! sink behind the `Ui` is private to one request (an HTTP response body,
//! stdout, or a test buffer); the optional console mirror is shared across
//! requests and therefore synchronized so concurrent writers never
//! interleave within a line.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use colored::Colorize;

/// Destination for a command's line-oriented output.
///
/// Implementations must tolerate the consumer disappearing mid-command
/// (an HTTP client closing its connection); writes after that point are
/// dropped, not errors the command has to handle.
pub trait OutputSink: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Sink writing to the process stdout, used by local command execution.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")
    }
}

/// Sink collecting output into a shared buffer, used by tests.
#[derive(Clone, Default)]
pub struct BufferSink {
    buffer: Arc<Mutex<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.buffer.lock().expect("buffer lock poisoned").clone()
    }
}

impl OutputSink for BufferSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buffer = self.buffer.lock().expect("buffer lock poisoned");
        buffer.push_str(line);
        buffer.push('\n');
        Ok(())
    }
}

/// Shared, synchronized mirror of request output on the server console.
pub type ConsoleMirror = Arc<Mutex<Box<dyn Write + Send>>>;

struct UiInner {
    sink: Box<dyn OutputSink>,
    color: bool,
    mirror: Option<ConsoleMirror>,
}

/// Clonable handle to one request's output sink.
///
/// All command factories in a registry build share one `Ui`, so the handle
/// is an `Arc<Mutex<..>>`: only one command runs per request, but the
/// runner and the command may both hold the handle, and the mutex keeps
/// mirror writes whole under concurrent requests.
#[derive(Clone)]
pub struct Ui {
    inner: Arc<Mutex<UiInner>>,
}

impl Ui {
    pub fn new(sink: Box<dyn OutputSink>, color: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(UiInner {
                sink,
                color,
                mirror: None,
            })),
        }
    }

    /// Attach a shared console mirror; every line is also written there.
    pub fn with_mirror(self, mirror: ConsoleMirror) -> Self {
        {
            let mut inner = self.inner.lock().expect("ui lock poisoned");
            inner.mirror = Some(mirror);
        }
        self
    }

    /// Write a plain output line.
    pub fn output(&self, line: &str) {
        self.write(line.to_string());
    }

    /// Write an informational line (unstyled, same stream as output).
    pub fn info(&self, line: &str) {
        self.write(line.to_string());
    }

    /// Write a warning line, styled yellow when color is enabled.
    pub fn warn(&self, line: &str) {
        let styled = {
            let inner = self.inner.lock().expect("ui lock poisoned");
            if inner.color {
                line.yellow().to_string()
            } else {
                line.to_string()
            }
        };
        self.write(styled);
    }

    /// Write an error line, styled red when color is enabled.
    pub fn error(&self, line: &str) {
        let styled = {
            let inner = self.inner.lock().expect("ui lock poisoned");
            if inner.color {
                line.red().to_string()
            } else {
                line.to_string()
            }
        };
        self.write(styled);
    }

    fn write(&self, line: String) {
        let mut inner = self.inner.lock().expect("ui lock poisoned");
        if let Err(e) = inner.sink.write_line(&line) {
            // The consumer is gone (e.g. HTTP client disconnected); the
            // command keeps running and remaining output is dropped.
            tracing::debug!(error = %e, "output sink write failed");
        }
        if let Some(mirror) = &inner.mirror {
            let mut mirror = mirror.lock().expect("mirror lock poisoned");
            let _ = writeln!(mirror, "{line}");
        }
    }
}
