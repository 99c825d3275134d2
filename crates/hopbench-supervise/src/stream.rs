// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-stream collection: ordered capture of one descriptor's output.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Ordered sequence of text lines captured from one descriptor.
///
/// Append-only while open; sealing is a one-way transition after which
/// [`push`](CapturedStream::push) rejects further lines. The two streams of
/// a supervised process (stdout, stderr) are collected independently; no
/// ordering holds across them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedStream {
    lines: Vec<String>,
    sealed: bool,
}

impl CapturedStream {
    /// Create an empty, open stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line. Returns `false` without appending if the stream is
    /// already sealed; a reader racing a cancellation-triggered seal uses
    /// this to stop cleanly.
    pub fn push(&mut self, line: String) -> bool {
        if self.sealed {
            return false;
        }
        self.lines.push(line);
        true
    }

    /// Seal the stream. Returns `true` if this call performed the
    /// transition, `false` if it was already sealed.
    pub fn seal(&mut self) -> bool {
        if self.sealed {
            return false;
        }
        self.sealed = true;
        true
    }

    /// Whether the stream has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The captured lines, in delivery order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume the stream and return its lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Number of captured lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines were captured.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Spawn a task that reads `source` line-by-line and forwards each line on
/// `tx`. Dropping the sender on EOF (or read error) is the stream-closed
/// signal: the receiver sees `None` and seals the collector.
pub(crate) fn spawn_line_reader<R>(
    source: R,
    tx: mpsc::UnboundedSender<String>,
    label: &'static str,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(source);
        let mut buf = String::new();
        loop {
            buf.clear();
            match reader.read_line(&mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = buf.trim_end_matches(['\r', '\n']).to_string();
                    if tx.send(line).is_err() {
                        // Receiver gone; the supervisor no longer cares.
                        break;
                    }
                }
                Err(err) => {
                    debug!(target: "hopbench.supervise", stream = label, error = %err, "read error, treating as end of stream");
                    break;
                }
            }
        }
    })
}
