//! Event source implementations.
//!
//! Each source yields raw text lines; recognizing them is left to the
//! gesture core.

use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use guster_common::config::EventSourceConfig;
use guster_common::error::{GusterError, GusterResult};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::EventSource;

/// Lines from any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than treated as a
/// read error, so one odd device name cannot end the stream.
pub struct LineSource<R> {
    segments: Split<R>,
    name: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            segments: reader.split(b'\n'),
            name: name.into(),
        }
    }
}

fn decode_line(mut raw: Vec<u8>) -> String {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    match String::from_utf8(raw) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

impl LineSource<BufReader<File>> {
    /// Read lines from a captured event log.
    pub async fn open(path: &Path) -> GusterResult<Self> {
        let file = File::open(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GusterError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => GusterError::Io(e),
        })?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> EventSource for LineSource<R> {
    async fn next_line(&mut self) -> GusterResult<Option<String>> {
        let segment = self
            .segments
            .next_segment()
            .await
            .map_err(|e| GusterError::event_source(format!("reading {} failed: {e}", self.name)))?;
        Ok(segment.map(decode_line))
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn shutdown(&mut self) -> GusterResult<()> {
        Ok(())
    }
}

/// Spawns `libinput debug-events` (or the configured producer) and reads
/// its stdout. Stderr lines are forwarded to the log.
pub struct LibinputSource {
    child: Child,
    lines: LineSource<BufReader<ChildStdout>>,
    stderr_task: Option<JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl LibinputSource {
    /// Start the producer process. Must be called inside a Tokio runtime.
    pub fn spawn(config: &EventSourceConfig) -> GusterResult<Self> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => GusterError::event_source(format!(
                    "'{}' not found. Install it with: sudo apt install libinput-tools",
                    config.command
                )),
                _ => GusterError::event_source(format!(
                    "failed to start '{}': {e}",
                    config.command
                )),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GusterError::event_source("producer stdout was not captured"))?;

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut segments = BufReader::new(stderr).split(b'\n');
                while let Ok(Some(raw)) = segments.next_segment().await {
                    let line = decode_line(raw);
                    tracing::warn!(target: "guster::libinput", "{line}");
                }
            })
        });

        let name = std::iter::once(config.command.as_str())
            .chain(config.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(command = %name, pid = child.id(), "Listening to event producer");

        Ok(Self {
            child,
            lines: LineSource::new(BufReader::new(stdout), name),
            stderr_task,
            shutdown_timeout: Duration::from_millis(config.shutdown_timeout_ms),
        })
    }

    /// Producer process id, while it is running.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

impl EventSource for LibinputSource {
    async fn next_line(&mut self) -> GusterResult<Option<String>> {
        self.lines.next_line().await
    }

    fn name(&self) -> &str {
        self.lines.name()
    }

    /// SIGTERM, then SIGKILL once the shutdown timeout passes.
    async fn shutdown(&mut self) -> GusterResult<()> {
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        if let Some(status) = self.child.try_wait()? {
            tracing::info!(%status, "Event producer already exited");
            return Ok(());
        }

        if let Some(pid) = self.child.id() {
            // The child has not been reaped, so the pid still refers to it.
            let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
            if rc != 0 {
                tracing::warn!(
                    pid,
                    error = %std::io::Error::last_os_error(),
                    "Failed to send SIGTERM to event producer"
                );
            }
        }

        match tokio::time::timeout(self.shutdown_timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                tracing::info!(%status, "Event producer stopped");
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    "Event producer ignored SIGTERM; killing it"
                );
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}

/// In-memory source for tests. Yields pre-loaded lines.
pub struct StubSource {
    lines: VecDeque<String>,
    when_drained: Drained,
    shut_down: bool,
}

enum Drained {
    End,
    Hang,
    Fail(String),
}

impl StubSource {
    /// A source that ends after `lines`.
    pub fn new<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            when_drained: Drained::End,
            shut_down: false,
        }
    }

    /// Block forever instead of ending once the lines run out.
    pub fn hang_when_drained(mut self) -> Self {
        self.when_drained = Drained::Hang;
        self
    }

    /// Return a read error once the lines run out.
    pub fn fail_when_drained(mut self, message: impl Into<String>) -> Self {
        self.when_drained = Drained::Fail(message.into());
        self
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl EventSource for StubSource {
    async fn next_line(&mut self) -> GusterResult<Option<String>> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }
        match &self.when_drained {
            Drained::End => Ok(None),
            Drained::Hang => std::future::pending().await,
            Drained::Fail(message) => Err(GusterError::event_source(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }

    async fn shutdown(&mut self) -> GusterResult<()> {
        self.shut_down = true;
        Ok(())
    }
}
