//! Logging setup
//!
//! The kernel logs through `tracing`. Output goes to stderr and to a log
//! file that can be swapped while running: boot starts with the per-user
//! log, then moves into the workspace once one has been resolved.

use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};
use tracing_subscriber::fmt::MakeWriter;

/// Per-user log file name, used until a workspace is resolved
pub const EARLY_LOG_FILE: &str = "kernel.log";

#[derive(Debug, Default)]
struct SinkState {
    file: Option<File>,
    path: Option<PathBuf>,
}

/// Log destination shared with the tracing subscriber
///
/// Cloning yields another handle to the same destination.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    state: Arc<Mutex<SinkState>>,
}

impl LogSink {
    /// Sink writing to stderr only
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirect file output to `path`, appending
    ///
    /// Parent directories are created. On failure the previous file keeps
    /// receiving output.
    pub fn set_path(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let mut state = self.state.lock();
        if let Some(mut old) = state.file.replace(file) {
            let _ = old.flush();
        }
        state.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Current log file, if any
    pub fn path(&self) -> Option<PathBuf> {
        self.state.lock().path.clone()
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter { sink: self }
    }
}

/// Writer handed out per log event
pub struct SinkWriter<'a> {
    sink: &'a LogSink,
}

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Best effort: write errors are dropped
        let _ = io::stderr().write_all(buf);
        if let Some(file) = self.sink.state.lock().file.as_mut() {
            let _ = file.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        if let Some(file) = self.sink.state.lock().file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Install the global subscriber
///
/// `verbose` lowers the level to DEBUG. When `early_log` is given, file
/// output starts there. A subscriber installed earlier (tests) is left in
/// place and the returned sink is not attached to it.
pub fn init(verbose: bool, early_log: Option<&Path>) -> LogSink {
    let sink = LogSink::new();
    if let Some(path) = early_log {
        if let Err(e) = sink.set_path(path) {
            eprintln!("open log file [{}] failed: {}", path.display(), e);
        }
    }

    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(sink.clone())
        .try_init()
        .is_ok();
    if installed {
        debug!("Logging initialized at {}", level);
    }

    sink
}

/// RAII timer for a boot stage
///
/// Logs the stage on creation and its duration when dropped.
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
}

impl StageTimer {
    /// Start timing `stage`
    pub fn new(stage: &'static str) -> Self {
        debug!("Entering boot stage: {}", stage);
        Self {
            stage,
            start: Instant::now(),
        }
    }

    /// Time since the stage started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        info!(
            stage = self.stage,
            "Boot stage finished in {}",
            format_duration(self.start.elapsed())
        );
    }
}

/// Format duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1000)
    } else if micros < 60_000_000 {
        format!("{:.2}s", micros as f64 / 1_000_000.0)
    } else {
        let seconds = micros / 1_000_000;
        format!("{}m{}s", seconds / 60, seconds % 60)
    }
}
