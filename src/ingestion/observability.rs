use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::MapperError;

use super::source::SourceFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (read failed).
    Error,
    /// Critical error (typically I/O failures).
    Critical,
}

impl ReadSeverity {
    /// Severity of a failed read.
    pub fn for_error(err: &MapperError) -> Self {
        match err {
            MapperError::Load(load) if load.is_io() => ReadSeverity::Critical,
            _ => ReadSeverity::Error,
        }
    }

    /// Lowercase name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadSeverity::Info => "info",
            ReadSeverity::Warning => "warning",
            ReadSeverity::Error => "error",
            ReadSeverity::Critical => "critical",
        }
    }
}

/// Context about one read.
#[derive(Debug, Clone)]
pub struct ReadContext {
    /// Display form of the source (path or upload name).
    pub source: String,
    /// Format, once it has been resolved from the extension.
    pub format: Option<SourceFormat>,
}

/// Stats reported on a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadStats {
    /// Number of non-empty records produced.
    pub records: usize,
    /// Number of batches handed to the sink (0 without batching).
    pub batches: usize,
}

/// Observer interface for read outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ReadObserver: Send + Sync {
    /// Called when a read completes.
    fn on_success(&self, _ctx: &ReadContext, _stats: ReadStats) {}

    /// Called each time a batch is delivered to the sink.
    fn on_batch(&self, _ctx: &ReadContext, _batch_len: usize) {}

    /// Called when a read fails.
    fn on_failure(&self, _ctx: &ReadContext, _severity: ReadSeverity, _error: &MapperError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &MapperError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ReadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ReadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ReadObserver for CompositeObserver {
    fn on_success(&self, ctx: &ReadContext, stats: ReadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_batch(&self, ctx: &ReadContext, batch_len: usize) {
        for o in &self.observers {
            o.on_batch(ctx, batch_len);
        }
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &MapperError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &MapperError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// One observable step of a read, rendered as a single `key=value` log line.
#[derive(Debug, Clone, Copy)]
pub enum ReadEvent<'a> {
    /// The read finished; `records` counts every non-empty record, batched or returned.
    Finished(ReadStats),
    /// A batch of `len` records was accepted by the sink.
    Batch { len: usize },
    /// The read failed.
    Failed { severity: ReadSeverity, error: &'a MapperError },
    /// The read failed at or above the alert threshold.
    Alert { severity: ReadSeverity, error: &'a MapperError },
}

impl ReadEvent<'_> {
    /// Render the event for `ctx`, e.g. `ok format=csv source=people.csv records=3 batches=0`.
    pub fn render(&self, ctx: &ReadContext) -> String {
        let format = ctx.format.map_or("-", |f| f.extension());
        match self {
            ReadEvent::Finished(stats) => format!(
                "ok format={format} source={} records={} batches={}",
                ctx.source, stats.records, stats.batches
            ),
            ReadEvent::Batch { len } => {
                format!("batch format={format} source={} records={len}", ctx.source)
            }
            ReadEvent::Failed { severity, error } => format!(
                "fail severity={} format={format} source={} err={error}",
                severity.as_str(),
                ctx.source
            ),
            ReadEvent::Alert { severity, error } => format!(
                "ALERT severity={} format={format} source={} err={error}",
                severity.as_str(),
                ctx.source
            ),
        }
    }
}

/// Logs read events to stderr, prefixed with `[read]`.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StdErrObserver {
    fn log(&self, ctx: &ReadContext, event: ReadEvent<'_>) {
        eprintln!("[read] {}", event.render(ctx));
    }
}

impl ReadObserver for StdErrObserver {
    fn on_success(&self, ctx: &ReadContext, stats: ReadStats) {
        self.log(ctx, ReadEvent::Finished(stats));
    }

    fn on_batch(&self, ctx: &ReadContext, batch_len: usize) {
        self.log(ctx, ReadEvent::Batch { len: batch_len });
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &MapperError) {
        self.log(ctx, ReadEvent::Failed { severity, error });
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &MapperError) {
        self.log(ctx, ReadEvent::Alert { severity, error });
    }
}

/// Appends read events to a local log file, one `<unix seconds> <event>` line each.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn log(&self, ctx: &ReadContext, event: ReadEvent<'_>) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {}", unix_ts(), event.render(ctx));
        }
    }
}

impl ReadObserver for FileObserver {
    fn on_success(&self, ctx: &ReadContext, stats: ReadStats) {
        self.log(ctx, ReadEvent::Finished(stats));
    }

    fn on_batch(&self, ctx: &ReadContext, batch_len: usize) {
        self.log(ctx, ReadEvent::Batch { len: batch_len });
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &MapperError) {
        self.log(ctx, ReadEvent::Failed { severity, error });
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &MapperError) {
        self.log(ctx, ReadEvent::Alert { severity, error });
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
