use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log severity level as shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// A captured log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

/// Shared ring of the most recent log entries.
pub type LogBuffer = Arc<Mutex<VecDeque<LogEntry>>>;

pub fn new_log_buffer(capacity: usize) -> LogBuffer {
    Arc::new(Mutex::new(VecDeque::with_capacity(capacity)))
}

/// Most recent entry at or above `min_level`, if any.
pub fn latest(buffer: &LogBuffer, min_level: LogLevel) -> Option<LogEntry> {
    let buf = buffer.lock().ok()?;
    buf.iter().rev().find(|e| e.level >= min_level).cloned()
}

/// Return the log directory path.
///
/// Precedence: `ABI_LOG_DIR` env var > platform data dir (`<data>/abi/logs`)
/// > `./logs`.
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ABI_LOG_DIR") {
        return PathBuf::from(dir);
    }

    match dirs::data_dir() {
        Some(data) => data.join("abi").join("logs"),
        None => PathBuf::from("logs"),
    }
}

const LOG_FILE_PREFIX: &str = "abi.log";
const RECENT_CAPACITY: usize = 64;
const LOG_RETENTION_DAYS: u64 = 7;

/// Delete rolled log files older than `max_age_days`.
///
/// Only files named with the rolling appender's prefix are touched.
fn prune_old_logs(log_path: &Path, max_age_days: u64) {
    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 86400);
    let Ok(entries) = std::fs::read_dir(log_path) else {
        return;
    };
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
            continue;
        }
        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(|modified| modified < cutoff)
            .unwrap_or(false);
        if stale {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

/// Tracing layer that keeps the last few events for on-screen display.
struct RecentLayer {
    buffer: LogBuffer,
    capacity: usize,
}

impl<S: tracing::Subscriber> Layer<S> for RecentLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            level: (*event.metadata().level()).into(),
            target: event.metadata().target().to_string(),
            message: visitor.finish(),
        };

        if let Ok(mut buf) = self.buffer.lock() {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(entry);
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message, self.fields.is_empty()) {
            (Some(msg), true) => msg,
            (Some(msg), false) => format!("{} {}", msg, self.fields.join(" ")),
            (None, _) => self.fields.join(" "),
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

/// Install the global subscriber and return the recent-entries buffer.
///
/// Filter comes from `ABI_LOG`, then `RUST_LOG`, defaulting to `info`.
/// Events go to a daily-rotated file under [`log_dir`] (kept 7 days); the
/// terminal owns stdout, so nothing is written there.
pub fn init() -> LogBuffer {
    let buffer = new_log_buffer(RECENT_CAPACITY);

    let filter = EnvFilter::try_from_env("ABI_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_path) {
        eprintln!("warning: failed to create log directory {:?}: {}", log_path, e);
    }
    prune_old_logs(&log_path, LOG_RETENTION_DAYS);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling::daily(&log_path, LOG_FILE_PREFIX))
        .with_ansi(false)
        .with_target(true);

    let recent_layer = RecentLayer {
        buffer: buffer.clone(),
        capacity: RECENT_CAPACITY,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(recent_layer)
        .init();

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn entry(level: LogLevel, msg: &str) -> LogEntry {
        LogEntry {
            level,
            target: "abi_face::controller".into(),
            message: msg.into(),
        }
    }

    #[test]
    fn log_dir_respects_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let original = std::env::var("ABI_LOG_DIR").ok();

        std::env::set_var("ABI_LOG_DIR", "/tmp/abi-test-logs");
        assert_eq!(log_dir(), PathBuf::from("/tmp/abi-test-logs"));

        match original {
            Some(v) => std::env::set_var("ABI_LOG_DIR", v),
            None => std::env::remove_var("ABI_LOG_DIR"),
        }
    }

    #[test]
    fn latest_skips_entries_below_level() {
        let buf = new_log_buffer(8);
        {
            let mut b = buf.lock().unwrap();
            b.push_back(entry(LogLevel::Warn, "mien has no geometry"));
            b.push_back(entry(LogLevel::Debug, "eye state Idle -> Active"));
        }
        let found = latest(&buf, LogLevel::Info).unwrap();
        assert_eq!(found.message, "mien has no geometry");
        assert_eq!(latest(&buf, LogLevel::Trace).unwrap().level, LogLevel::Debug);
        assert!(latest(&buf, LogLevel::Error).is_none());
    }

    #[test]
    fn log_level_display_and_order() {
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
        assert_eq!(LogLevel::Trace.to_string(), "TRACE");
        assert!(LogLevel::Error > LogLevel::Info);
        assert_eq!(LogLevel::from(tracing::Level::DEBUG), LogLevel::Debug);
    }

    #[test]
    fn message_visitor_joins_fields() {
        let v = MessageVisitor {
            message: Some("transition".into()),
            fields: vec!["feature=\"left_eye\"".into(), "to=Active".into()],
        };
        assert_eq!(v.finish(), "transition feature=\"left_eye\" to=Active");

        let v = MessageVisitor {
            message: None,
            fields: vec!["a=1".into(), "b=2".into()],
        };
        assert_eq!(v.finish(), "a=1 b=2");
        assert_eq!(MessageVisitor::default().finish(), "");
    }

    #[test]
    fn prune_old_logs_only_removes_prefixed_files() {
        let tmp = std::env::temp_dir().join(format!("abi-test-prune-{}", std::process::id()));
        let _ = std::fs::create_dir_all(&tmp);

        let rolled = tmp.join("abi.log.2026-01-01");
        let unrelated = tmp.join("notes.txt");
        std::fs::write(&rolled, "a").unwrap();
        std::fs::write(&unrelated, "b").unwrap();

        prune_old_logs(&tmp, 0);
        assert!(!rolled.exists());
        assert!(unrelated.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
