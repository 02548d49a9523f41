//! Console message log.
//!
//! A bounded FIFO of severity-tagged lines. The host renders it; the engine
//! and the runtime (through `echo`) append to it.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Default maximum number of lines to keep
pub const DEFAULT_MAX_LINES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Message,
    Note,
    Warning,
    Error,
    Success,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Message => "message",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Success => "success",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub text: String,
    pub severity: Severity,
}

impl LogLine {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Ring buffer of log lines
#[derive(Debug)]
pub struct MessageLog {
    lines: VecDeque<LogLine>,
    max_lines: usize,
    /// Number of lines at the back not yet handed out by `drain_new`
    unread: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_LINES)
    }

    pub fn with_capacity(max_lines: usize) -> Self {
        let max_lines = max_lines.max(1);
        Self {
            lines: VecDeque::with_capacity(max_lines.min(DEFAULT_MAX_LINES)),
            max_lines,
            unread: 0,
        }
    }

    /// Append a line, evicting the oldest one when full.
    pub fn push(&mut self, line: LogLine) {
        while self.lines.len() >= self.max_lines {
            if let Some(old) = self.lines.pop_front() {
                trace!("evicting log line: {}", old.text);
            }
        }
        self.lines.push_back(line);
        self.unread = (self.unread + 1).min(self.lines.len());
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.unread = 0;
    }

    /// Lines appended since the previous call.
    pub fn drain_new(&mut self) -> Vec<LogLine> {
        let start = self.lines.len() - self.unread;
        self.unread = 0;
        self.lines.iter().skip(start).cloned().collect()
    }
}

/// Log handle shared between the console and the runtime callbacks.
#[derive(Debug, Clone, Default)]
pub struct SharedLog(Arc<Mutex<MessageLog>>);

impl SharedLog {
    pub fn with_capacity(max_lines: usize) -> Self {
        Self(Arc::new(Mutex::new(MessageLog::with_capacity(max_lines))))
    }

    pub fn print_line(&self, text: impl Into<String>, severity: Severity) {
        self.0.lock().push(LogLine::new(text, severity));
    }

    pub fn drain_new(&self) -> Vec<LogLine> {
        self.0.lock().drain_new()
    }

    pub fn snapshot(&self) -> Vec<LogLine> {
        self.0.lock().lines().cloned().collect()
    }

    pub fn last(&self) -> Option<LogLine> {
        self.0.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}
