// Progress reporting seam. Long-running operations (extraction, npm install) push free-text
// lines through a `ProgressSink` they are handed, rather than writing to a global UI handle.

#[cfg(test)]
use std::sync::Mutex;

/// Receives human-readable progress lines. Content is informational only.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, line: &str);
}

/// Writes progress lines to stderr, dimmed, next to the log output.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn progress(&self, line: &str) {
        use colored::Colorize;
        let line = line.trim_end();
        if !line.is_empty() {
            eprintln!("  {} {}", "│".dimmed(), line.dimmed());
        }
    }
}

/// Collects progress lines in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl ProgressSink for RecordingSink {
    fn progress(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
