use std::sync::{Arc, Mutex};

/// Logger for a batch run: every line goes to `tracing` and into a shared
/// buffer that is handed back to whoever triggered the run.
#[derive(Debug, Clone, Default)]
pub struct JobLog {
    prefixes: Vec<String>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl JobLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child logger sharing the same buffer, with an extra prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        let mut prefixes = self.prefixes.clone();
        prefixes.push(prefix.into());
        Self {
            prefixes,
            lines: self.lines.clone(),
        }
    }

    fn format(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    fn record(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }

    pub fn info(&self, message: &str) {
        let line = self.format(message);
        tracing::info!("{}", line);
        self.record(line);
    }

    pub fn warn(&self, message: &str) {
        let line = self.format(message);
        tracing::warn!("{}", line);
        self.record(line);
    }

    pub fn error(&self, message: &str) {
        let line = self.format(message);
        tracing::error!("{}", line);
        self.record(line);
    }

    /// Debug lines go to tracing only.
    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.format(message));
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn output(&self) -> String {
        self.lines().join("\n")
    }
}
