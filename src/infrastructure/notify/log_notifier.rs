use async_trait::async_trait;
use std::sync::Mutex;
use tracing::warn;

use crate::domain::sink::Notifier;
use crate::shared::errors::NotifyError;

/// How many notifications are kept for `history()`
const HISTORY_LIMIT: usize = 50;

/// Headless notifier: writes to the log and keeps recent messages
#[derive(Debug, Default)]
pub struct LogNotifier {
    history: Mutex<Vec<(String, String)>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent `(title, message)` pairs, oldest first
    pub fn history(&self) -> Vec<(String, String)> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, title: &str, message: &str) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push((title.to_string(), message.to_string()));
        if history.len() > HISTORY_LIMIT {
            history.remove(0);
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        warn!("[{}] {}", title, message);
        self.record(title, message);
        Ok(())
    }

    async fn prompt_blocking_choice(
        &self,
        title: &str,
        message: &str,
        options: &[String],
    ) -> Result<Option<String>, NotifyError> {
        warn!("[{}] {} (auto-selected {:?})", title, message, options.first());
        self.record(title, message);
        Ok(options.first().cloned())
    }
}
