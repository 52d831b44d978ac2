//! Output capabilities the engines write to

use crate::shared::errors::NotifyError;
use crate::shared::types::Symbol;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Status area and symbol menu
pub trait DisplaySink: Send + Sync {
    fn set_status_label(&self, text: &str, tooltip: &str);

    fn set_pin_label(&self, text: &str);

    /// Rebuild the selectable list; `pinned` marks the pinned entry
    fn sync_selectable_list(&self, symbols: &[Symbol], pinned: Option<&str>);
}

/// User-visible notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Fire-and-forget toast or dialog
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;

    /// Blocks until the user picks one of `options`; `None` when dismissed
    async fn prompt_blocking_choice(
        &self,
        title: &str,
        message: &str,
        options: &[String],
    ) -> Result<Option<String>, NotifyError>;
}

/// Run `notify` on a detached task. Failures are logged and dropped.
pub fn dispatch_notification(notifier: Arc<dyn Notifier>, title: String, message: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&title, &message).await {
            warn!("Error sending notification: {}", e);
        }
    });
}

/// Show a modal message with a single OK button on a detached task
pub fn dispatch_modal(notifier: Arc<dyn Notifier>, title: String, message: String) {
    tokio::spawn(async move {
        let options = vec!["OK".to_string()];
        if let Err(e) = notifier
            .prompt_blocking_choice(&title, &message, &options)
            .await
        {
            warn!("Error showing dialog: {}", e);
        }
    });
}
