use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::sink::Notifier;
use crate::shared::errors::NotifyError;

/// Native notifications: AppleScript on macOS, `notify-send` elsewhere
#[derive(Debug, Default, Clone)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

/// Quote text for an AppleScript string literal
fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn dialog_script(title: &str, message: &str, options: &[String]) -> String {
    let buttons = options
        .iter()
        .map(|o| applescript_quote(o))
        .collect::<Vec<_>>()
        .join(", ");
    let default_button = options
        .last()
        .map(|o| format!(" default button {}", applescript_quote(o)))
        .unwrap_or_default();
    format!(
        "display dialog {} with title {} buttons {{{}}}{}",
        applescript_quote(message),
        applescript_quote(title),
        buttons,
        default_button
    )
}

/// `button returned:OK` -> `OK`
fn parse_button_returned(stdout: &str) -> Option<String> {
    stdout
        .trim()
        .strip_prefix("button returned:")
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
}

async fn run(command: &mut Command) -> Result<String, NotifyError> {
    let output = command
        .output()
        .await
        .map_err(|e| NotifyError::Spawn(e.to_string()))?;
    if !output.status.success() {
        return Err(NotifyError::Exit(output.status.code().unwrap_or(-1)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        debug!("Desktop notification: {} - {}", title, message);
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification {} with title {}",
                applescript_quote(message),
                applescript_quote(title)
            );
            run(Command::new("osascript").arg("-e").arg(script)).await?;
        } else {
            run(Command::new("notify-send").arg(title).arg(message)).await?;
        }
        Ok(())
    }

    async fn prompt_blocking_choice(
        &self,
        title: &str,
        message: &str,
        options: &[String],
    ) -> Result<Option<String>, NotifyError> {
        if cfg!(target_os = "macos") {
            let script = dialog_script(title, message, options);
            let stdout = run(Command::new("osascript").arg("-e").arg(script)).await?;
            return Ok(parse_button_returned(&stdout));
        }

        // No modal dialog here: show the message and report it as dismissed
        if let Err(e) = self.notify(title, message).await {
            warn!("Error showing prompt as notification: {}", e);
        }
        Ok(None)
    }
}
