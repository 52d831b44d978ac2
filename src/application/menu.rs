//! User-driven selection, pinning and refresh

use crate::application::supervisor::resync_display;
use crate::domain::price::RefreshTrigger;
use crate::domain::state::SharedState;
use crate::shared::config::ConfigStore;
use crate::shared::errors::ConfigError;
use crate::shared::types::Symbol;
use crate::shared::utils::{cached_label, chart_url};
use std::sync::Arc;
use tracing::{info, warn};

/// Commands accepted on the control channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    List,
    /// Zero-based menu index
    Select(usize),
    Pin,
    Refresh,
    Chart,
    Status,
    Help,
    Quit,
}

pub const CONTROL_HELP: &str =
    "commands: list | select <n> | pin | refresh | chart | status | help | quit";

impl ControlCommand {
    /// Parse one input line. Menu positions are 1-based on input.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Err("empty command".to_string());
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => ControlCommand::List,
            "select" | "s" => {
                let position = parts
                    .next()
                    .ok_or_else(|| "select needs a menu position".to_string())?
                    .parse::<usize>()
                    .map_err(|e| format!("invalid position: {}", e))?;
                if position == 0 {
                    return Err("menu positions start at 1".to_string());
                }
                ControlCommand::Select(position - 1)
            }
            "pin" | "unpin" => ControlCommand::Pin,
            "refresh" | "r" => ControlCommand::Refresh,
            "chart" => ControlCommand::Chart,
            "status" => ControlCommand::Status,
            "help" | "?" => ControlCommand::Help,
            "quit" | "exit" | "q" => ControlCommand::Quit,
            other => return Err(format!("unknown command: {}", other)),
        };
        Ok(command)
    }
}

/// Callbacks behind the symbol menu
pub struct MenuController {
    state: Arc<SharedState>,
    store: Arc<dyn ConfigStore>,
    trigger: RefreshTrigger,
}

impl MenuController {
    pub fn new(state: Arc<SharedState>, store: Arc<dyn ConfigStore>, trigger: RefreshTrigger) -> Self {
        Self {
            state,
            store,
            trigger,
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Select the symbol at `index` in the configured list and request a refresh.
    /// Out-of-range indexes are ignored.
    pub async fn select_index(&self, index: usize) -> Option<Symbol> {
        let symbols = self.state.symbols().await;
        let Some(symbol) = symbols.get(index).cloned() else {
            warn!("No symbol at menu position {}", index + 1);
            return None;
        };

        info!("Selected pair: {}", symbol);
        self.state.set_selected(&symbol).await;
        let label = cached_label(&symbol, self.state.cached_price(&symbol).await);
        self.state.display().set_status_label(&label, &label);
        self.trigger.request();
        Some(symbol)
    }

    /// Pin the selected symbol, or unpin it if it is already pinned. Returns the new pin.
    pub async fn toggle_pin(&self) -> Result<Option<Symbol>, ConfigError> {
        let current = self.state.selected().await;
        let updated = self
            .state
            .update_configuration(|config| {
                let mut next = config.clone();
                next.pinned = if config.pinned_symbol() == Some(current.as_str()) {
                    None
                } else {
                    Some(current.clone())
                };
                next
            })
            .await;

        match &updated.pinned {
            Some(symbol) => info!("📌 Pinned {}", symbol),
            None => info!("Unpinned {}", current),
        }
        resync_display(&self.state).await;

        let store = Arc::clone(&self.store);
        let to_save = updated.clone();
        tokio::task::spawn_blocking(move || store.save(&to_save))
            .await
            .map_err(|e| ConfigError::Other(format!("config save task failed: {}", e)))??;

        Ok(updated.pinned)
    }

    pub fn refresh(&self) -> bool {
        self.trigger.request()
    }

    pub async fn chart_url(&self) -> String {
        chart_url(&self.state.selected().await)
    }
}
