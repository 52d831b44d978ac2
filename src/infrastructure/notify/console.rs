use std::sync::Mutex;
use tracing::info;

use crate::domain::sink::DisplaySink;
use crate::shared::types::Symbol;

/// One row of the selectable symbol list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub symbol: Symbol,
    pub pinned: bool,
}

/// What the console currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub label: String,
    pub tooltip: String,
    pub pin_label: String,
    pub entries: Vec<MenuEntry>,
}

/// Terminal stand-in for a menu bar item: keeps the latest state and logs changes
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    inner: Mutex<DisplaySnapshot>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Numbered menu, `>` on the selected row and `*` on the pinned one
    pub fn render_menu(&self, selected: &str) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();
        for (i, entry) in snapshot.entries.iter().enumerate() {
            let cursor = if entry.symbol == selected { '>' } else { ' ' };
            let pin = if entry.pinned { " *" } else { "" };
            out.push_str(&format!("{} {:>2}. {}{}\n", cursor, i + 1, entry.symbol, pin));
        }
        out.push_str(&format!("   [{}]\n", snapshot.pin_label));
        out
    }
}

impl DisplaySink for ConsoleDisplay {
    fn set_status_label(&self, text: &str, tooltip: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.label != text {
            info!(target: "display", "📈 {}", text);
        }
        inner.label = text.to_string();
        inner.tooltip = tooltip.to_string();
    }

    fn set_pin_label(&self, text: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.pin_label = text.to_string();
    }

    fn sync_selectable_list(&self, symbols: &[Symbol], pinned: Option<&str>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries = symbols
            .iter()
            .map(|s| MenuEntry {
                symbol: s.clone(),
                pinned: pinned == Some(s.as_str()),
            })
            .collect();
        info!(target: "display", "Menu: {} symbol(s)", inner.entries.len());
    }
}
