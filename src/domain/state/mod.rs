//! Shared monitor state: active configuration, selected symbol and price cache

use crate::domain::sink::DisplaySink;
use crate::shared::types::{Configuration, Symbol};
use crate::shared::utils::pin_label;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::debug;

/// State shared by the fetch, rotation, alert and reload workers.
///
/// Each field has its own lock. Readers of the configuration always get a full snapshot, so a
/// reload is never observed half-applied.
pub struct SharedState {
    config: RwLock<Configuration>,
    selected: RwLock<Symbol>,
    prices: RwLock<HashMap<Symbol, f64>>,
    display: Arc<dyn DisplaySink>,
}

impl SharedState {
    /// Selected symbol starts at the first configured symbol, or the fallback
    pub fn new(config: Configuration, display: Arc<dyn DisplaySink>) -> Arc<Self> {
        let selected = config.initial_symbol();
        Arc::new(Self {
            config: RwLock::new(config),
            selected: RwLock::new(selected),
            prices: RwLock::new(HashMap::new()),
            display,
        })
    }

    /// Consistent snapshot of the active configuration
    pub async fn configuration(&self) -> Configuration {
        self.config.read().await.clone()
    }

    pub async fn symbols(&self) -> Vec<Symbol> {
        self.config.read().await.symbols.clone()
    }

    pub async fn pinned(&self) -> Option<Symbol> {
        self.config.read().await.pinned_symbol().map(str::to_string)
    }

    /// Atomically swap in a new configuration.
    ///
    /// The selected symbol is left alone even if it is no longer configured; rotation recovers
    /// on its next tick.
    pub async fn replace_configuration(&self, config: Configuration) {
        *self.config.write().await = config;
        debug!("Configuration replaced");
    }

    /// Derive the next configuration from the current one under a single write lock.
    /// Returns the configuration now active.
    pub async fn update_configuration<F>(&self, f: F) -> Configuration
    where
        F: FnOnce(&Configuration) -> Configuration,
    {
        let mut config = self.config.write().await;
        let next = f(&*config);
        *config = next;
        config.clone()
    }

    /// Exclusive access for in-place alert deactivation. Keep the guard short-lived and never
    /// await on I/O while holding it.
    pub(crate) async fn configuration_mut(&self) -> RwLockWriteGuard<'_, Configuration> {
        self.config.write().await
    }

    pub async fn selected(&self) -> Symbol {
        self.selected.read().await.clone()
    }

    /// Update the selected symbol and recompute the pin label against the current pin
    pub async fn set_selected(&self, symbol: &str) {
        let pinned = self.pinned().await;
        {
            let mut selected = self.selected.write().await;
            if selected.as_str() != symbol {
                debug!("Selected symbol: {} -> {}", selected, symbol);
                *selected = symbol.to_string();
            }
        }
        self.display
            .set_pin_label(&pin_label(symbol, pinned.as_deref()));
    }

    pub async fn cached_price(&self, symbol: &str) -> Option<f64> {
        self.prices.read().await.get(symbol).copied()
    }

    pub async fn set_cached_price(&self, symbol: &str, price: f64) {
        self.prices.write().await.insert(symbol.to_string(), price);
    }

    pub fn display(&self) -> &Arc<dyn DisplaySink> {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::notify::ConsoleDisplay;

    fn state_with(symbols: &[&str]) -> (Arc<SharedState>, Arc<ConsoleDisplay>) {
        let display = Arc::new(ConsoleDisplay::new());
        let state = SharedState::new(
            Configuration::with_symbols(symbols.iter().copied()),
            display.clone(),
        );
        (state, display)
    }

    #[tokio::test]
    async fn test_initial_selection() {
        let (state, _) = state_with(&["ETHUSDC", "BTCUSDC"]);
        assert_eq!(state.selected().await, "ETHUSDC");

        let (state, _) = state_with(&[]);
        assert_eq!(state.selected().await, "BTCUSDC");
    }

    #[tokio::test]
    async fn test_set_selected_updates_pin_label() {
        let (state, display) = state_with(&["BTCUSDC", "ETHUSDC"]);
        state.set_selected("ETHUSDC").await;
        assert_eq!(display.snapshot().pin_label, "Pin ETHUSDC");

        let mut cfg = state.configuration().await;
        cfg.pinned = Some("ETHUSDC".to_string());
        state.replace_configuration(cfg).await;
        state.set_selected("ETHUSDC").await;
        assert_eq!(display.snapshot().pin_label, "Unpin ETHUSDC");
    }

    #[tokio::test]
    async fn test_replace_keeps_selection() {
        let (state, _) = state_with(&["BTCUSDC", "ETHUSDC"]);
        state.set_selected("ETHUSDC").await;
        state
            .replace_configuration(Configuration::default())
            .await;
        assert_eq!(state.selected().await, "ETHUSDC");
        assert!(state.symbols().await.is_empty());
    }

    #[tokio::test]
    async fn test_price_cache_overwrites() {
        let (state, _) = state_with(&["BTCUSDC"]);
        assert_eq!(state.cached_price("BTCUSDC").await, None);
        state.set_cached_price("BTCUSDC", 1.0).await;
        state.set_cached_price("BTCUSDC", 2.0).await;
        assert_eq!(state.cached_price("BTCUSDC").await, Some(2.0));
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_snapshots() {
        let (state, _) = state_with(&["A", "B"]);
        let writer = {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                for i in 0..200 {
                    let n = if i % 2 == 0 { 3 } else { 5 };
                    let symbols: Vec<String> = (0..n).map(|k| format!("S{}", k)).collect();
                    let mut cfg = Configuration::with_symbols(symbols);
                    cfg.pinned = Some(format!("S{}", n - 1));
                    state.replace_configuration(cfg).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..200 {
            let cfg = state.configuration().await;
            if let Some(pinned) = cfg.pinned_symbol() {
                assert_eq!(pinned, format!("S{}", cfg.symbols.len() - 1));
            }
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
    }
}
