//! Carousel over the configured symbols

use crate::domain::state::SharedState;
use crate::shared::types::Symbol;
use crate::shared::utils::cached_label;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Index following `current` in `symbols`; 0 when `current` is not listed.
/// `None` for lists that cannot rotate.
pub fn next_index(symbols: &[Symbol], current: &str) -> Option<usize> {
    if symbols.len() <= 1 {
        return None;
    }
    let next = symbols
        .iter()
        .position(|s| s == current)
        .map(|i| (i + 1) % symbols.len())
        .unwrap_or(0);
    Some(next)
}

/// Advances the selected symbol on a timer, or holds it on the pinned symbol.
/// Only reads the price cache; never fetches.
pub struct RotationEngine {
    state: Arc<SharedState>,
    interval: Duration,
}

impl RotationEngine {
    pub fn new(state: Arc<SharedState>, interval: Duration) -> Self {
        Self { state, interval }
    }

    /// One rotation step. Returns the symbol now on display, if the tick changed or
    /// re-asserted it.
    pub async fn tick(&self) -> Option<Symbol> {
        let config = self.state.configuration().await;

        let target = match config.pinned_symbol() {
            Some(pinned) => pinned.to_string(),
            None => {
                let current = self.state.selected().await;
                let index = next_index(&config.symbols, &current)?;
                config.symbols[index].clone()
            }
        };

        self.state.set_selected(&target).await;
        self.show_cached(&target).await;
        Some(target)
    }

    async fn show_cached(&self, symbol: &str) {
        let label = cached_label(symbol, self.state.cached_price(symbol).await);
        debug!("Rotation shows {}", label);
        self.state.display().set_status_label(&label, &label);
    }

    pub async fn run(self) {
        info!("Pair rotation started (every {:?})", self.interval);
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}
