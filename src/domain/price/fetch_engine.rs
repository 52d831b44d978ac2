//! Periodic and on-demand price refresh

use super::{PriceFeed, RefreshReceiver};
use crate::domain::alert::AlertEngine;
use crate::domain::state::SharedState;
use crate::shared::errors::FetchError;
use crate::shared::types::{Configuration, Symbol};
use crate::shared::utils::status_label;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Outcome of one fetch round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub requested: usize,
    pub updated: usize,
    pub failed: usize,
    pub alerts_fired: usize,
}

/// Symbols queried in one round: every configured symbol (keeps rotation warm), every symbol
/// with an active alert, and the pinned symbol. First occurrence wins.
pub fn fetch_set(config: &Configuration) -> Vec<Symbol> {
    let mut set: Vec<Symbol> = Vec::new();
    let candidates = config
        .symbols
        .iter()
        .map(String::as_str)
        .chain(config.alerts.iter().filter(|a| a.active).map(|a| a.symbol.as_str()))
        .chain(config.pinned_symbol());

    for symbol in candidates {
        if !set.iter().any(|s| s == symbol) {
            set.push(symbol.to_string());
        }
    }
    set
}

/// Keeps the price cache and the status label fresh
pub struct FetchEngine {
    state: Arc<SharedState>,
    feed: Arc<dyn PriceFeed>,
    alerts: Arc<AlertEngine>,
    interval: Duration,
}

impl FetchEngine {
    pub fn new(
        state: Arc<SharedState>,
        feed: Arc<dyn PriceFeed>,
        alerts: Arc<AlertEngine>,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            feed,
            alerts,
            interval,
        }
    }

    /// Fetch every symbol of the current fetch set once
    pub async fn refresh_round(&self) -> RoundSummary {
        let symbols = fetch_set(&self.state.configuration().await);
        let mut summary = RoundSummary {
            requested: symbols.len(),
            ..Default::default()
        };

        if symbols.is_empty() {
            debug!("Nothing to fetch");
            return summary;
        }

        let results = join_all(symbols.iter().map(|symbol| async move {
            (symbol, self.feed.price_of(symbol).await)
        }))
        .await;

        for (symbol, result) in results {
            match result {
                Ok(price) => {
                    summary.updated += 1;
                    summary.alerts_fired += self.apply_price(symbol, price).await;
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("Error fetching {} price: {}", symbol, e);
                    self.apply_failure(symbol, &e).await;
                }
            }
        }

        debug!(
            "Fetch round done: {} updated, {} failed, {} alert(s)",
            summary.updated, summary.failed, summary.alerts_fired
        );
        summary
    }

    async fn apply_price(&self, symbol: &str, price: f64) -> usize {
        self.state.set_cached_price(symbol, price).await;

        if self.state.selected().await == symbol {
            let label = status_label(symbol, price);
            self.state.display().set_status_label(&label, &label);
        }

        self.alerts.evaluate(symbol, price).await.len()
    }

    /// A cached price stays on display; a symbol never fetched swaps its loading
    /// placeholder for an error marker.
    async fn apply_failure(&self, symbol: &str, error: &FetchError) {
        if self.state.selected().await != symbol || self.state.cached_price(symbol).await.is_some() {
            return;
        }
        let marker = match error {
            FetchError::Empty => "N/A",
            _ => "Error",
        };
        let label = format!("{}: {}", symbol, marker);
        self.state.display().set_status_label(&label, &label);
    }

    /// Run forever: one round now, then every interval or whenever a refresh is requested.
    /// A requested round restarts the interval.
    pub async fn run(self, mut trigger: RefreshReceiver) {
        info!("Price fetching started (every {:?})", self.interval);
        self.refresh_round().await;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut trigger_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_round().await;
                }
                received = trigger.recv(), if trigger_open => match received {
                    Some(()) => {
                        info!("Immediate price update triggered");
                        self.refresh_round().await;
                        ticker.reset();
                    }
                    None => trigger_open = false,
                },
            }
        }
    }
}
