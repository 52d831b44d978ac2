//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifier of a tradable pair, e.g. `BTCUSDC`. Case-sensitive and opaque.
pub type Symbol = String;

/// Symbol shown when nothing is configured at startup
pub const FALLBACK_SYMBOL: &str = "BTCUSDC";

/// Which side of the target a price has to reach for a rule to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    /// Both boundaries are inclusive: a price exactly at target always fires.
    pub fn is_triggered(self, price: f64, target: f64) -> bool {
        match self {
            Direction::Above => price >= target,
            Direction::Below => price <= target,
        }
    }
}

/// Threshold alert rule as stored in the config document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "pair")]
    pub symbol: Symbol,
    pub target: f64,
    #[serde(rename = "condition")]
    pub direction: Direction,
    pub active: bool,
}

impl AlertRule {
    pub fn new(symbol: impl Into<Symbol>, target: f64, direction: Direction) -> Self {
        Self {
            id: None,
            symbol: symbol.into(),
            target,
            direction,
            active: true,
        }
    }

    pub fn matches(&self, symbol: &str) -> bool {
        self.active && self.symbol == symbol
    }
}

/// Monitor configuration document.
///
/// Field names on disk follow the historical layout (`Pairs`, `Alerts`, `pinned_pair`) so
/// existing files keep loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "Pairs", default)]
    pub symbols: Vec<Symbol>,
    #[serde(rename = "pinned_pair", default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Symbol>,
    #[serde(rename = "Alerts", default)]
    pub alerts: Vec<AlertRule>,
}

impl Configuration {
    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Minimal configuration used when nothing usable can be loaded
    pub fn builtin_default() -> Self {
        Self::with_symbols(["BTCUSDC", "ETHUSDC"])
    }

    /// Symbol the monitor starts on: the first configured one, or the fallback
    pub fn initial_symbol(&self) -> Symbol {
        self.symbols
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_SYMBOL.to_string())
    }

    /// `pinned_pair = ""` in a hand-edited file means "not pinned"
    pub fn pinned_symbol(&self) -> Option<&str> {
        self.pinned.as_deref().filter(|s| !s.is_empty())
    }

    pub fn active_alert_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.active).count()
    }
}

/// Lifecycle of a rule once it has fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AlertPolicy {
    /// Deactivate the rule and persist the configuration
    #[default]
    OneShot,
    /// Keep the rule active; it fires again every qualifying round
    Repeating,
}

/// Process-level settings that do not live in the config document
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub fetch_interval: Duration,
    pub rotate_interval: Duration,
    pub watch_interval: Duration,
    pub api_url: String,
    pub request_timeout: Duration,
    pub alert_policy: AlertPolicy,
    pub desktop_notifications: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            fetch_interval: Duration::from_secs(30),
            rotate_interval: Duration::from_secs(10),
            watch_interval: Duration::from_secs(2),
            api_url: "https://api.binance.com".to_string(),
            request_timeout: Duration::from_secs(10),
            alert_policy: AlertPolicy::OneShot,
            desktop_notifications: true,
        }
    }
}
