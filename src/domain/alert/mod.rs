//! Threshold alert evaluation

use crate::domain::sink::{dispatch_notification, Notifier};
use crate::domain::state::SharedState;
use crate::shared::config::ConfigStore;
use crate::shared::types::{AlertPolicy, AlertRule, Direction, Symbol};
use crate::shared::utils::format_price;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const ALERT_TITLE: &str = "tickwatch alert";

/// A rule that fired for an observed price
#[derive(Debug, Clone, PartialEq)]
pub struct AlertNotice {
    pub rule_id: Option<String>,
    pub symbol: Symbol,
    pub price: f64,
    pub target: f64,
    pub direction: Direction,
    pub fired_at: DateTime<Utc>,
}

impl AlertNotice {
    pub fn message(&self) -> String {
        format!(
            "{} reached {} (target: {})",
            self.symbol,
            format_price(self.price),
            format_price(self.target)
        )
    }
}

/// Check every active rule for `symbol` against `price`.
///
/// Under the one-shot policy fired rules are deactivated in place.
pub fn check_rules(
    rules: &mut [AlertRule],
    symbol: &str,
    price: f64,
    policy: AlertPolicy,
) -> Vec<AlertNotice> {
    let now = Utc::now();
    let mut fired = Vec::new();

    for rule in rules.iter_mut().filter(|r| r.matches(symbol)) {
        if !rule.direction.is_triggered(price, rule.target) {
            continue;
        }

        fired.push(AlertNotice {
            rule_id: rule.id.clone(),
            symbol: rule.symbol.clone(),
            price,
            target: rule.target,
            direction: rule.direction,
            fired_at: now,
        });

        if policy == AlertPolicy::OneShot {
            rule.active = false;
        }
    }

    fired
}

/// Evaluates fresh prices against the configured rules and notifies
pub struct AlertEngine {
    state: Arc<SharedState>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn ConfigStore>,
    policy: AlertPolicy,
}

impl AlertEngine {
    pub fn new(
        state: Arc<SharedState>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn ConfigStore>,
        policy: AlertPolicy,
    ) -> Self {
        info!("Alert policy: {:?}", policy);
        Self {
            state,
            notifier,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Evaluate one observed price. Notifications go out on detached tasks after the state lock
    /// is released; under the one-shot policy the updated configuration is then persisted.
    pub async fn evaluate(&self, symbol: &str, price: f64) -> Vec<AlertNotice> {
        let (fired, to_persist) = {
            let mut config = self.state.configuration_mut().await;
            let fired = check_rules(&mut config.alerts, symbol, price, self.policy);
            let to_persist = (self.policy == AlertPolicy::OneShot && !fired.is_empty())
                .then(|| config.clone());
            (fired, to_persist)
        };

        for notice in &fired {
            let message = notice.message();
            warn!("🔔 ALERT TRIGGERED: {}", message);
            dispatch_notification(
                Arc::clone(&self.notifier),
                ALERT_TITLE.to_string(),
                message,
            );
        }

        if let Some(config) = to_persist {
            let store = Arc::clone(&self.store);
            match tokio::task::spawn_blocking(move || store.save(&config)).await {
                Ok(Ok(())) => info!("Deactivated {} fired alert(s)", fired.len()),
                Ok(Err(e)) => error!("Error saving config after alert trigger: {}", e),
                Err(e) => error!("Config save task failed: {}", e),
            }
        }

        fired
    }
}
