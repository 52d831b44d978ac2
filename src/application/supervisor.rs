//! Config reload supervisor

use crate::domain::sink::{dispatch_modal, DisplaySink, Notifier};
use crate::domain::state::SharedState;
use crate::shared::config::ConfigStore;
use crate::shared::errors::ConfigError;
use crate::shared::types::Configuration;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

pub const CONFIG_ERROR_TITLE: &str = "Config Error";

/// Result of loading the config document under the reload policy
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(Configuration),
    /// Resource was absent; the default document was written and read back
    Seeded(Configuration),
    /// Built-in minimal configuration
    Fallback(Configuration),
    /// Document is malformed and a previous configuration stays active
    Rejected,
}

impl LoadOutcome {
    pub fn configuration(&self) -> Option<&Configuration> {
        match self {
            LoadOutcome::Loaded(c) | LoadOutcome::Seeded(c) | LoadOutcome::Fallback(c) => Some(c),
            LoadOutcome::Rejected => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: LoadOutcome,
    /// Message to surface to the user, once
    pub user_error: Option<String>,
}

/// Load the document and decide what to run with.
///
/// - absent: seed the default document and load it back
/// - malformed: keep the current configuration when there is one
/// - anything else: built-in minimal configuration
pub fn resolve_configuration(store: &dyn ConfigStore, has_current: bool) -> Resolution {
    match store.load() {
        Ok(config) => Resolution {
            outcome: LoadOutcome::Loaded(config),
            user_error: None,
        },
        Err(ConfigError::NotFound(path)) => {
            info!("Config file not found. Creating default at {}", path.display());
            if let Err(e) = store.seed_default() {
                error!("Error creating default config: {}", e);
            }
            let outcome = match store.load() {
                Ok(config) => LoadOutcome::Seeded(config),
                Err(e) => {
                    error!("Error loading newly created config: {}", e);
                    LoadOutcome::Fallback(Configuration::builtin_default())
                }
            };
            Resolution {
                outcome,
                user_error: None,
            }
        }
        Err(e @ ConfigError::Malformed(..)) => {
            if has_current {
                Resolution {
                    outcome: LoadOutcome::Rejected,
                    user_error: Some(format!(
                        "Config file has invalid TOML. Keeping the previous configuration.\nError: {}",
                        e
                    )),
                }
            } else {
                Resolution {
                    outcome: LoadOutcome::Fallback(Configuration::builtin_default()),
                    user_error: Some(format!(
                        "Config file has invalid TOML. Using default.\nError: {}",
                        e
                    )),
                }
            }
        }
        Err(e) => Resolution {
            outcome: LoadOutcome::Fallback(Configuration::builtin_default()),
            user_error: Some(format!("Error loading config. Using default.\nError: {}", e)),
        },
    }
}

fn surface_error(notifier: &Arc<dyn Notifier>, resolution: &Resolution) {
    if let Some(message) = &resolution.user_error {
        error!("{}", message);
        dispatch_modal(
            Arc::clone(notifier),
            CONFIG_ERROR_TITLE.to_string(),
            message.clone(),
        );
    }
}

/// Push the symbol list and pin label of the active configuration to the display
pub async fn resync_display(state: &SharedState) {
    let config = state.configuration().await;
    state
        .display()
        .sync_selectable_list(&config.symbols, config.pinned_symbol());
    let selected = state.selected().await;
    state.set_selected(&selected).await;
}

/// Build the shared state at startup. Always ends with a usable configuration.
pub async fn bootstrap_state(
    store: &Arc<dyn ConfigStore>,
    notifier: &Arc<dyn Notifier>,
    display: Arc<dyn DisplaySink>,
) -> Arc<SharedState> {
    let resolution = resolve_configuration(store.as_ref(), false);
    surface_error(notifier, &resolution);

    let config = resolution
        .outcome
        .configuration()
        .cloned()
        .unwrap_or_else(Configuration::builtin_default);
    info!(
        "Loaded {} symbol(s), {} active alert(s) from {}",
        config.symbols.len(),
        config.active_alert_count(),
        store.locate().display()
    );

    let state = SharedState::new(config, display);
    resync_display(&state).await;
    state
}

/// Polls the config resource's modification time and reloads on change
pub struct ConfigReloadSupervisor {
    state: Arc<SharedState>,
    store: Arc<dyn ConfigStore>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    last_seen: Option<SystemTime>,
}

impl ConfigReloadSupervisor {
    pub fn new(
        state: Arc<SharedState>,
        store: Arc<dyn ConfigStore>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            store,
            notifier,
            interval,
            last_seen: None,
        }
    }

    /// Reload now. Returns whether the active configuration was replaced.
    pub async fn reload(&self) -> bool {
        let resolution = resolve_configuration(self.store.as_ref(), true);
        surface_error(&self.notifier, &resolution);

        match resolution.outcome {
            LoadOutcome::Rejected => {
                warn!("Config update rejected, previous configuration stays active");
                false
            }
            LoadOutcome::Loaded(config)
            | LoadOutcome::Seeded(config)
            | LoadOutcome::Fallback(config) => {
                info!(
                    "Config reloaded: {} symbol(s), {} active alert(s), pinned: {:?}",
                    config.symbols.len(),
                    config.active_alert_count(),
                    config.pinned_symbol()
                );
                self.state.replace_configuration(config).await;
                resync_display(&self.state).await;
                true
            }
        }
    }

    /// One poll. The first observation only records the marker.
    pub async fn poll(&mut self) -> bool {
        let Some(modified) = self.store.modified() else {
            return false;
        };
        let changed = matches!(self.last_seen, Some(previous) if previous != modified);
        self.last_seen = Some(modified);

        if changed {
            info!("Config file changed. Reloading...");
            self.reload().await
        } else {
            false
        }
    }

    pub async fn run(mut self) {
        info!(
            "Watching {} for changes (every {:?})",
            self.store.locate().display(),
            self.interval
        );
        self.poll().await;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{MemoryStore, RecordingNotifier};
    use crate::infrastructure::notify::ConsoleDisplay;

    struct Harness {
        supervisor: ConfigReloadSupervisor,
        state: Arc<SharedState>,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        display: Arc<ConsoleDisplay>,
    }

    async fn harness(store: MemoryStore) -> Harness {
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::default());
        let display = Arc::new(ConsoleDisplay::new());
        let store_dyn: Arc<dyn ConfigStore> = store.clone();
        let notifier_dyn: Arc<dyn Notifier> = notifier.clone();
        let state = bootstrap_state(&store_dyn, &notifier_dyn, display.clone()).await;
        let supervisor = ConfigReloadSupervisor::new(
            state.clone(),
            store_dyn,
            notifier_dyn,
            Duration::from_millis(10),
        );
        Harness {
            supervisor,
            state,
            store,
            notifier,
            display,
        }
    }

    #[test]
    fn test_absent_resource_is_seeded() {
        let store = MemoryStore::default();
        let resolution = resolve_configuration(&store, false);
        match resolution.outcome {
            LoadOutcome::Seeded(config) => assert_eq!(config.symbols.len(), 5),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(resolution.user_error, None);
    }

    #[test]
    fn test_malformed_without_current_falls_back() {
        let store = MemoryStore::with(Configuration::default());
        store.corrupt();
        let resolution = resolve_configuration(&store, false);
        assert_eq!(
            resolution.outcome,
            LoadOutcome::Fallback(Configuration::builtin_default())
        );
        assert!(resolution.user_error.is_some());
    }

    #[test]
    fn test_malformed_with_current_is_rejected() {
        let store = MemoryStore::with(Configuration::default());
        store.corrupt();
        assert_eq!(resolve_configuration(&store, true).outcome, LoadOutcome::Rejected);
    }

    #[test]
    fn test_other_error_falls_back() {
        let store = MemoryStore::with(Configuration::with_symbols(["A"]));
        store.make_unreadable();
        let resolution = resolve_configuration(&store, true);
        assert_eq!(
            resolution.outcome,
            LoadOutcome::Fallback(Configuration::builtin_default())
        );
    }

    #[tokio::test]
    async fn test_first_poll_only_records() {
        let mut h = harness(MemoryStore::with(Configuration::with_symbols(["A", "B"]))).await;
        assert!(!h.supervisor.poll().await);
        assert!(!h.supervisor.poll().await);
    }

    #[tokio::test]
    async fn test_change_is_applied_and_menu_resynced() {
        let mut h = harness(MemoryStore::with(Configuration::with_symbols(["A", "B"]))).await;
        h.supervisor.poll().await;

        let mut edited = Configuration::with_symbols(["A", "B", "C"]);
        edited.pinned = Some("A".to_string());
        h.store.edit(edited.clone());

        assert!(h.supervisor.poll().await);
        assert_eq!(h.state.configuration().await, edited);
        let snapshot = h.display.snapshot();
        assert_eq!(snapshot.entries.len(), 3);
        assert!(snapshot.entries[0].pinned);
        assert_eq!(snapshot.pin_label, "Unpin A");
    }

    #[tokio::test]
    async fn test_malformed_reload_keeps_previous_and_alerts_once() {
        let mut h = harness(MemoryStore::with(Configuration::with_symbols(["A", "B"]))).await;
        h.supervisor.poll().await;

        h.store.corrupt();
        assert!(!h.supervisor.poll().await);
        assert!(!h.supervisor.poll().await);
        assert_eq!(h.state.symbols().await, vec!["A", "B"]);

        let prompts = h.notifier.wait_for_prompts(1).await;
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, CONFIG_ERROR_TITLE);
    }

    #[tokio::test]
    async fn test_bootstrap_selects_first_seeded_symbol() {
        let h = harness(MemoryStore::default()).await;
        assert_eq!(h.state.selected().await, "BTCUSDC");
        assert_eq!(h.state.symbols().await.len(), 5);
        assert_eq!(h.display.snapshot().entries.len(), 5);
    }
}
