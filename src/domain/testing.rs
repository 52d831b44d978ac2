//! In-memory collaborators for unit tests

use crate::domain::price::PriceFeed;
use crate::domain::sink::Notifier;
use crate::shared::config::{parse_document, ConfigStore, DEFAULT_CONFIG_TOML};
use crate::shared::errors::{ConfigError, FetchError, NotifyError};
use crate::shared::types::Configuration;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Feed answering from a fixed table; unknown symbols fail with `Empty`
#[derive(Default)]
pub(crate) struct ScriptedFeed {
    prices: Mutex<HashMap<String, Result<f64, FetchError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFeed {
    pub(crate) fn set(&self, symbol: &str, answer: Result<f64, FetchError>) {
        self.prices.lock().unwrap().insert(symbol.to_string(), answer);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn price_of(&self, symbol: &str) -> Result<f64, FetchError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or(Err(FetchError::Empty))
    }
}

/// Config store kept in memory
#[derive(Default)]
pub(crate) struct MemoryStore {
    doc: Mutex<Option<Configuration>>,
    malformed: AtomicBool,
    unreadable: AtomicBool,
    modified: Mutex<Option<SystemTime>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn with(config: Configuration) -> Self {
        let store = Self::default();
        *store.doc.lock().unwrap() = Some(config);
        store.touch();
        store
    }

    pub(crate) fn current(&self) -> Option<Configuration> {
        self.doc.lock().unwrap().clone()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Replace the document as an external editor would
    pub(crate) fn edit(&self, config: Configuration) {
        self.malformed.store(false, Ordering::SeqCst);
        *self.doc.lock().unwrap() = Some(config);
        self.touch();
    }

    pub(crate) fn corrupt(&self) {
        self.malformed.store(true, Ordering::SeqCst);
        self.touch();
    }

    pub(crate) fn make_unreadable(&self) {
        self.unreadable.store(true, Ordering::SeqCst);
    }

    fn touch(&self) {
        let mut modified = self.modified.lock().unwrap();
        let next = match *modified {
            Some(t) => t + Duration::from_secs(1),
            None => SystemTime::UNIX_EPOCH + Duration::from_secs(1),
        };
        *modified = Some(next);
    }
}

impl ConfigStore for MemoryStore {
    fn locate(&self) -> PathBuf {
        PathBuf::from("memory.toml")
    }

    fn load(&self) -> Result<Configuration, ConfigError> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(ConfigError::Other("permission denied".to_string()));
        }
        if self.malformed.load(Ordering::SeqCst) {
            return Err(ConfigError::Malformed(self.locate(), "expected `]`".to_string()));
        }
        self.current().ok_or_else(|| ConfigError::NotFound(self.locate()))
    }

    fn save(&self, config: &Configuration) -> Result<(), ConfigError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.doc.lock().unwrap() = Some(config.clone());
        self.touch();
        Ok(())
    }

    fn seed_default(&self) -> Result<(), ConfigError> {
        let config = parse_document(Path::new("default"), DEFAULT_CONFIG_TOML)?;
        *self.doc.lock().unwrap() = Some(config);
        self.touch();
        Ok(())
    }

    fn modified(&self) -> Option<SystemTime> {
        if self.doc.lock().unwrap().is_none() && !self.malformed.load(Ordering::SeqCst) {
            return None;
        }
        *self.modified.lock().unwrap()
    }
}

/// Notifier that records what it was asked to show
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Wait (bounded) until `n` notifications have been recorded
    pub(crate) async fn wait_for(&self, n: usize) -> Vec<(String, String)> {
        for _ in 0..200 {
            {
                let sent = self.sent.lock().unwrap();
                if sent.len() >= n {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent.lock().unwrap().clone()
    }

    pub(crate) async fn wait_for_prompts(&self, n: usize) -> Vec<(String, String)> {
        for _ in 0..200 {
            {
                let prompts = self.prompts.lock().unwrap();
                if prompts.len() >= n {
                    return prompts.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }

    async fn prompt_blocking_choice(
        &self,
        title: &str,
        message: &str,
        options: &[String],
    ) -> Result<Option<String>, NotifyError> {
        self.prompts
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(options.first().cloned())
    }
}
