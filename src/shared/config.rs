//! Config document persistence

use crate::shared::errors::ConfigError;
use crate::shared::types::Configuration;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".tickwatch.toml";

/// How many parent directories of the executable are searched for a config file
const EXE_SEARCH_DEPTH: usize = 5;

/// Document written on first run
pub const DEFAULT_CONFIG_TOML: &str = r#"# Configuration for tickwatch
#
# Pairs: trading pairs to display, in rotation order.
#        Example: ["BTCUSDC", "ETHUSDC"]
#
# Alerts: price alerts.
#   - pair: the trading pair to monitor.
#   - target: the price level that triggers the alert.
#   - condition: "above" (price >= target) or "below" (price <= target).
#   - active: set to true to enable the alert. With the one-shot policy
#             the monitor sets this to false after the alert fires.
#
# pinned_pair: optional pair that stays on display instead of rotating.

Pairs = [
    "BTCUSDC",
    "ETHUSDC",
    "ADAUSDC",
    "SOLUSDC",
    "LTCUSDC"
]

# Example alerts (uncomment and modify to use)
# [[Alerts]]
#   pair = "BTCUSDC"
#   target = 100000.0
#   condition = "above"
#   active = true

# [[Alerts]]
#   pair = "ETHUSDC"
#   target = 10000.0
#   condition = "below"
#   active = true
"#;

/// Persistence collaborator for the configuration document
pub trait ConfigStore: Send + Sync {
    /// Where the document lives
    fn locate(&self) -> PathBuf;

    fn load(&self) -> Result<Configuration, ConfigError>;

    fn save(&self, config: &Configuration) -> Result<(), ConfigError>;

    /// Canonical document used to seed a fresh resource
    fn default_content(&self) -> &str {
        DEFAULT_CONFIG_TOML
    }

    /// Write `default_content()` to the resource
    fn seed_default(&self) -> Result<(), ConfigError>;

    /// Change marker polled by the reload supervisor; `None` while the resource is absent
    fn modified(&self) -> Option<SystemTime>;
}

/// TOML file backed store
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the config path: explicit path, then the working directory, then up to five
    /// levels above the executable, then the home directory.
    pub fn discover(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }

        if let Ok(cwd) = std::env::current_dir() {
            let local = cwd.join(CONFIG_FILE_NAME);
            if local.exists() {
                return Self::new(local);
            }
        }

        if let Some(found) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().and_then(|dir| search_upwards(dir, EXE_SEARCH_DEPTH)))
        {
            return Self::new(found);
        }

        match home_dir() {
            Some(home) => Self::new(home.join(CONFIG_FILE_NAME)),
            // No home: keep working from the current directory
            None => Self::new(PathBuf::from(".").join(CONFIG_FILE_NAME)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn search_upwards(start: &Path, depth: usize) -> Option<PathBuf> {
    let mut dir = Some(start);
    for _ in 0..depth {
        let current = dir?;
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Parse a document, mapping syntax errors to `Malformed`
pub fn parse_document(path: &Path, content: &str) -> Result<Configuration, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Malformed(path.to_path_buf(), e.to_string()))
}

impl ConfigStore for FileConfigStore {
    fn locate(&self) -> PathBuf {
        self.path.clone()
    }

    fn load(&self) -> Result<Configuration, ConfigError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::from_io(self.path.clone(), e))?;
        parse_document(&self.path, &content)
    }

    fn save(&self, config: &Configuration) -> Result<(), ConfigError> {
        let data = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::Other(format!("could not serialize config: {}", e)))?;
        fs::write(&self.path, data).map_err(|e| ConfigError::from_io(self.path.clone(), e))?;
        debug!("Config saved to {}", self.path.display());
        Ok(())
    }

    fn seed_default(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::from_io(self.path.clone(), e))?;
            }
        }
        fs::write(&self.path, self.default_content())
            .map_err(|e| ConfigError::from_io(self.path.clone(), e))
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}
