//! CLI commands and handlers
use clap::{Args, Parser, Subcommand};
use crate::application::monitor::{run_until_shutdown, Monitor};
use crate::domain::price::PriceFeed;
use crate::domain::sink::Notifier;
use crate::infrastructure::{BinancePriceClient, ConsoleDisplay, DesktopNotifier, LogNotifier};
use crate::shared::config::{ConfigStore, FileConfigStore};
use crate::shared::errors::{AppError, FetchError};
use crate::shared::types::{AlertPolicy, RuntimeSettings};
use crate::shared::utils::status_label;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tickwatch", version)]
#[command(about = "Rotating market price ticker with price alerts")]
pub struct Cli {
    /// Config file (default: .tickwatch.toml in the working directory, near the binary or in $HOME)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitor (default)
    Run(RunArgs),

    /// Fetch the current price of one or more symbols and exit
    Price {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[command(flatten)]
        feed: FeedArgs,
    },

    /// Write the default config document
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved config path and its contents
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    /// Market data base URL
    #[arg(long, default_value = "https://api.binance.com")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// What happens to an alert rule after it fires
    #[arg(long, value_enum, default_value_t = AlertPolicy::OneShot)]
    pub alert_policy: AlertPolicy,

    /// Seconds between fetch rounds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_interval: u64,

    /// Seconds between symbol rotations
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub rotate_interval: u64,

    /// Seconds between config file checks
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    pub watch_interval: u64,

    #[command(flatten)]
    pub feed: FeedArgs,

    /// Log notifications instead of showing desktop ones
    #[arg(long)]
    pub no_desktop: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        let defaults = RuntimeSettings::default();
        Self {
            alert_policy: defaults.alert_policy,
            fetch_interval: defaults.fetch_interval.as_secs(),
            rotate_interval: defaults.rotate_interval.as_secs(),
            watch_interval: defaults.watch_interval.as_secs(),
            feed: FeedArgs {
                api_url: defaults.api_url,
                timeout: defaults.request_timeout.as_secs(),
            },
            no_desktop: !defaults.desktop_notifications,
        }
    }
}

impl RunArgs {
    pub fn settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            fetch_interval: Duration::from_secs(self.fetch_interval),
            rotate_interval: Duration::from_secs(self.rotate_interval),
            watch_interval: Duration::from_secs(self.watch_interval),
            api_url: self.feed.api_url.clone(),
            request_timeout: Duration::from_secs(self.feed.timeout),
            alert_policy: self.alert_policy,
            desktop_notifications: !self.no_desktop,
        }
    }
}

impl FeedArgs {
    fn client(&self) -> Result<BinancePriceClient, AppError> {
        BinancePriceClient::new(self.api_url.clone(), Duration::from_secs(self.timeout))
            .map_err(AppError::Client)
    }
}

/// Symbols are opaque and case-sensitive; only surrounding whitespace is dropped
fn request_symbols(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(cli: Cli) -> Result<(), AppError> {
        let store = FileConfigStore::discover(cli.config.as_deref());
        let command = cli
            .command
            .unwrap_or_else(|| Commands::Run(RunArgs::default()));

        match command {
            Commands::Run(args) => Self::execute_run_command(args, store).await,
            Commands::Price { symbols, feed } => Self::execute_price_command(symbols, feed).await,
            Commands::InitConfig { force } => Self::execute_init_command(force, store),
            Commands::Status { json } => Self::execute_status_command(json, store),
        }
    }

    async fn execute_run_command(args: RunArgs, store: FileConfigStore) -> Result<(), AppError> {
        info!("📄 Config file: {}", store.path().display());
        let settings = args.settings();
        let feed: Arc<dyn PriceFeed> = Arc::new(args.feed.client()?);
        let notifier: Arc<dyn Notifier> = if settings.desktop_notifications {
            Arc::new(DesktopNotifier::new())
        } else {
            Arc::new(LogNotifier::new())
        };

        let monitor = Monitor::new(
            settings,
            Arc::new(store),
            feed,
            notifier,
            Arc::new(ConsoleDisplay::new()),
        );
        run_until_shutdown(monitor).await?;
        Ok(())
    }

    async fn execute_price_command(symbols: Vec<String>, feed: FeedArgs) -> Result<(), AppError> {
        let client = feed.client()?;
        let symbols = request_symbols(&symbols);
        let results = join_all(symbols.iter().map(|s| client.price_of(s))).await;

        let mut first_error: Option<(String, FetchError)> = None;
        for (symbol, result) in symbols.into_iter().zip(results) {
            match result {
                Ok(price) => println!("{}", status_label(&symbol, price)),
                Err(e) => {
                    warn!("Failed to fetch {}: {}", symbol, e);
                    println!("{}: Error", symbol);
                    first_error.get_or_insert((symbol, e));
                }
            }
        }

        match first_error {
            Some((symbol, source)) => Err(AppError::Fetch { symbol, source }),
            None => Ok(()),
        }
    }

    fn execute_init_command(force: bool, store: FileConfigStore) -> Result<(), AppError> {
        if store.path().exists() && !force {
            return Err(AppError::AlreadyExists(store.path().to_path_buf()));
        }
        store.seed_default()?;
        info!("✅ Wrote default config to {}", store.path().display());
        Ok(())
    }

    fn execute_status_command(json: bool, store: FileConfigStore) -> Result<(), AppError> {
        let config = store.load()?;

        if json {
            let doc = serde_json::json!({
                "path": store.path(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
            return Ok(());
        }

        println!("Config: {}", store.path().display());
        println!("Pairs:  {}", config.symbols.join(", "));
        println!("Pinned: {}", config.pinned_symbol().unwrap_or("-"));
        println!("Alerts: {} ({} active)", config.alerts.len(), config.active_alert_count());
        for rule in &config.alerts {
            println!(
                "  {} {:?} {} [{}]",
                rule.symbol,
                rule.direction,
                rule.target,
                if rule.active { "active" } else { "done" }
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::parse_from(["tickwatch", "--verbose"]);
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags_map_to_settings() {
        let cli = Cli::parse_from([
            "tickwatch",
            "run",
            "--alert-policy",
            "repeating",
            "--fetch-interval",
            "5",
            "--no-desktop",
            "--config",
            "/tmp/x.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        let settings = args.settings();
        assert_eq!(settings.alert_policy, AlertPolicy::Repeating);
        assert_eq!(settings.fetch_interval, Duration::from_secs(5));
        assert_eq!(settings.rotate_interval, Duration::from_secs(10));
        assert!(!settings.desktop_notifications);
    }

    #[test]
    fn test_default_run_args_match_runtime_defaults() {
        let settings = RunArgs::default().settings();
        let defaults = RuntimeSettings::default();
        assert_eq!(settings.fetch_interval, defaults.fetch_interval);
        assert_eq!(settings.api_url, defaults.api_url);
        assert_eq!(settings.alert_policy, AlertPolicy::OneShot);
        assert!(settings.desktop_notifications);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["tickwatch", "run", "--rotate-interval", "0"]).is_err());
    }

    #[test]
    fn test_price_symbols_keep_their_case() {
        let raw = vec![" btcusdc".to_string(), "ETHUSDC ".to_string(), "  ".to_string()];
        assert_eq!(request_symbols(&raw), vec!["btcusdc", "ETHUSDC"]);
    }

    #[test]
    fn test_price_requires_symbols() {
        assert!(Cli::try_parse_from(["tickwatch", "price"]).is_err());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".tickwatch.toml");
        std::fs::write(&path, "Pairs = []\n").unwrap();

        let err = CommandExecutor::execute_init_command(false, FileConfigStore::new(&path));
        assert!(matches!(err, Err(AppError::AlreadyExists(_))));
        CommandExecutor::execute_init_command(true, FileConfigStore::new(&path)).unwrap();
        assert_eq!(FileConfigStore::new(&path).load().unwrap().symbols.len(), 5);
    }
}
