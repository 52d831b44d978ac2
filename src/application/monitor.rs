//! Process wiring: starts every worker and serves the control channel

use crate::application::menu::{ControlCommand, MenuController, CONTROL_HELP};
use crate::application::supervisor::{bootstrap_state, ConfigReloadSupervisor};
use crate::domain::alert::AlertEngine;
use crate::domain::price::{refresh_trigger, FetchEngine, PriceFeed};
use crate::domain::rotation::RotationEngine;
use crate::domain::sink::{DisplaySink, Notifier};
use crate::domain::state::SharedState;
use crate::infrastructure::notify::ConsoleDisplay;
use crate::shared::config::ConfigStore;
use crate::shared::types::RuntimeSettings;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Everything the monitor needs from the outside world
pub struct Monitor {
    settings: RuntimeSettings,
    store: Arc<dyn ConfigStore>,
    feed: Arc<dyn PriceFeed>,
    notifier: Arc<dyn Notifier>,
    display: Arc<ConsoleDisplay>,
}

/// A started monitor. Dropping it without `shutdown` leaves the workers running.
pub struct MonitorHandle {
    state: Arc<SharedState>,
    menu: MenuController,
    display: Arc<ConsoleDisplay>,
    workers: Vec<JoinHandle<()>>,
}

/// What the control loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Continue(String),
    Quit,
}

impl Monitor {
    pub fn new(
        settings: RuntimeSettings,
        store: Arc<dyn ConfigStore>,
        feed: Arc<dyn PriceFeed>,
        notifier: Arc<dyn Notifier>,
        display: Arc<ConsoleDisplay>,
    ) -> Self {
        Self {
            settings,
            store,
            feed,
            notifier,
            display,
        }
    }

    /// Load the configuration and spawn the fetch, rotation and reload workers
    pub async fn start(self) -> MonitorHandle {
        let display: Arc<dyn DisplaySink> = self.display.clone();
        let state = bootstrap_state(&self.store, &self.notifier, display).await;

        let (trigger, receiver) = refresh_trigger();
        let alerts = Arc::new(AlertEngine::new(
            state.clone(),
            self.notifier.clone(),
            self.store.clone(),
            self.settings.alert_policy,
        ));

        let fetcher = FetchEngine::new(
            state.clone(),
            self.feed.clone(),
            alerts,
            self.settings.fetch_interval,
        );
        let rotation = RotationEngine::new(state.clone(), self.settings.rotate_interval);
        let supervisor = ConfigReloadSupervisor::new(
            state.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.settings.watch_interval,
        );

        let workers = vec![
            tokio::spawn(fetcher.run(receiver)),
            tokio::spawn(rotation.run()),
            tokio::spawn(supervisor.run()),
        ];
        info!(
            "🚀 Monitor started (fetch every {:?}, rotate every {:?}, alert policy {:?})",
            self.settings.fetch_interval, self.settings.rotate_interval, self.settings.alert_policy
        );

        MonitorHandle {
            menu: MenuController::new(state.clone(), self.store, trigger),
            state,
            display: self.display,
            workers,
        }
    }
}

impl MonitorHandle {
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    pub async fn handle(&self, command: ControlCommand) -> Reply {
        let text = match command {
            ControlCommand::List => self.display.render_menu(&self.state.selected().await),
            ControlCommand::Select(index) => match self.menu.select_index(index).await {
                Some(symbol) => format!("selected {}\n", symbol),
                None => format!("no symbol at position {}\n", index + 1),
            },
            ControlCommand::Pin => match self.menu.toggle_pin().await {
                Ok(Some(symbol)) => format!("pinned {}\n", symbol),
                Ok(None) => "unpinned\n".to_string(),
                Err(e) => {
                    warn!("Failed to save pin: {}", e);
                    format!("pin changed but not saved: {}\n", e)
                }
            },
            ControlCommand::Refresh => {
                if self.menu.refresh() {
                    "refresh requested\n".to_string()
                } else {
                    "refresh already pending\n".to_string()
                }
            }
            ControlCommand::Chart => {
                let url = self.menu.chart_url().await;
                info!("Chart: {}", url);
                format!("{}\n", url)
            }
            ControlCommand::Status => {
                let snapshot = self.display.snapshot();
                format!(
                    "{} (selected {}, {})\n",
                    snapshot.label,
                    self.state.selected().await,
                    snapshot.pin_label
                )
            }
            ControlCommand::Help => format!("{}\n", CONTROL_HELP),
            ControlCommand::Quit => return Reply::Quit,
        };
        Reply::Continue(text)
    }

    /// Serve commands line by line. Returns true on `quit`, false at end of input.
    pub async fn control_loop<R, W>(&self, input: R, mut output: W) -> std::io::Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let reply = match ControlCommand::parse(&line) {
                Ok(command) => self.handle(command).await,
                Err(e) => Reply::Continue(format!("{}\n{}\n", e, CONTROL_HELP)),
            };
            match reply {
                Reply::Continue(text) => {
                    output.write_all(text.as_bytes()).await?;
                    output.flush().await?;
                }
                Reply::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Stop every worker without waiting for in-flight work
    pub fn shutdown(self) {
        for worker in &self.workers {
            worker.abort();
        }
        info!("Monitor stopped");
    }
}

/// Run until `quit` on stdin or Ctrl-C. Closed stdin leaves the monitor running headless.
pub async fn run_until_shutdown(monitor: Monitor) -> std::io::Result<()> {
    let handle = monitor.start().await;
    info!("{}", CONTROL_HELP);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        served = handle.control_loop(stdin, stdout) => {
            match served {
                Ok(true) => info!("Quit requested"),
                Ok(false) => {
                    info!("Control input closed, running until Ctrl-C");
                    tokio::signal::ctrl_c().await?;
                }
                Err(e) => {
                    warn!("Control input failed: {}", e);
                    tokio::signal::ctrl_c().await?;
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Ctrl-C received");
        }
    }

    handle.shutdown();
    Ok(())
}
