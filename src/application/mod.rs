//! Application layer - CLI, config reload and process wiring

pub mod commands;
pub mod menu;
pub mod monitor;
pub mod supervisor;

pub use commands::{Cli, CommandExecutor, Commands};
pub use menu::{ControlCommand, MenuController};
pub use monitor::{Monitor, MonitorHandle};
pub use supervisor::{bootstrap_state, resolve_configuration, ConfigReloadSupervisor, LoadOutcome};
