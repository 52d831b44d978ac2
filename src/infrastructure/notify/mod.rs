//! Display and notification sinks

mod console;
mod desktop;
mod log_notifier;

pub use console::{ConsoleDisplay, DisplaySnapshot, MenuEntry};
pub use desktop::DesktopNotifier;
pub use log_notifier::LogNotifier;
