//! Infrastructure layer - market data client and user-facing sinks

pub mod binance;
pub mod notify;

pub use binance::BinancePriceClient;
pub use notify::{ConsoleDisplay, DesktopNotifier, LogNotifier};
