//! Binance spot market data

mod price_client;

pub use price_client::{parse_ticker, BinancePriceClient};
