//! Price domain - market data seam, refresh trigger and fetch engine

mod fetch_engine;
mod price_feed;
mod trigger;

pub use fetch_engine::{fetch_set, FetchEngine, RoundSummary};
pub use price_feed::PriceFeed;
pub use trigger::{refresh_trigger, RefreshReceiver, RefreshTrigger};
