//! Utility functions and helpers

/// Shown while a symbol has no cached price yet
pub const LOADING_PLACEHOLDER: &str = "…";

/// Quote assets recognised when building exchange URLs
const KNOWN_QUOTES: [&str; 7] = ["USDT", "USDC", "BUSD", "EUR", "BTC", "ETH", "BNB"];

/// Format a price with two decimals
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// `"<symbol>: <price>"`
pub fn status_label(symbol: &str, price: f64) -> String {
    format!("{}: {}", symbol, format_price(price))
}

/// Label for the cached price of `symbol`, or the loading placeholder
pub fn cached_label(symbol: &str, cached: Option<f64>) -> String {
    match cached {
        Some(price) => status_label(symbol, price),
        None => format!("{}: {}", symbol, LOADING_PLACEHOLDER),
    }
}

pub fn pin_label(selected: &str, pinned: Option<&str>) -> String {
    if pinned == Some(selected) {
        format!("Unpin {}", selected)
    } else {
        format!("Pin {}", selected)
    }
}

/// Split `BTCUSDC` into `BTC_USDC` using the known quote suffixes
pub fn split_pair(symbol: &str) -> String {
    for quote in KNOWN_QUOTES {
        if symbol.len() > quote.len() && symbol.ends_with(quote) {
            let base = &symbol[..symbol.len() - quote.len()];
            return format!("{}_{}", base, quote);
        }
    }
    symbol.to_string()
}

/// Exchange spot chart for a symbol
pub fn chart_url(symbol: &str) -> String {
    format!(
        "https://www.binance.com/en/trade/{}?type=spot",
        split_pair(symbol)
    )
}
