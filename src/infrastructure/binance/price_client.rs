use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::price::PriceFeed;
use crate::shared::errors::FetchError;

/// `GET /api/v3/ticker/price` response
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// Parse a ticker body into a price
pub fn parse_ticker(body: &str) -> Result<f64, FetchError> {
    let ticker: TickerPrice =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let raw = ticker.price.trim();
    if raw.is_empty() {
        return Err(FetchError::Empty);
    }
    raw.parse::<f64>()
        .map_err(|e| FetchError::Parse(format!("{:?}: {}", raw, e)))
}

/// Public REST client; no API key needed for ticker prices
pub struct BinancePriceClient {
    http_client: Client,
    base_url: String,
}

impl BinancePriceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn ticker_url(&self) -> String {
        format!("{}/api/v3/ticker/price", self.base_url)
    }
}

fn map_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

#[async_trait]
impl PriceFeed for BinancePriceClient {
    async fn price_of(&self, symbol: &str) -> Result<f64, FetchError> {
        let response = self
            .http_client
            .get(self.ticker_url())
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await.map_err(map_transport)?;
        let price = parse_ticker(&body)?;
        debug!("{} = {}", symbol, price);
        Ok(price)
    }
}
