//! SatoshiTango peer-to-peer quotes
//!
//! The ticker is published once per settlement currency. Upstream bid/ask
//! are mid-market; the venue's own markup is applied here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::PriceProvider;
use crate::services::fetcher::{CachingFetcher, FetchRequest};
use crate::services::normalizer::pair_description;
use crate::types::{CoinbaniError, NormalizedPrice, Result};

pub const PROVIDER_ID: &str = "satoshitango";
pub const PROVIDER_NAME: &str = "SatoshiTango";
pub const ARS_CACHE_KEY: &str = "satoshi_ars_response";
pub const USD_CACHE_KEY: &str = "satoshi_usd_response";
pub const DEFAULT_TTL: Duration = Duration::from_secs(20 * 60);

/// Venue markup on the bid side
pub const BID_SPREAD: f64 = 0.99;
/// Venue markup on the ask side
pub const ASK_SPREAD: f64 = 1.01;

#[derive(Debug, Deserialize)]
struct SatoshiResponse {
    data: Option<SatoshiData>,
}

#[derive(Debug, Deserialize)]
struct SatoshiData {
    ticker: Option<SatoshiTicker>,
}

/// Quotes for the three listed assets in one settlement currency
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct SatoshiTicker {
    pub dai: SatoshiQuote,
    pub btc: SatoshiQuote,
    pub eth: SatoshiQuote,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SatoshiQuote {
    pub bid: f64,
    pub ask: f64,
}

fn decode_ticker(body: &[u8], source_name: &str) -> Result<SatoshiTicker> {
    let response: SatoshiResponse = serde_json::from_slice(body)
        .map_err(|e| CoinbaniError::decode(source_name, e.to_string()))?;

    response
        .data
        .ok_or_else(|| CoinbaniError::decode(source_name, "missing data"))?
        .ticker
        .ok_or_else(|| CoinbaniError::decode(source_name, "missing ticker"))
}

pub fn decode_ars(body: &[u8]) -> Result<SatoshiTicker> {
    decode_ticker(body, ARS_CACHE_KEY)
}

pub fn decode_usd(body: &[u8]) -> Result<SatoshiTicker> {
    decode_ticker(body, USD_CACHE_KEY)
}

fn with_spread(asset: &str, settlement: &str, quote: SatoshiQuote) -> NormalizedPrice {
    NormalizedPrice {
        description: pair_description(asset, settlement),
        currency: settlement.to_string(),
        bid_price: quote.bid * BID_SPREAD,
        ask_price: quote.ask * ASK_SPREAD,
        percent_change: String::new(),
    }
}

/// DAI, BTC, ETH against `settlement`, with the venue spread applied
pub fn normalize(ticker: &SatoshiTicker, settlement: &str) -> Vec<NormalizedPrice> {
    vec![
        with_spread("DAI", settlement, ticker.dai),
        with_spread("BTC", settlement, ticker.btc),
        with_spread("ETH", settlement, ticker.eth),
    ]
}

pub struct SatoshiTangoProvider {
    fetcher: Arc<CachingFetcher>,
    ars_url: String,
    usd_url: String,
    ttl: Duration,
}

impl SatoshiTangoProvider {
    pub fn new(
        fetcher: Arc<CachingFetcher>,
        ars_url: impl Into<String>,
        usd_url: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            ars_url: ars_url.into(),
            usd_url: usd_url.into(),
            ttl,
        }
    }
}

#[async_trait]
impl PriceProvider for SatoshiTangoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_last_prices(&self) -> Result<Vec<NormalizedPrice>> {
        let ars = FetchRequest {
            url: &self.ars_url,
            cache_key: ARS_CACHE_KEY,
            ttl: self.ttl,
            decode: decode_ars,
        };
        let usd = FetchRequest {
            url: &self.usd_url,
            cache_key: USD_CACHE_KEY,
            ttl: self.ttl,
            decode: decode_usd,
        };

        let mut prices = normalize(&self.fetcher.get(&ars).await?, "ARS");
        prices.extend(normalize(&self.fetcher.get(&usd).await?, "USD"));
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::testing::{fetcher_with, StubHttp};
    use crate::types::ErrorKind;

    const ARS_URL: &str = "http://satoshi.test/v3/ticker/ARS";
    const USD_URL: &str = "http://satoshi.test/v3/ticker/USD";

    const ARS_SAMPLE: &str = r#"{"data": {"ticker": {
        "DAI": {"bid": 130.0, "ask": 140.0, "date": "2020-05-16 17:45:00"},
        "BTC": {"bid": 1200000.0, "ask": 1300000.0},
        "ETH": {"bid": 30000.0, "ask": 32000.0}
    }, "code": "success"}}"#;

    const USD_SAMPLE: &str = r#"{"data": {"ticker": {
        "DAI": {"bid": 1.0, "ask": 1.05},
        "BTC": {"bid": 9000.0, "ask": 9500.0},
        "ETH": {"bid": 200.0, "ask": 210.0}
    }}}"#;

    fn provider(http: Arc<StubHttp>) -> SatoshiTangoProvider {
        SatoshiTangoProvider::new(Arc::new(fetcher_with(http)), ARS_URL, USD_URL, DEFAULT_TTL)
    }

    #[tokio::test]
    async fn test_fetch_both_settlements_in_order() {
        let http = Arc::new(StubHttp::new());
        http.respond(ARS_URL, 200, ARS_SAMPLE);
        http.respond(USD_URL, 200, USD_SAMPLE);

        let prices = provider(http).fetch_last_prices().await.unwrap();

        let descriptions: Vec<_> = prices.iter().map(|p| p.description.as_str()).collect();
        assert_eq!(
            descriptions,
            ["DAI/ARS", "BTC/ARS", "ETH/ARS", "DAI/USD", "BTC/USD", "ETH/USD"]
        );
        assert_eq!(prices[0].currency, "ARS");
        assert_eq!(prices[3].currency, "USD");
    }

    #[tokio::test]
    async fn test_spread_applied() {
        let http = Arc::new(StubHttp::new());
        http.respond(ARS_URL, 200, ARS_SAMPLE);
        http.respond(USD_URL, 200, USD_SAMPLE);

        let prices = provider(http).fetch_last_prices().await.unwrap();

        assert_eq!(prices[0].bid_price, 130.0 * 0.99);
        assert_eq!(prices[0].ask_price, 140.0 * 1.01);
        assert_eq!(prices[4].bid_price, 9000.0 * 0.99);
        assert_eq!(prices[4].ask_price, 9500.0 * 1.01);
    }

    #[tokio::test]
    async fn test_both_documents_cached() {
        let http = Arc::new(StubHttp::new());
        http.respond(ARS_URL, 200, ARS_SAMPLE);
        http.respond(USD_URL, 200, USD_SAMPLE);
        let provider = provider(Arc::clone(&http));

        provider.fetch_last_prices().await.unwrap();
        provider.fetch_last_prices().await.unwrap();

        assert_eq!(http.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_data_object_is_decode_error() {
        let http = Arc::new(StubHttp::new());
        http.respond(ARS_URL, 200, r#"{"error": "maintenance"}"#);
        http.respond(USD_URL, 200, USD_SAMPLE);

        let err = provider(http).fetch_last_prices().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_usd_leg_down_fails_whole_fetch() {
        let http = Arc::new(StubHttp::new());
        http.respond(ARS_URL, 200, ARS_SAMPLE);
        http.respond(USD_URL, 502, "bad gateway");

        let err = provider(http).fetch_last_prices().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
    }
}
