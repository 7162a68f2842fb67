//! Buenbit exchange quotes
//!
//! One document holds DAI/ARS, DAI/USD and BTC/ARS. The ARS/USD rate is
//! derived from the two DAI legs: buying dollars means selling DAI for USD
//! after buying it with pesos, so each side crosses the opposite leg.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use super::PriceProvider;
use crate::services::fetcher::{CachingFetcher, FetchRequest};
use crate::services::normalizer::{
    format_percent, normalize_currency_label, pair_description, round2,
};
use crate::types::{CoinbaniError, NormalizedPrice, Result};

pub const PROVIDER_ID: &str = "buenbit";
pub const PROVIDER_NAME: &str = "Buenbit 2.0";
pub const CACHE_KEY: &str = "buenbit_response";
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Deserialize)]
struct BuenbitResponse {
    object: Option<BuenbitObject>,
}

#[derive(Debug, Deserialize)]
struct BuenbitObject {
    daiars: Option<BuenbitQuote>,
    daiusd: Option<BuenbitQuote>,
    btcars: Option<BuenbitQuote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuenbitQuote {
    #[serde(rename = "purchase_price", deserialize_with = "f64_from_str")]
    pub bid_price: f64,
    pub bid_currency: String,
    #[serde(rename = "selling_price", deserialize_with = "f64_from_str")]
    pub ask_price: f64,
    pub ask_currency: String,
    #[serde(default)]
    pub price_change_percent: String,
    #[serde(default)]
    pub currency: String,
}

/// The three quotes the provider needs, all present
#[derive(Debug, Clone)]
pub struct BuenbitQuotes {
    pub dai_ars: BuenbitQuote,
    pub dai_usd: BuenbitQuote,
    pub btc_ars: BuenbitQuote,
}

/// Prices arrive as JSON strings ("134.5")
fn f64_from_str<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim().parse::<f64>().map_err(serde::de::Error::custom)
}

/// Decode and require the `object` with all three markets
pub fn decode(body: &[u8]) -> Result<BuenbitQuotes> {
    let response: BuenbitResponse = serde_json::from_slice(body)
        .map_err(|e| CoinbaniError::decode(CACHE_KEY, e.to_string()))?;

    let object = response
        .object
        .ok_or_else(|| CoinbaniError::decode(CACHE_KEY, "missing object"))?;

    let require = |quote: Option<BuenbitQuote>, market: &str| {
        quote.ok_or_else(|| CoinbaniError::decode(CACHE_KEY, format!("missing {} market", market)))
    };

    Ok(BuenbitQuotes {
        dai_ars: require(object.daiars, "daiars")?,
        dai_usd: require(object.daiusd, "daiusd")?,
        btc_ars: require(object.btcars, "btcars")?,
    })
}

fn quote_price(quote: &BuenbitQuote) -> NormalizedPrice {
    let percent_change = if quote.price_change_percent.is_empty() {
        String::new()
    } else {
        format_percent(&quote.price_change_percent)
    };

    NormalizedPrice {
        description: pair_description(&quote.bid_currency, &quote.ask_currency),
        currency: normalize_currency_label(&quote.currency),
        bid_price: quote.bid_price,
        ask_price: quote.ask_price,
        percent_change,
    }
}

/// ARS/USD implied by crossing DAI/ARS with DAI/USD
pub fn cross_rate(ars: &BuenbitQuote, usd: &BuenbitQuote) -> NormalizedPrice {
    NormalizedPrice {
        description: "ARS/USD".to_string(),
        currency: "ARS".to_string(),
        bid_price: round2(ars.bid_price / usd.ask_price),
        ask_price: round2(ars.ask_price / usd.bid_price),
        percent_change: String::new(),
    }
}

/// DAI/ARS, DAI/USD, BTC/ARS, then the derived ARS/USD
pub fn normalize(quotes: &BuenbitQuotes) -> Vec<NormalizedPrice> {
    vec![
        quote_price(&quotes.dai_ars),
        quote_price(&quotes.dai_usd),
        quote_price(&quotes.btc_ars),
        cross_rate(&quotes.dai_ars, &quotes.dai_usd),
    ]
}

pub struct BuenbitProvider {
    fetcher: Arc<CachingFetcher>,
    url: String,
    ttl: Duration,
}

impl BuenbitProvider {
    pub fn new(fetcher: Arc<CachingFetcher>, url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            fetcher,
            url: url.into(),
            ttl,
        }
    }
}

#[async_trait]
impl PriceProvider for BuenbitProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_last_prices(&self) -> Result<Vec<NormalizedPrice>> {
        let request = FetchRequest {
            url: &self.url,
            cache_key: CACHE_KEY,
            ttl: self.ttl,
            decode,
        };

        let quotes = self.fetcher.get(&request).await?;
        Ok(normalize(&quotes))
    }
}
