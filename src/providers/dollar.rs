//! Dollar rates from DolarSi
//!
//! The feed lists many named rates with comma-decimal strings. Only the
//! official, blue, MEP and CCL rates are kept, and a savings ("Ahorro")
//! rate is derived from the official one by applying the purchase tax.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::PriceProvider;
use crate::services::fetcher::{CachingFetcher, FetchRequest};
use crate::services::normalizer::{
    format_dollar_name, format_percent, parse_locale_decimal, round2,
};
use crate::types::{CoinbaniError, NormalizedPrice, Result};

pub const PROVIDER_ID: &str = "dolar";
pub const PROVIDER_NAME: &str = "Dólar";
pub const CACHE_KEY: &str = "dollar_response";
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

pub const DOLLAR_OFFICIAL: &str = "Dolar Oficial";
pub const DOLLAR_BLUE: &str = "Dolar Blue";
pub const DOLLAR_MEP: &str = "Dolar Bolsa";
pub const DOLLAR_CCL: &str = "Dolar Contado con Liqui";
pub const DOLLAR_SAVING: &str = "Ahorro";

const KEPT_RATES: [&str; 4] = [DOLLAR_OFFICIAL, DOLLAR_BLUE, DOLLAR_MEP, DOLLAR_CCL];

#[derive(Debug, Deserialize)]
struct DollarEntry {
    casa: DollarRate,
}

/// One named rate as published, values still in comma-decimal form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DollarRate {
    #[serde(rename = "compra", default)]
    pub bid_price: String,
    #[serde(rename = "venta", default)]
    pub ask_price: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "variacion", default)]
    pub percent_change: String,
}

/// Decode the rate list; fewer than two entries means the feed is broken
pub fn decode(body: &[u8]) -> Result<Vec<DollarRate>> {
    let entries: Vec<DollarEntry> = serde_json::from_slice(body)
        .map_err(|e| CoinbaniError::decode(CACHE_KEY, e.to_string()))?;

    if entries.len() < 2 {
        return Err(CoinbaniError::decode(
            CACHE_KEY,
            format!("expected at least 2 rates, got {}", entries.len()),
        ));
    }

    Ok(entries.into_iter().map(|entry| entry.casa).collect())
}

/// Keep official, blue, MEP and CCL in upstream order
pub fn filter_rates(rates: &[DollarRate]) -> Vec<DollarRate> {
    rates
        .iter()
        .filter(|rate| KEPT_RATES.contains(&rate.name.as_str()))
        .cloned()
        .collect()
}

/// Official rate with the purchase tax applied
pub fn saving_rate(rates: &[DollarRate], saving_tax: f64) -> Result<DollarRate> {
    let official = rates
        .iter()
        .find(|rate| rate.name == DOLLAR_OFFICIAL)
        .ok_or_else(|| CoinbaniError::MissingData("official dollar not found in list".into()))?;

    let bid = parse_locale_decimal(&official.bid_price).ok_or_else(|| {
        CoinbaniError::MissingData(format!(
            "official dollar bid price is not numeric: {:?}",
            official.bid_price
        ))
    })?;
    let ask = parse_locale_decimal(&official.ask_price).ok_or_else(|| {
        CoinbaniError::MissingData(format!(
            "official dollar ask price is not numeric: {:?}",
            official.ask_price
        ))
    })?;

    Ok(DollarRate {
        bid_price: format!("{:.2}", bid * saving_tax),
        ask_price: format!("{:.2}", ask * saving_tax),
        name: DOLLAR_SAVING.to_string(),
        percent_change: official.percent_change.clone(),
    })
}

/// Convert one rate; `None` when bid or ask is not numeric
pub fn rate_price(rate: &DollarRate) -> Option<NormalizedPrice> {
    let bid = parse_locale_decimal(&rate.bid_price)?;
    let ask = parse_locale_decimal(&rate.ask_price)?;

    Some(NormalizedPrice {
        description: format_dollar_name(&rate.name),
        currency: "USD".to_string(),
        bid_price: round2(bid),
        ask_price: round2(ask),
        percent_change: format_percent(&rate.percent_change),
    })
}

/// Filter, derive the savings rate, and convert.
///
/// Rates with non-numeric prices are dropped so one bad entry does not
/// blank out the rest.
pub fn normalize(rates: &[DollarRate], saving_tax: f64) -> Result<Vec<NormalizedPrice>> {
    let mut kept = filter_rates(rates);
    let saving = saving_rate(&kept, saving_tax)?;
    kept.push(saving);

    Ok(kept
        .iter()
        .filter_map(|rate| {
            let price = rate_price(rate);
            if price.is_none() {
                warn!(
                    rate = %rate.name,
                    bid = %rate.bid_price,
                    ask = %rate.ask_price,
                    "dropping dollar rate with non-numeric price"
                );
            }
            price
        })
        .collect())
}

pub struct DollarProvider {
    fetcher: Arc<CachingFetcher>,
    url: String,
    ttl: Duration,
    saving_tax: f64,
}

impl DollarProvider {
    pub fn new(
        fetcher: Arc<CachingFetcher>,
        url: impl Into<String>,
        ttl: Duration,
        saving_tax: f64,
    ) -> Self {
        Self {
            fetcher,
            url: url.into(),
            ttl,
            saving_tax,
        }
    }
}

#[async_trait]
impl PriceProvider for DollarProvider {
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

        let rates = self.fetcher.get(&request).await?;
        normalize(&rates, self.saving_tax)
    }
}
