use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single quote in the common price model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPrice {
    /// Pair or rate label, e.g. "DAI/ARS" or "Blue"
    pub description: String,
    /// Currency the prices are expressed in
    pub currency: String,
    pub bid_price: f64,
    pub ask_price: f64,
    /// Daily variation, "+" prefixed when non-negative; empty when unknown
    pub percent_change: String,
}

/// Normalized quotes from one provider, built fresh per request
#[derive(Debug, Clone, Serialize)]
pub struct PriceList {
    pub provider_name: String,
    pub prices: Vec<NormalizedPrice>,
    pub fetched_at: DateTime<Utc>,
}

impl PriceList {
    pub fn new(provider_name: impl Into<String>, prices: Vec<NormalizedPrice>) -> Self {
        Self {
            provider_name: provider_name.into(),
            prices,
            fetched_at: Utc::now(),
        }
    }
}
