//! Quote providers
//!
//! Each provider fetches its upstream documents through the shared
//! [`CachingFetcher`](crate::services::CachingFetcher) and normalizes them
//! into [`NormalizedPrice`] records.

pub mod buenbit;
pub mod dollar;
pub mod satoshi;

pub use buenbit::BuenbitProvider;
pub use dollar::DollarProvider;
pub use satoshi::SatoshiTangoProvider;

use async_trait::async_trait;

use crate::types::{NormalizedPrice, Result};

/// A source of normalized quotes
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Selector used to request this provider (e.g. "buenbit")
    fn id(&self) -> &'static str;

    /// Display name reported in the price list
    fn name(&self) -> &'static str;

    /// Fetch and normalize the latest quotes, in upstream order
    async fn fetch_last_prices(&self) -> Result<Vec<NormalizedPrice>>;
}
