//! Selector-based dispatch over the registered providers

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::providers::PriceProvider;
use crate::types::{CoinbaniError, PriceList, Result};

/// Serves normalized price lists by provider selector
pub struct PriceService {
    providers: Vec<Arc<dyn PriceProvider>>,
}

impl PriceService {
    /// Providers are kept in registration order; a later provider with a
    /// duplicate id is shadowed by the earlier one.
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>) -> Self {
        Self { providers }
    }

    /// Registered selectors, in registration order
    pub fn selectors(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    fn provider(&self, selector: &str) -> Option<&Arc<dyn PriceProvider>> {
        self.providers.iter().find(|p| p.id() == selector)
    }

    /// Latest prices from the provider named by `selector`.
    ///
    /// Unknown selectors fail with `UnknownProvider`; provider failures are
    /// wrapped with the provider id and keep their original kind.
    pub async fn get_last_prices(&self, selector: &str) -> Result<PriceList> {
        let provider = self
            .provider(selector)
            .ok_or_else(|| CoinbaniError::UnknownProvider(selector.to_string()))?;

        Self::fetch(provider.as_ref()).await
    }

    /// Query every provider concurrently, one result per provider
    pub async fn get_all_last_prices(&self) -> Vec<(&'static str, Result<PriceList>)> {
        let fetches = self.providers.iter().map(|provider| async move {
            (provider.id(), Self::fetch(provider.as_ref()).await)
        });

        join_all(fetches).await
    }

    async fn fetch(provider: &dyn PriceProvider) -> Result<PriceList> {
        match provider.fetch_last_prices().await {
            Ok(prices) => {
                debug!(provider = provider.id(), count = prices.len(), "fetched prices");
                Ok(PriceList::new(provider.name(), prices))
            }
            Err(source) => {
                warn!(provider = provider.id(), error = %source, "provider failed");
                Err(CoinbaniError::Provider {
                    provider: provider.id().to_string(),
                    source: Box::new(source),
                })
            }
        }
    }
}
