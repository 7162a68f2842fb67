//! Provider configuration and service wiring

use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::providers::{
    buenbit, dollar, satoshi, BuenbitProvider, DollarProvider, PriceProvider,
    SatoshiTangoProvider,
};
use crate::services::{CachingFetcher, ExpiringCache, HttpClient, PriceService, ReqwestClient};
use crate::types::{CoinbaniError, Result};

/// Upstream endpoints, cache TTLs and the dollar savings tax.
/// Every field can also be set from the environment (or a `.env` file).
#[derive(Args, Debug, Clone)]
pub struct ProvidersConfig {
    /// Buenbit market tickers endpoint
    #[arg(long, env = "BB_URL", default_value = "https://be.buenbit.com/api/market/tickers/")]
    pub bb_url: String,

    /// SatoshiTango ticker settled in pesos
    #[arg(
        long,
        env = "SATOSHI_ARS_URL",
        default_value = "https://api.satoshitango.com/v3/ticker/ARS"
    )]
    pub satoshi_ars_url: String,

    /// SatoshiTango ticker settled in dollars
    #[arg(
        long,
        env = "SATOSHI_USD_URL",
        default_value = "https://api.satoshitango.com/v3/ticker/USD"
    )]
    pub satoshi_usd_url: String,

    /// DolarSi main rates endpoint
    #[arg(
        long,
        env = "DOLLAR_URL",
        default_value = "https://www.dolarsi.com/api/api.php?type=valoresprincipales"
    )]
    pub dollar_url: String,

    /// Multiplier applied to the official rate for the savings dollar (1.3 = 30% tax)
    #[arg(long, env = "DOLLAR_SAVING_TAX", default_value_t = 1.3)]
    pub dollar_saving_tax: f64,

    /// Cache TTL for Buenbit responses, in seconds
    #[arg(long, env = "BB_TTL_SECS", default_value_t = buenbit::DEFAULT_TTL.as_secs())]
    pub bb_ttl_secs: u64,

    /// Cache TTL for SatoshiTango responses, in seconds
    #[arg(long, env = "SATOSHI_TTL_SECS", default_value_t = satoshi::DEFAULT_TTL.as_secs())]
    pub satoshi_ttl_secs: u64,

    /// Cache TTL for DolarSi responses, in seconds
    #[arg(long, env = "DOLLAR_TTL_SECS", default_value_t = dollar::DEFAULT_TTL.as_secs())]
    pub dollar_ttl_secs: u64,
}

impl ProvidersConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.dollar_saving_tax.is_finite() || self.dollar_saving_tax <= 0.0 {
            return Err(CoinbaniError::Config(format!(
                "dollar saving tax must be a positive number, got {}",
                self.dollar_saving_tax
            )));
        }

        let urls = [
            ("bb_url", &self.bb_url),
            ("satoshi_ars_url", &self.satoshi_ars_url),
            ("satoshi_usd_url", &self.satoshi_usd_url),
            ("dollar_url", &self.dollar_url),
        ];
        if let Some((name, _)) = urls.iter().find(|(_, url)| url.trim().is_empty()) {
            return Err(CoinbaniError::Config(format!("{} is empty", name)));
        }

        Ok(())
    }

    /// Build the providers over one shared fetcher, in selector order
    pub fn build_providers(&self, fetcher: Arc<CachingFetcher>) -> Vec<Arc<dyn PriceProvider>> {
        let buenbit: Arc<dyn PriceProvider> = Arc::new(BuenbitProvider::new(
            Arc::clone(&fetcher),
            &self.bb_url,
            Duration::from_secs(self.bb_ttl_secs),
        ));
        let satoshi: Arc<dyn PriceProvider> = Arc::new(SatoshiTangoProvider::new(
            Arc::clone(&fetcher),
            &self.satoshi_ars_url,
            &self.satoshi_usd_url,
            Duration::from_secs(self.satoshi_ttl_secs),
        ));
        let dollar: Arc<dyn PriceProvider> = Arc::new(DollarProvider::new(
            fetcher,
            &self.dollar_url,
            Duration::from_secs(self.dollar_ttl_secs),
            self.dollar_saving_tax,
        ));

        vec![buenbit, satoshi, dollar]
    }

    /// Validate and wire a [`PriceService`] over the given transport
    pub fn build_service_with(&self, http: Arc<dyn HttpClient>) -> Result<PriceService> {
        self.validate()?;
        let fetcher = Arc::new(CachingFetcher::new(http, Arc::new(ExpiringCache::new())));
        Ok(PriceService::new(self.build_providers(fetcher)))
    }

    /// Wire a [`PriceService`] over a reqwest transport
    pub fn build_service(&self) -> Result<PriceService> {
        self.build_service_with(Arc::new(ReqwestClient::new()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetcher::testing::StubHttp;
    use crate::types::ErrorKind;
    use clap::Parser;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        providers: ProvidersConfig,
    }

    fn parse(args: &[&str]) -> ProvidersConfig {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        TestArgs::try_parse_from(argv).unwrap().providers
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.dollar_saving_tax, 1.3);
        assert_eq!(config.bb_ttl_secs, 1800);
        assert_eq!(config.satoshi_ttl_secs, 1200);
        assert_eq!(config.dollar_ttl_secs, 1800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override() {
        let config = parse(&["--dollar-saving-tax", "1.65", "--bb-url", "http://bb.test"]);
        assert_eq!(config.dollar_saving_tax, 1.65);
        assert_eq!(config.bb_url, "http://bb.test");
    }

    #[test]
    fn test_rejects_non_positive_tax() {
        let config = parse(&["--dollar-saving-tax", "0"]);
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn test_rejects_empty_url() {
        let config = parse(&["--dollar-url", ""]);
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn test_service_registers_all_selectors() {
        let service = parse(&[])
            .build_service_with(Arc::new(StubHttp::new()))
            .unwrap();
        assert_eq!(service.selectors(), ["buenbit", "satoshitango", "dolar"]);
    }
}
