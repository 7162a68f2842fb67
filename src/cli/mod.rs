//! CLI command handling

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::config::ProvidersConfig;
use crate::services::PriceService;

/// Crypto and dollar quotes from Argentine exchanges
#[derive(Parser)]
#[command(name = "coinbani")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(flatten)]
    providers: ProvidersConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the latest prices of one provider as JSON
    Prices {
        /// Provider selector (see `providers`)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        selector: Option<String>,

        /// Query every provider; failures are reported per provider
        #[arg(long)]
        all: bool,
    },

    /// List the provider selectors
    Providers,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_logging(&self.log_level);

        let service = self.providers.build_service()?;

        match self.command {
            Commands::Providers => {
                for selector in service.selectors() {
                    println!("{}", selector);
                }
                Ok(())
            }
            Commands::Prices { all: true, .. } => run_all_prices(&service).await,
            Commands::Prices {
                selector: Some(selector),
                ..
            } => run_prices(&service, &selector).await,
            Commands::Prices { selector: None, .. } => {
                anyhow::bail!("a provider selector or --all is required")
            }
        }
    }
}

/// Logs go to stderr so stdout stays valid JSON
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Output one provider's price list as JSON
async fn run_prices(service: &PriceService, selector: &str) -> anyhow::Result<()> {
    let list = service.get_last_prices(selector).await?;
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

/// Output every provider's result as JSON, errors inline
async fn run_all_prices(service: &PriceService) -> anyhow::Result<()> {
    let results: Vec<_> = service
        .get_all_last_prices()
        .await
        .into_iter()
        .map(|(selector, result)| match result {
            Ok(list) => json!({ "selector": selector, "prices": list }),
            Err(e) => json!({ "selector": selector, "error": e.to_string() }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
