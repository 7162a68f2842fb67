//! Error types for the fetch-cache-normalize pipeline

use thiserror::Error;

/// Errors raised while fetching and normalizing quotes
#[derive(Error, Debug)]
pub enum CoinbaniError {
    /// Transport failure or a non-200 response from an upstream service
    #[error("Upstream error fetching {url}: {message}")]
    Upstream { url: String, message: String },

    /// Upstream body was not valid JSON or lacked a required object
    #[error("Decode error in {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// A quote needed to derive another one is absent
    #[error("Missing data: {0}")]
    MissingData(String),

    /// The selector does not name a registered provider
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// A provider failed; keeps the underlying cause
    #[error("Fetching {provider} prices: {source}")]
    Provider {
        provider: String,
        #[source]
        source: Box<CoinbaniError>,
    },

    /// Invalid provider configuration
    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification of a [`CoinbaniError`], looking through provider context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Upstream,
    Decode,
    MissingData,
    UnknownProvider,
    Config,
}

impl CoinbaniError {
    pub fn upstream(url: &str, message: impl Into<String>) -> Self {
        Self::Upstream {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn decode(source_name: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// Kind of the innermost error, so `Provider` wrappers stay transparent
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::MissingData(_) => ErrorKind::MissingData,
            Self::UnknownProvider(_) => ErrorKind::UnknownProvider,
            Self::Config(_) => ErrorKind::Config,
            Self::Provider { source, .. } => source.kind(),
        }
    }

    /// Provider identity attached by the aggregation service, if any
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Provider { provider, .. } => Some(provider),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoinbaniError>;
