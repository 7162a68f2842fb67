//! Core types shared by the cache, providers and the aggregation service

mod error;
mod price;

pub use error::{CoinbaniError, ErrorKind, Result};
pub use price::{NormalizedPrice, PriceList};
