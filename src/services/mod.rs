//! Services for caching, fetching and aggregating quotes

pub mod aggregator;
pub mod cache;
pub mod fetcher;
pub mod normalizer;

pub use aggregator::PriceService;
pub use cache::ExpiringCache;
pub use fetcher::{CachingFetcher, FetchRequest, HttpClient, ReqwestClient};
