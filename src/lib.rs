//! Crypto and dollar quote aggregation with TTL-cached upstream fetches

pub mod cli;
pub mod config;
pub mod providers;
pub mod services;
pub mod types;
