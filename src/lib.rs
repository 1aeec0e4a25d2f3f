//! # Token Rate Feed
//!
//! Builds a periodically refreshed token price feed for one chain by merging
//! centralized-exchange tickers with DEX pool prices, and publishes it as a
//! single snapshot to a shared cache.
//!
//! ## Overview
//!
//! Each cycle of the rate worker:
//!
//! - **Discovery**: scans the on-chain log store past a per-chain watermark for
//!   newly traded or transferred token addresses
//! - **CEX pricing**: prices every listed coin quoted in the stablecoin and maps
//!   it to its contract addresses on the allowed networks
//! - **Batching**: packs the remaining tokens into DEX requests bounded by token
//!   count and by known pool count
//! - **DEX pricing**: fetches pools batch by batch with a fixed pause between
//!   requests, filters thin pools and keeps the highest-volume pool per token
//! - **Publishing**: writes CEX records then DEX records over one cache key
//!
//! A sibling worker refreshes token metadata into its own cache key.
//!
//! ## Architecture
//!
//! ### State
//! `watermark::WatermarkStore` is the only state that outlives a cycle. The
//! rate worker owns it and cycles never overlap.
//!
//! ### Seams
//! Providers (`rate_provider`), the log store (`database::LogStore`) and the
//! cache (`redis_manager::CacheStore`) are traits; `adapters`, `PgLogStore`
//! and `RedisManager` are the production implementations.

// Core Types
/// Chains, price records and provider wire types
pub mod types;
/// Block-range helpers and run ids
pub mod utils;
/// Configuration loading
pub mod settings;

// Infrastructure
/// Postgres log store
pub mod database;
/// Redis cache
pub mod redis_manager;
/// In-process cache
pub mod cache;
/// Prometheus metrics (no-op without `observability`)
pub mod metrics;

// Providers
/// Provider traits and errors
pub mod rate_provider;
/// HTTP provider clients
pub mod adapters;
/// API key rotation
pub mod credentials;

// Aggregation
/// Per-chain watermark and pool weights
pub mod watermark;
/// New token discovery from the log store
pub mod discovery;
/// CEX ticker collection
pub mod cex_collector;
/// DEX request batching
pub mod batch_planner;
/// Rate-limited DEX pool collection
pub mod dex_collector;
/// Pool filtering and per-token resolution
pub mod pool_filters;
/// Snapshot publishing
pub mod feed_publisher;

// Workers
/// Price feed cycle and scheduler
pub mod rate_worker;
/// Token metadata refresher
pub mod token_info_worker;
