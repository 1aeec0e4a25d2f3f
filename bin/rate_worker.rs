//! # Rate Worker Service
//!
//! Publishes the merged CEX/DEX token price feed to Redis on a fixed interval,
//! and runs the token metadata refresher alongside it.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin rate_worker -- --config Config.toml
//! cargo run --bin rate_worker -- --once --dry-run   # one cycle, print the feed, no Redis
//! ```
//!
//! Press Ctrl+C to stop.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use token_rate_feed::{
    adapters::{BinanceClient, CoinMarketCapClient, DexScreenerClient},
    cache::MemoryCache,
    database::{self, PgLogStore},
    redis_manager::{CacheStore, RedisConfig, RedisManager},
    settings::Settings,
    rate_worker::RateWorker,
    token_info_worker::TokenInfoWorker,
};

#[derive(Parser, Debug)]
#[command(name = "rate_worker", about = "Token price feed worker")]
struct Cli {
    /// Config file (defaults to $RATE_FEED_CONFIG or Config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Publish to an in-process cache instead of Redis
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    println!("🚀 Starting Rate Worker Service");
    println!("═══════════════════════════════════════════════════════════════════\n");

    // 1. Load settings
    let settings = match &cli.config {
        Some(path) => Settings::load(path),
        None => Settings::new(),
    }
    .context("Failed to load settings")?;
    println!("✅ Settings loaded");

    #[cfg(feature = "observability")]
    {
        token_rate_feed::metrics::install_exporter(&settings.metrics.listen_addr)?;
        println!("✅ Metrics exporter listening on {}", settings.metrics.listen_addr);
    }

    // 2. Connect to database
    let db_pool = database::connect(&settings.database).await?;
    let log_store = Arc::new(PgLogStore::new(db_pool));
    println!("✅ Database connected");

    // 3. Connect to cache
    let memory_cache = MemoryCache::new();
    let cache: Arc<dyn CacheStore> = if cli.dry_run {
        println!("⚠️  Dry run: publishing to an in-process cache");
        Arc::new(memory_cache.clone())
    } else {
        let redis = RedisManager::new(RedisConfig {
            url: settings.redis.url.clone(),
        })
        .await?;
        println!("✅ Redis connected");
        Arc::new(redis)
    };

    // 4. Provider clients
    let cex = Arc::new(BinanceClient::new(&settings.cex)?);
    let dex = Arc::new(DexScreenerClient::new(&settings.dex)?);
    println!("✅ Provider clients ready");

    let mut worker = RateWorker::new(&settings, log_store, cex, dex, cache.clone());

    if cli.once {
        let report = worker.run_cycle().await;
        println!(
            "✅ Cycle {} finished: {} cex + {} dex records, published: {}",
            report.run_id, report.cex_records, report.dex_records, report.published
        );
        if cli.dry_run {
            if let Some(feed) = memory_cache.get(&settings.rate_worker.feed_key).await? {
                println!("{}", String::from_utf8_lossy(&feed));
            }
        }
        return Ok(());
    }

    // 5. Token metadata refresher
    let token_info_handle = if settings.token_info.enabled && !settings.token_info.api_keys.is_empty() {
        let provider = CoinMarketCapClient::new(&settings.token_info)?;
        let token_info = TokenInfoWorker::new(Box::new(provider), cache.clone(), &settings.token_info);
        Some(tokio::spawn(token_info.run()))
    } else {
        log::warn!("Token info worker disabled (token_info.enabled = false or no API keys)");
        None
    };

    println!("💡 Service running:");
    println!(
        "   - Price feed cycles run every {} seconds into '{}'",
        settings.rate_worker.interval_seconds, settings.rate_worker.feed_key
    );
    if token_info_handle.is_some() {
        println!(
            "   - Token info refreshes every {} seconds into '{}'",
            settings.token_info_interval().as_secs(),
            settings.token_info.cache_key
        );
    }
    println!("\nPress Ctrl+C to stop...\n");

    tokio::select! {
        _ = worker.run() => {}
        res = signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl+C")?;
            println!("\n🛑 Shutdown signal received, stopping...");
        }
    }

    if let Some(handle) = token_info_handle {
        handle.abort();
    }
    println!("✅ Shutdown complete");

    Ok(())
}
