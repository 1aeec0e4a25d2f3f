//! Read-only access to the on-chain log store.
//!
//! Trade and transfer logs are ingested by a separate indexer; this crate only
//! asks two questions of them: how far has ingestion progressed, and which
//! token addresses appear in a block range.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, Row};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::settings;

/// PostgreSQL connection pool type alias.
pub type DbPool = Pool<Postgres>;

/// Which column(s) of a log table carry the token address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRole {
    /// Both legs of a swap (`token_in_address`, `token_out_address`).
    TradeLegs,
    /// The transferred token (`token_address`).
    TransferSubject,
}

impl AddressRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressRole::TradeLegs => "trade",
            AddressRole::TransferSubject => "transfer",
        }
    }
}

/// Query surface of the log store consumed by address discovery.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Highest ingested block in `table`; `0` for an empty table.
    async fn latest_block(&self, table: &str) -> Result<i64>;

    /// Distinct token addresses in `table` within `[from_block, to_block]` (inclusive).
    async fn unique_addresses(
        &self,
        table: &str,
        from_block: i64,
        to_block: i64,
        role: AddressRole,
    ) -> Result<Vec<String>>;
}

/// Connects to Postgres, retrying with exponential backoff.
///
/// Exhausting `connect_attempts` is a startup failure and is returned to the caller.
pub async fn connect(config: &settings::Database) -> Result<DbPool> {
    let mut last_err: Option<anyhow::Error> = None;
    let max_attempts = config.connect_attempts.max(1);
    for attempt in 1..=max_attempts {
        match PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await
        {
            Ok(pool) => match sqlx::query("SELECT 1").execute(&pool).await {
                Ok(_) => {
                    log::info!(
                        "✅ Connected to log database (attempt {}/{}).",
                        attempt,
                        max_attempts
                    );
                    return Ok(pool);
                }
                Err(e) => last_err = Some(e.into()),
            },
            Err(e) => {
                last_err = Some(e.into());
            }
        }
        if attempt == max_attempts {
            break;
        }
        let delay_ms = (1u64 << attempt.min(6)) * 200; // 400ms, 800ms, ... capped at 12.8s
        log::warn!(
            "DB connect attempt {}/{} failed. Retrying in {} ms...",
            attempt,
            max_attempts,
            delay_ms
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    Err(last_err
        .unwrap_or_else(|| anyhow::anyhow!("Unknown DB connection error"))
        .context("could not connect to the log database"))
}

/// `LogStore` backed by the indexer's Postgres tables.
#[derive(Clone)]
pub struct PgLogStore {
    pool: DbPool,
}

impl PgLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// Table names come from `Chain` constants, never from input.
fn checked_table(table: &str) -> Result<&str> {
    if !table.is_empty() && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(table)
    } else {
        Err(anyhow::anyhow!("invalid log table name: {:?}", table))
    }
}

fn unique_addresses_sql(table: &str, role: AddressRole) -> String {
    match role {
        AddressRole::TradeLegs => format!(
            "SELECT token_in_address AS address FROM {t} WHERE block_number >= $1 AND block_number <= $2
             UNION
             SELECT token_out_address AS address FROM {t} WHERE block_number >= $1 AND block_number <= $2",
            t = table
        ),
        AddressRole::TransferSubject => format!(
            "SELECT DISTINCT token_address AS address FROM {} WHERE block_number >= $1 AND block_number <= $2",
            table
        ),
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn latest_block(&self, table: &str) -> Result<i64> {
        let table = checked_table(table)?;
        let row = sqlx::query(&format!(
            "SELECT MAX(block_number) AS block_number FROM {}",
            table
        ))
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to read latest block from {}", table))?;

        Ok(row.try_get::<Option<i64>, _>("block_number")?.unwrap_or(0))
    }

    async fn unique_addresses(
        &self,
        table: &str,
        from_block: i64,
        to_block: i64,
        role: AddressRole,
    ) -> Result<Vec<String>> {
        let table = checked_table(table)?;
        let rows = sqlx::query(&unique_addresses_sql(table, role))
            .bind(from_block)
            .bind(to_block)
            .fetch_all(&self.pool)
            .await
            .with_context(|| {
                format!(
                    "failed to read {} addresses from {} [{}, {}]",
                    role.as_str(),
                    table,
                    from_block,
                    to_block
                )
            })?;

        // NULL legs (e.g. native transfers) are dropped
        let addresses: BTreeSet<String> = rows
            .into_iter()
            .filter_map(|row| row.try_get::<Option<String>, _>("address").ok().flatten())
            .filter(|a| !a.is_empty())
            .collect();

        Ok(addresses.into_iter().collect())
    }
}
