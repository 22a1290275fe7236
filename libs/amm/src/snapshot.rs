//! Persisted ledger layout
//!
//! One record per pool: `{ token0, token1, reserve0, reserve1,
//! total_liquidity, liquidity_of }`, keyed by the canonical pair. Amounts
//! are stored as hex `U256` strings so no precision is lost through JSON.

use crate::clock::Clock;
use crate::engine::Exchange;
use crate::error::AmmError;
use crate::pool::Pool;
use crate::types::{AssetId, OwnerId, PairKey};
use ethers_core::types::U256;
use pairswap_config::{EngineSettings, ExchangeConfig, StorageSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Engine(#[from] AmmError),
}

/// Persisted state of one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub token0: AssetId,
    pub token1: AssetId,
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_liquidity: U256,
    pub liquidity_of: BTreeMap<OwnerId, U256>,
}

/// Persisted state of every pool in an exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub pools: Vec<PoolRecord>,
}

impl From<&Pool> for PoolRecord {
    fn from(pool: &Pool) -> Self {
        let (reserve0, reserve1) = pool.canonical_reserves();
        Self {
            token0: pool.key().token0(),
            token1: pool.key().token1(),
            reserve0,
            reserve1,
            total_liquidity: pool.total_liquidity(),
            liquidity_of: pool.liquidity_balances().clone(),
        }
    }
}

impl PoolRecord {
    /// Rebuild the pool, rejecting records that break pool invariants
    fn into_pool(self) -> Result<Pool, SnapshotError> {
        let key = PairKey::from_sorted(self.token0, self.token1).ok_or_else(|| {
            SnapshotError::Corrupt(format!(
                "pair {:?}/{:?} is not in canonical order",
                self.token0, self.token1
            ))
        })?;

        let pool = Pool::from_parts(
            key,
            self.reserve0,
            self.reserve1,
            self.total_liquidity,
            self.liquidity_of,
        );

        let sum = pool.liquidity_sum()?;
        if sum != pool.total_liquidity() {
            return Err(SnapshotError::Corrupt(format!(
                "pair {}: balances sum to {} but total liquidity is {}",
                key,
                sum,
                pool.total_liquidity()
            )));
        }
        let (reserve0, reserve1) = pool.canonical_reserves();
        let consistent = if pool.is_empty() {
            reserve0.is_zero() && reserve1.is_zero()
        } else {
            pool.has_reserves()
        };
        if !consistent {
            return Err(SnapshotError::Corrupt(format!(
                "pair {}: reserves and liquidity disagree on whether the pool is funded",
                key
            )));
        }
        Ok(pool)
    }
}

impl LedgerSnapshot {
    /// Write as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!(path = ?path, pools = self.pools.len(), "Saved ledger snapshot");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let reader = BufReader::new(fs::File::open(path)?);
        let snapshot: Self = serde_json::from_reader(reader)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Corrupt(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

impl Exchange {
    /// Copy every pool's state; each pool is read under its own lock
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            pools: self
                .registry()
                .snapshot_pools()
                .iter()
                .map(PoolRecord::from)
                .collect(),
        }
    }

    /// Build an exchange holding the pools of `snapshot`
    pub fn restore(
        settings: EngineSettings,
        clock: Arc<dyn Clock>,
        snapshot: LedgerSnapshot,
    ) -> Result<Self, SnapshotError> {
        let exchange = Self::with_clock(settings, clock)?;
        for record in snapshot.pools {
            exchange.registry().insert(record.into_pool()?);
        }
        info!(pools = exchange.registry().pair_count(), "Restored ledger snapshot");
        Ok(exchange)
    }

    /// Build an exchange from configuration, restoring `storage.snapshot_path` when it exists
    pub fn from_config(
        config: &ExchangeConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SnapshotError> {
        match &config.storage.snapshot_path {
            Some(path) if path.exists() => {
                Self::restore(config.engine, clock, LedgerSnapshot::load(path)?)
            }
            _ => Ok(Self::with_clock(config.engine, clock)?),
        }
    }

    /// Write a snapshot to `storage.snapshot_path`. Returns `false` when no path is configured.
    pub fn persist(&self, storage: &StorageSettings) -> Result<bool, SnapshotError> {
        match &storage.snapshot_path {
            Some(path) => {
                self.snapshot().save(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
