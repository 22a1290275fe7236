//! Exchange: the owned store every engine operation runs against
//!
//! Holds the pool registry, the engine settings, the deadline clock and
//! operation counters. Liquidity, swap and quote operations are implemented
//! as `impl Exchange` blocks in their own modules.

use crate::clock::{Clock, SystemClock};
use crate::error::{AmmError, AmmResult};
use crate::registry::PoolRegistry;
use ethers_core::types::U256;
use pairswap_config::EngineSettings;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Counters of committed and rejected operations
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeStats {
    pub deposits: u64,
    pub withdrawals: u64,
    pub swaps: u64,
    pub liquidity_transfers: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Operation {
    Deposit,
    Withdrawal,
    Swap,
    LiquidityTransfer,
}

/// Pool registry plus the configuration that governs its arithmetic
pub struct Exchange {
    registry: PoolRegistry,
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
    stats: RwLock<ExchangeStats>,
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("pairs", &self.registry.pair_count())
            .field("settings", &self.settings)
            .field("stats", &*self.stats.read())
            .finish()
    }
}

impl Exchange {
    /// Exchange checking deadlines against the system clock
    pub fn new(settings: EngineSettings) -> AmmResult<Self> {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Exchange with an explicit time source
    pub fn with_clock(settings: EngineSettings, clock: Arc<dyn Clock>) -> AmmResult<Self> {
        settings
            .validate()
            .map_err(|e| AmmError::InvalidSettings(e.to_string()))?;

        Ok(Self {
            registry: PoolRegistry::new(),
            settings,
            clock,
            stats: RwLock::new(ExchangeStats::default()),
        })
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Swap fee in basis points
    pub fn fee_bps(&self) -> u32 {
        self.settings.fee_bps
    }

    /// Liquidity units locked by a pool's first deposit
    pub fn minimum_liquidity(&self) -> U256 {
        U256::from(self.settings.minimum_liquidity)
    }

    pub fn stats(&self) -> ExchangeStats {
        self.stats.read().clone()
    }

    /// Count the outcome of a mutating operation
    pub(crate) fn record<T>(&self, operation: Operation, result: &AmmResult<T>) {
        let mut stats = self.stats.write();
        if result.is_err() {
            stats.rejected += 1;
            return;
        }
        match operation {
            Operation::Deposit => stats.deposits += 1,
            Operation::Withdrawal => stats.withdrawals += 1,
            Operation::Swap => stats.swaps += 1,
            Operation::LiquidityTransfer => stats.liquidity_transfers += 1,
        }
    }
}
