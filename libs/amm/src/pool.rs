//! Pool record for one unordered asset pair
//!
//! Reserves live in canonical `(token0, token1)` slots. Operations compute a
//! complete [`PendingUpdate`] with checked arithmetic against the current
//! state and only then [`Pool::commit`] it, so a failed operation never
//! leaves a partial write behind.

use crate::error::{AmmError, AmmResult};
use crate::fixed_point::checked_add;
use crate::types::{Orientation, OwnerId, PairKey};
use ethers_core::types::U256;
use serde::Serialize;
use std::collections::BTreeMap;

/// Reserve and liquidity accounting for a single pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pool {
    key: PairKey,
    reserve0: U256,
    reserve1: U256,
    total_liquidity: U256,
    liquidity_of: BTreeMap<OwnerId, U256>,
}

/// Fully validated next state for a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingUpdate {
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_liquidity: U256,
    /// Owners whose balance changes, with their new balance
    pub balances: BTreeMap<OwnerId, U256>,
}

impl Pool {
    /// Create an empty pool
    pub fn new(key: PairKey) -> Self {
        Self {
            key,
            reserve0: U256::zero(),
            reserve1: U256::zero(),
            total_liquidity: U256::zero(),
            liquidity_of: BTreeMap::new(),
        }
    }

    /// Rebuild a pool from persisted parts without validation
    pub(crate) fn from_parts(
        key: PairKey,
        reserve0: U256,
        reserve1: U256,
        total_liquidity: U256,
        liquidity_of: BTreeMap<OwnerId, U256>,
    ) -> Self {
        Self {
            key,
            reserve0,
            reserve1,
            total_liquidity,
            liquidity_of,
        }
    }

    pub fn key(&self) -> PairKey {
        self.key
    }

    /// Reserves in canonical order
    pub fn canonical_reserves(&self) -> (U256, U256) {
        (self.reserve0, self.reserve1)
    }

    /// Reserves in the caller's `(a, b)` order
    pub fn reserves(&self, orientation: Orientation) -> (U256, U256) {
        orientation.from_canonical((self.reserve0, self.reserve1))
    }

    pub fn total_liquidity(&self) -> U256 {
        self.total_liquidity
    }

    /// Liquidity units held by `owner` (zero if never deposited)
    pub fn liquidity_of(&self, owner: OwnerId) -> U256 {
        self.liquidity_of.get(&owner).copied().unwrap_or_default()
    }

    pub fn liquidity_balances(&self) -> &BTreeMap<OwnerId, U256> {
        &self.liquidity_of
    }

    /// No liquidity units outstanding; the next deposit sets the ratio
    pub fn is_empty(&self) -> bool {
        self.total_liquidity.is_zero()
    }

    /// Both reserves are positive
    pub fn has_reserves(&self) -> bool {
        !self.reserve0.is_zero() && !self.reserve1.is_zero()
    }

    /// Sum of every owner's balance
    pub fn liquidity_sum(&self) -> AmmResult<U256> {
        self.liquidity_of
            .values()
            .try_fold(U256::zero(), |acc, balance| checked_add(acc, *balance))
    }

    /// Start an update that keeps liquidity untouched
    pub(crate) fn pending(&self) -> PendingUpdate {
        PendingUpdate {
            reserve0: self.reserve0,
            reserve1: self.reserve1,
            total_liquidity: self.total_liquidity,
            balances: BTreeMap::new(),
        }
    }

    /// Add `amount` to `owner`'s balance in `update`
    pub(crate) fn credit(
        &self,
        update: &mut PendingUpdate,
        owner: OwnerId,
        amount: U256,
    ) -> AmmResult<()> {
        let current = update.balance_of(self, owner);
        update.balances.insert(owner, checked_add(current, amount)?);
        Ok(())
    }

    /// Remove `amount` from `owner`'s balance in `update`
    pub(crate) fn debit(
        &self,
        update: &mut PendingUpdate,
        owner: OwnerId,
        amount: U256,
    ) -> AmmResult<()> {
        let current = update.balance_of(self, owner);
        let remaining = current
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientLiquidity)?;
        update.balances.insert(owner, remaining);
        Ok(())
    }

    /// Apply a validated update in one step
    pub(crate) fn commit(&mut self, update: PendingUpdate) {
        self.reserve0 = update.reserve0;
        self.reserve1 = update.reserve1;
        self.total_liquidity = update.total_liquidity;
        for (owner, balance) in update.balances {
            self.liquidity_of.insert(owner, balance);
        }
    }
}

impl PendingUpdate {
    /// Set reserves given in the caller's `(a, b)` order
    pub fn set_reserves(&mut self, orientation: Orientation, reserves: (U256, U256)) {
        let (reserve0, reserve1) = orientation.to_canonical(reserves);
        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
    }

    /// Balance of `owner` as this update would leave it
    fn balance_of(&self, pool: &Pool, owner: OwnerId) -> U256 {
        self.balances
            .get(&owner)
            .copied()
            .unwrap_or_else(|| pool.liquidity_of(owner))
    }
}
