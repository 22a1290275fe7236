//! Liquidity Engine
//!
//! Deposits mint liquidity units proportional to the pool's existing
//! reserves; withdrawals burn them for a proportional share. The first
//! deposit into an empty pool sets the price and mints the geometric mean of
//! the two amounts, minus a minimum that is locked forever so the pool can
//! never be drained to a zero total supply.

use crate::engine::{Exchange, Operation};
use crate::error::{AmmError, AmmResult, Side};
use crate::fixed_point::{checked_add, checked_sub, mul_div, sqrt_product};
use crate::types::{AssetId, OwnerId, LOCKED_LIQUIDITY_OWNER};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Arguments of [`Exchange::add_liquidity`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityParams {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub amount_a_desired: U256,
    pub amount_b_desired: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub recipient: OwnerId,
    pub deadline: u64,
}

/// Amounts actually deposited and units minted, in the caller's asset order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityReceipt {
    pub amount_a: U256,
    pub amount_b: U256,
    pub liquidity_minted: U256,
}

/// Arguments of [`Exchange::remove_liquidity`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityParams {
    /// Holder whose units are burned
    pub owner: OwnerId,
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub liquidity: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    /// Receives the withdrawn assets
    pub recipient: OwnerId,
    pub deadline: u64,
}

/// Amounts owed to the recipient, in the caller's asset order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityReceipt {
    pub amount_a: U256,
    pub amount_b: U256,
}

/// Amount of B matching `amount_a` at the current reserve ratio
pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> AmmResult<U256> {
    if amount_a.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    mul_div(amount_a, reserve_b, reserve_a)
}

/// Largest deposit within the desired amounts that preserves the reserve ratio
pub fn optimal_amounts(
    amount_a_desired: U256,
    amount_b_desired: U256,
    reserve_a: U256,
    reserve_b: U256,
) -> AmmResult<(U256, U256)> {
    let amount_b_optimal = quote(amount_a_desired, reserve_a, reserve_b)?;
    if amount_b_optimal <= amount_b_desired {
        return Ok((amount_a_desired, amount_b_optimal));
    }

    let amount_a_optimal = quote(amount_b_desired, reserve_b, reserve_a)?;
    if amount_a_optimal > amount_a_desired {
        return Err(AmmError::InvariantViolation(format!(
            "optimal A {} exceeds desired {}",
            amount_a_optimal, amount_a_desired
        )));
    }
    Ok((amount_a_optimal, amount_b_desired))
}

/// Units minted by the first deposit: `sqrt(a * b) - minimum_liquidity`
pub fn initial_liquidity(
    amount_a: U256,
    amount_b: U256,
    minimum_liquidity: U256,
) -> AmmResult<U256> {
    let geometric_mean = sqrt_product(amount_a, amount_b)?;
    if geometric_mean <= minimum_liquidity {
        return Err(AmmError::InsufficientLiquidityMinted);
    }
    checked_sub(geometric_mean, minimum_liquidity)
}

/// Units minted by a deposit into a funded pool; the smaller side wins
pub fn proportional_liquidity(
    amount_a: U256,
    amount_b: U256,
    reserve_a: U256,
    reserve_b: U256,
    total_liquidity: U256,
) -> AmmResult<U256> {
    let from_a = mul_div(total_liquidity, amount_a, reserve_a)?;
    let from_b = mul_div(total_liquidity, amount_b, reserve_b)?;
    Ok(from_a.min(from_b))
}

fn ensure_minimum(side: Side, amount: U256, minimum: U256) -> AmmResult<()> {
    if amount < minimum {
        return Err(AmmError::InsufficientAmount {
            side,
            amount,
            minimum,
        });
    }
    Ok(())
}

impl Exchange {
    /// Deposit a matched pair and mint liquidity units to `recipient`.
    ///
    /// The caller moves the returned amounts into the pool's custody; the
    /// engine only records them.
    pub fn add_liquidity(&self, params: &AddLiquidityParams) -> AmmResult<AddLiquidityReceipt> {
        let result = self.try_add_liquidity(params);
        self.record(Operation::Deposit, &result);
        result
    }

    fn try_add_liquidity(&self, params: &AddLiquidityParams) -> AmmResult<AddLiquidityReceipt> {
        self.clock().ensure_not_expired(params.deadline)?;

        let pool_ref = self
            .registry()
            .get_or_create_pool(params.asset_a, params.asset_b)?;
        let orientation = pool_ref.orientation;
        let mut pool = pool_ref.pool.write();

        let (reserve_a, reserve_b) = pool.reserves(orientation);
        let first_deposit = pool.is_empty();

        let (amount_a, amount_b) = if first_deposit {
            (params.amount_a_desired, params.amount_b_desired)
        } else {
            optimal_amounts(
                params.amount_a_desired,
                params.amount_b_desired,
                reserve_a,
                reserve_b,
            )?
        };
        ensure_minimum(Side::A, amount_a, params.amount_a_min)?;
        ensure_minimum(Side::B, amount_b, params.amount_b_min)?;

        let mut update = pool.pending();
        let liquidity_minted = if first_deposit {
            let locked = self.minimum_liquidity();
            let minted = initial_liquidity(amount_a, amount_b, locked)?;
            pool.credit(&mut update, LOCKED_LIQUIDITY_OWNER, locked)?;
            update.total_liquidity = checked_add(update.total_liquidity, locked)?;
            minted
        } else {
            proportional_liquidity(
                amount_a,
                amount_b,
                reserve_a,
                reserve_b,
                pool.total_liquidity(),
            )?
        };
        if liquidity_minted.is_zero() {
            return Err(AmmError::InsufficientLiquidityMinted);
        }

        pool.credit(&mut update, params.recipient, liquidity_minted)?;
        update.total_liquidity = checked_add(update.total_liquidity, liquidity_minted)?;
        update.set_reserves(
            orientation,
            (
                checked_add(reserve_a, amount_a)?,
                checked_add(reserve_b, amount_b)?,
            ),
        );

        pool.commit(update);

        info!(
            pair = %pool_ref.key,
            recipient = ?params.recipient,
            amount_a = %amount_a,
            amount_b = %amount_b,
            liquidity_minted = %liquidity_minted,
            first_deposit,
            "Liquidity added"
        );

        Ok(AddLiquidityReceipt {
            amount_a,
            amount_b,
            liquidity_minted,
        })
    }

    /// Burn `owner`'s liquidity units for a proportional share of reserves.
    ///
    /// The caller pays the returned amounts out to `recipient`.
    pub fn remove_liquidity(
        &self,
        params: &RemoveLiquidityParams,
    ) -> AmmResult<RemoveLiquidityReceipt> {
        let result = self.try_remove_liquidity(params);
        self.record(Operation::Withdrawal, &result);
        result
    }

    fn try_remove_liquidity(
        &self,
        params: &RemoveLiquidityParams,
    ) -> AmmResult<RemoveLiquidityReceipt> {
        self.clock().ensure_not_expired(params.deadline)?;

        if params.liquidity.is_zero() || params.owner == LOCKED_LIQUIDITY_OWNER {
            return Err(AmmError::InsufficientLiquidity);
        }

        let pool_ref = self
            .registry()
            .get_pool(params.asset_a, params.asset_b)?
            .ok_or(AmmError::InsufficientLiquidity)?;
        let orientation = pool_ref.orientation;
        let mut pool = pool_ref.pool.write();

        if params.liquidity > pool.liquidity_of(params.owner) {
            debug!(
                owner = ?params.owner,
                requested = %params.liquidity,
                held = %pool.liquidity_of(params.owner),
                "Withdrawal exceeds balance"
            );
            return Err(AmmError::InsufficientLiquidity);
        }

        let (reserve_a, reserve_b) = pool.reserves(orientation);
        let total = pool.total_liquidity();
        let amount_a = mul_div(reserve_a, params.liquidity, total)?;
        let amount_b = mul_div(reserve_b, params.liquidity, total)?;

        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        ensure_minimum(Side::A, amount_a, params.amount_a_min)?;
        ensure_minimum(Side::B, amount_b, params.amount_b_min)?;

        let mut update = pool.pending();
        pool.debit(&mut update, params.owner, params.liquidity)?;
        update.total_liquidity = checked_sub(total, params.liquidity)?;
        update.set_reserves(
            orientation,
            (
                checked_sub(reserve_a, amount_a)?,
                checked_sub(reserve_b, amount_b)?,
            ),
        );

        pool.commit(update);

        info!(
            pair = %pool_ref.key,
            owner = ?params.owner,
            recipient = ?params.recipient,
            liquidity_burned = %params.liquidity,
            amount_a = %amount_a,
            amount_b = %amount_b,
            "Liquidity removed"
        );

        Ok(RemoveLiquidityReceipt { amount_a, amount_b })
    }

    /// Move liquidity units between owners of the same pool
    pub fn transfer_liquidity(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        from: OwnerId,
        to: OwnerId,
        amount: U256,
    ) -> AmmResult<()> {
        let result = self.try_transfer_liquidity(asset_a, asset_b, from, to, amount);
        self.record(Operation::LiquidityTransfer, &result);
        result
    }

    fn try_transfer_liquidity(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        from: OwnerId,
        to: OwnerId,
        amount: U256,
    ) -> AmmResult<()> {
        if from == LOCKED_LIQUIDITY_OWNER {
            return Err(AmmError::InsufficientLiquidity);
        }

        let pool_ref = self
            .registry()
            .get_pool(asset_a, asset_b)?
            .ok_or(AmmError::InsufficientLiquidity)?;
        let mut pool = pool_ref.pool.write();

        let mut update = pool.pending();
        pool.debit(&mut update, from, amount)?;
        pool.credit(&mut update, to, amount)?;
        pool.commit(update);

        debug!(
            pair = %pool_ref.key,
            from = ?from,
            to = ?to,
            amount = %amount,
            "Liquidity transferred"
        );
        Ok(())
    }
}
