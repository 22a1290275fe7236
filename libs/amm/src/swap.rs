//! Swap Engine
//!
//! Exact-input swaps against the constant-product curve `x * y = k`.
//! The fee, when configured, stays in the pool and grows `k`.

use crate::engine::{Exchange, Operation};
use crate::error::{AmmError, AmmResult};
use crate::fixed_point::{
    checked_add, checked_mul, checked_sub, mul_div, mul_div_rounding_up, product,
};
use crate::types::{AssetId, OwnerId};
use ethers_core::types::U256;
use pairswap_config::defaults::engine::BPS_DENOMINATOR;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Arguments of [`Exchange::swap_exact_tokens_for_tokens`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapParams {
    pub amount_in: U256,
    pub amount_out_min: U256,
    /// `[asset_in, asset_out]`
    pub path: Vec<AssetId>,
    pub recipient: OwnerId,
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub amount_in: U256,
    pub amount_out: U256,
}

/// Fee-free output: `amount_in * reserve_out / (reserve_in + amount_in)`
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> AmmResult<U256> {
    if amount_in.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let denominator = checked_add(reserve_in, amount_in)?;
    mul_div(amount_in, reserve_out, denominator)
}

/// Output after a fee of `fee_bps` is taken from the input
pub fn get_amount_out_with_fee(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> AmmResult<U256> {
    if fee_bps == 0 {
        return get_amount_out(amount_in, reserve_in, reserve_out);
    }
    if amount_in.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }

    let amount_in_with_fee = checked_mul(amount_in, fee_multiplier(fee_bps)?)?;
    let denominator = checked_add(
        checked_mul(reserve_in, U256::from(BPS_DENOMINATOR))?,
        amount_in_with_fee,
    )?;
    mul_div(amount_in_with_fee, reserve_out, denominator)
}

/// Input needed to receive exactly `amount_out`, rounded up
pub fn get_amount_in(
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> AmmResult<U256> {
    if amount_out.is_zero() {
        return Err(AmmError::InsufficientOutputAmount {
            amount_out,
            amount_out_min: U256::zero(),
        });
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }

    let numerator = checked_mul(amount_out, U256::from(BPS_DENOMINATOR))?;
    let denominator = checked_mul(
        checked_sub(reserve_out, amount_out)?,
        fee_multiplier(fee_bps)?,
    )?;
    mul_div_rounding_up(reserve_in, numerator, denominator)
}

fn fee_multiplier(fee_bps: u32) -> AmmResult<U256> {
    BPS_DENOMINATOR
        .checked_sub(fee_bps)
        .filter(|multiplier| *multiplier > 0)
        .map(U256::from)
        .ok_or_else(|| AmmError::InvalidSettings(format!("fee_bps {} out of range", fee_bps)))
}

/// Split a swap path into `(asset_in, asset_out)`
pub fn validate_path(path: &[AssetId]) -> AmmResult<(AssetId, AssetId)> {
    match path {
        [asset_in, asset_out] if asset_in != asset_out => Ok((*asset_in, *asset_out)),
        _ => Err(AmmError::InvalidPath { len: path.len() }),
    }
}

impl Exchange {
    /// Swap exactly `amount_in` of `path[0]` for as much `path[1]` as the curve gives.
    ///
    /// The caller moves `amount_in` into the pool and pays `amount_out` to
    /// `recipient`; the engine only updates reserves.
    pub fn swap_exact_tokens_for_tokens(&self, params: &SwapParams) -> AmmResult<SwapReceipt> {
        let result = self.try_swap(params);
        self.record(Operation::Swap, &result);
        result
    }

    fn try_swap(&self, params: &SwapParams) -> AmmResult<SwapReceipt> {
        let (asset_in, asset_out) = validate_path(&params.path)?;
        self.clock().ensure_not_expired(params.deadline)?;

        let pool_ref = self
            .registry()
            .get_pool(asset_in, asset_out)?
            .ok_or(AmmError::InsufficientLiquidity)?;
        let orientation = pool_ref.orientation;
        let mut pool = pool_ref.pool.write();

        let (reserve_in, reserve_out) = pool.reserves(orientation);
        let amount_out =
            get_amount_out_with_fee(params.amount_in, reserve_in, reserve_out, self.fee_bps())?;

        if amount_out.is_zero() || amount_out < params.amount_out_min {
            return Err(AmmError::InsufficientOutputAmount {
                amount_out,
                amount_out_min: params.amount_out_min,
            });
        }

        let new_reserve_in = checked_add(reserve_in, params.amount_in)?;
        let new_reserve_out = checked_sub(reserve_out, amount_out)?;

        let k_before = product(reserve_in, reserve_out);
        let k_after = product(new_reserve_in, new_reserve_out);
        if k_after < k_before {
            error!(
                pair = %pool_ref.key,
                reserve_in = %reserve_in,
                reserve_out = %reserve_out,
                amount_in = %params.amount_in,
                amount_out = %amount_out,
                "Constant product decreased; swap aborted"
            );
            return Err(AmmError::InvariantViolation(format!(
                "k fell from {} to {}",
                k_before, k_after
            )));
        }

        let mut update = pool.pending();
        update.set_reserves(orientation, (new_reserve_in, new_reserve_out));
        pool.commit(update);

        info!(
            pair = %pool_ref.key,
            asset_in = ?asset_in,
            recipient = ?params.recipient,
            amount_in = %params.amount_in,
            amount_out = %amount_out,
            "Swap executed"
        );

        Ok(SwapReceipt {
            amount_in: params.amount_in,
            amount_out,
        })
    }
}
