//! Quote/Inspection API
//!
//! Read-only views over pool state. Each call takes the pool's shared lock,
//! so quotes run concurrently with each other and never observe a swap or
//! deposit half applied.

use crate::engine::Exchange;
use crate::error::{AmmError, AmmResult};
use crate::fixed_point::{mul_div, to_decimal, wad};
use crate::pool::Pool;
use crate::pool_traits::{AmmPool, OrientedReserves};
use crate::types::{AssetId, OwnerId, PairKey};
use ethers_core::types::{Address, U256};
use pairswap_config::defaults::engine::BPS_DENOMINATOR;
use rust_decimal::Decimal;
use tracing::debug;

impl Exchange {
    /// Fixed18 price of one unit of `asset_a` in units of `asset_b`
    pub fn get_price(&self, asset_a: AssetId, asset_b: AssetId) -> AmmResult<U256> {
        let (reserve_a, reserve_b) = self.get_reserves(asset_a, asset_b)?;
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        mul_div(reserve_b, wad(), reserve_a)
    }

    /// [`Exchange::get_price`] as a `Decimal`, for display
    pub fn get_price_decimal(&self, asset_a: AssetId, asset_b: AssetId) -> AmmResult<Decimal> {
        to_decimal(self.get_price(asset_a, asset_b)?).ok_or(AmmError::ArithmeticOverflow)
    }

    /// Reserves in the caller's order; zeros when no pool exists
    pub fn get_reserves(&self, asset_a: AssetId, asset_b: AssetId) -> AmmResult<(U256, U256)> {
        Ok(self
            .registry()
            .get_pool(asset_a, asset_b)?
            .map(|pool_ref| pool_ref.pool.read().reserves(pool_ref.orientation))
            .unwrap_or_default())
    }

    /// Reserves for a trade from `asset_in` to `asset_out`, with the configured fee
    pub fn oriented_reserves(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
    ) -> AmmResult<OrientedReserves> {
        let (reserve_in, reserve_out) = self.get_reserves(asset_in, asset_out)?;
        Ok(OrientedReserves {
            reserve_in,
            reserve_out,
            fee_bps: self.fee_bps(),
        })
    }

    /// Output a swap of `amount_in` would currently produce
    pub fn quote_amount_out(
        &self,
        amount_in: U256,
        asset_in: AssetId,
        asset_out: AssetId,
    ) -> AmmResult<U256> {
        let amount_out = self
            .oriented_reserves(asset_in, asset_out)?
            .get_amount_out(amount_in)?;
        debug!(
            asset_in = ?asset_in,
            amount_in = %amount_in,
            amount_out = %amount_out,
            "Quoted swap"
        );
        Ok(amount_out)
    }

    /// Input a swap would currently need to produce `amount_out`
    pub fn quote_amount_in(
        &self,
        amount_out: U256,
        asset_in: AssetId,
        asset_out: AssetId,
    ) -> AmmResult<U256> {
        self.oriented_reserves(asset_in, asset_out)?
            .get_amount_in(amount_out)
    }

    /// How far the execution price of a swap falls below the spot price, in basis points
    pub fn price_impact_bps(
        &self,
        amount_in: U256,
        asset_in: AssetId,
        asset_out: AssetId,
    ) -> AmmResult<U256> {
        let reserves = self.oriented_reserves(asset_in, asset_out)?;
        let amount_out = reserves.get_amount_out(amount_in)?;

        // execution / spot = (amount_out / amount_in) / (reserve_out / reserve_in)
        let scaled_out = mul_div(amount_out, reserves.reserve_in, amount_in)?;
        let retained_bps = mul_div(
            scaled_out,
            U256::from(BPS_DENOMINATOR),
            reserves.reserve_out,
        )?;
        Ok(U256::from(BPS_DENOMINATOR).saturating_sub(retained_bps))
    }

    /// Deterministic address of the pair, independent of argument order
    pub fn get_pair(&self, asset_a: AssetId, asset_b: AssetId) -> AmmResult<Address> {
        let (key, _) = PairKey::new(asset_a, asset_b)?;
        Ok(key.pair_address())
    }

    /// Total liquidity units of the pair; zero when no pool exists
    pub fn total_liquidity(&self, asset_a: AssetId, asset_b: AssetId) -> AmmResult<U256> {
        Ok(self
            .registry()
            .get_pool(asset_a, asset_b)?
            .map(|pool_ref| pool_ref.pool.read().total_liquidity())
            .unwrap_or_default())
    }

    /// Liquidity units held by `owner`; zero when no pool exists
    pub fn liquidity_of(
        &self,
        asset_a: AssetId,
        asset_b: AssetId,
        owner: OwnerId,
    ) -> AmmResult<U256> {
        Ok(self
            .registry()
            .get_pool(asset_a, asset_b)?
            .map(|pool_ref| pool_ref.pool.read().liquidity_of(owner))
            .unwrap_or_default())
    }

    /// Consistent copy of the pair's pool record
    pub fn pool_snapshot(&self, asset_a: AssetId, asset_b: AssetId) -> AmmResult<Option<Pool>> {
        Ok(self
            .registry()
            .get_pool(asset_a, asset_b)?
            .map(|pool_ref| pool_ref.pool.read().clone()))
    }
}
