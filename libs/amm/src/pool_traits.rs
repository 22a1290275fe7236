//! Unified quote interface over a directional reserve view

use crate::error::AmmResult;
use crate::swap::{get_amount_in, get_amount_out_with_fee};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Quote surface shared by anything that can price a one-directional trade
pub trait AmmPool {
    /// Fixed18 output for an exact `amount_in`, rounded down; fails on empty reserves
    fn get_amount_out(&self, amount_in: U256) -> AmmResult<U256>;

    /// Smallest input that yields at least `amount_out`; fails if it would drain `reserve_out`
    fn get_amount_in(&self, amount_out: U256) -> AmmResult<U256>;

    /// Reserves oriented as `(reserve_in, reserve_out)`
    fn get_liquidity(&self) -> (U256, U256);

    /// Fee taken from the input, in basis points of 10_000
    fn get_fee_bps(&self) -> u32;
}

/// Pool reserves oriented for a trade from `asset_in` to `asset_out`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientedReserves {
    pub reserve_in: U256,
    pub reserve_out: U256,
    pub fee_bps: u32,
}

impl AmmPool for OrientedReserves {
    fn get_amount_out(&self, amount_in: U256) -> AmmResult<U256> {
        get_amount_out_with_fee(amount_in, self.reserve_in, self.reserve_out, self.fee_bps)
    }

    fn get_amount_in(&self, amount_out: U256) -> AmmResult<U256> {
        get_amount_in(amount_out, self.reserve_in, self.reserve_out, self.fee_bps)
    }

    fn get_liquidity(&self) -> (U256, U256) {
        (self.reserve_in, self.reserve_out)
    }

    fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }
}
