//! Asset, owner and pair identifiers
//!
//! Pairs are unordered: `(A, B)` and `(B, A)` name the same pool. [`PairKey`]
//! stores the two assets in ascending byte order and [`Orientation`] records
//! how the caller's order maps onto it.

use crate::error::{AmmError, AmmResult};
use ethers_core::types::{Address, H160, U256};
use ethers_core::utils::keccak256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque 20-byte identifier of a fungible asset
pub type AssetId = Address;

/// Identity of a liquidity provider or recipient
pub type OwnerId = Address;

/// Holder of the liquidity permanently locked by a pool's first deposit
pub const LOCKED_LIQUIDITY_OWNER: OwnerId = H160([0u8; 20]);

/// Canonical identity of an unordered asset pair (`token0 < token1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    token0: AssetId,
    token1: AssetId,
}

/// How a caller's `(asset_a, asset_b)` order maps onto `(token0, token1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `asset_a == token0`
    Canonical,
    /// `asset_a == token1`
    Reversed,
}

impl PairKey {
    /// Canonicalize two assets, returning the key and the caller's orientation
    pub fn new(asset_a: AssetId, asset_b: AssetId) -> AmmResult<(Self, Orientation)> {
        if asset_a == asset_b {
            return Err(AmmError::IdenticalAssets);
        }
        if asset_a < asset_b {
            Ok((
                Self {
                    token0: asset_a,
                    token1: asset_b,
                },
                Orientation::Canonical,
            ))
        } else {
            Ok((
                Self {
                    token0: asset_b,
                    token1: asset_a,
                },
                Orientation::Reversed,
            ))
        }
    }

    /// Build from tokens that are already in canonical order (snapshot restore)
    pub fn from_sorted(token0: AssetId, token1: AssetId) -> Option<Self> {
        (token0 < token1).then_some(Self { token0, token1 })
    }

    pub fn token0(&self) -> AssetId {
        self.token0
    }

    pub fn token1(&self) -> AssetId {
        self.token1
    }

    /// Whether `asset` is one side of this pair
    pub fn contains(&self, asset: AssetId) -> bool {
        self.token0 == asset || self.token1 == asset
    }

    /// Deterministic 20-byte address identifying the pair
    ///
    /// Last 20 bytes of `keccak256(token0 ‖ token1)`, so it is stable across
    /// processes and independent of argument order.
    pub fn pair_address(&self) -> Address {
        let mut packed = [0u8; 40];
        packed[..20].copy_from_slice(self.token0.as_bytes());
        packed[20..].copy_from_slice(self.token1.as_bytes());
        let hash = keccak256(packed);
        Address::from_slice(&hash[12..])
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.token0, self.token1)
    }
}

impl Orientation {
    /// Reorder canonical `(x0, x1)` values into the caller's `(a, b)` order
    pub fn from_canonical(self, values: (U256, U256)) -> (U256, U256) {
        match self {
            Orientation::Canonical => values,
            Orientation::Reversed => (values.1, values.0),
        }
    }

    /// Reorder caller `(a, b)` values into canonical `(x0, x1)` order
    pub fn to_canonical(self, values: (U256, U256)) -> (U256, U256) {
        // Swapping is its own inverse
        self.from_canonical(values)
    }
}
