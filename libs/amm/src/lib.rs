//! # Pairswap AMM - Constant-Product Exchange Engine
//!
//! ## Purpose
//!
//! Bookkeeping core of a two-asset automated exchange. Pools hold reserves of
//! an unordered asset pair; providers deposit matched amounts to mint
//! liquidity units and burn them for a proportional share; traders swap one
//! asset for the other at a price set only by the reserve ratio.
//!
//! ## Integration Points
//!
//! - **Callers**: transaction-submission layers invoke [`Exchange`] operations
//! - **Custody**: assets move through an [`AssetTransfer`] implementation
//!   driven around engine calls (see [`SettledExchange`]); the engine itself
//!   performs no I/O beyond optional snapshot files
//! - **Configuration**: [`pairswap_config::EngineSettings`] fixes the swap fee
//!   and the liquidity locked by each pool's first deposit
//!
//! ## Guarantees
//!
//! - **Precision**: fixed18 `U256` amounts, 512-bit intermediates, no floats
//! - **Atomicity**: every operation validates against a consistent view of its
//!   pool and commits all writes in one step, or fails with nothing written
//! - **Isolation**: one `RwLock` per pool; quotes share it, mutations own it
//! - **Invariant**: `reserve_in * reserve_out` never decreases across a swap
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ethers_core::types::{Address, U256};
//! use pairswap_amm::{fixed_point::units, AddLiquidityParams, Exchange, ManualClock, SwapParams};
//! use pairswap_config::EngineSettings;
//!
//! let exchange = Exchange::with_clock(EngineSettings::default(), Arc::new(ManualClock::new(0)))?;
//! let (a, b) = (Address::from_low_u64_be(1), Address::from_low_u64_be(2));
//! let provider = Address::from_low_u64_be(10);
//!
//! exchange.add_liquidity(&AddLiquidityParams {
//!     asset_a: a,
//!     asset_b: b,
//!     amount_a_desired: units(1000),
//!     amount_b_desired: units(2000),
//!     amount_a_min: U256::zero(),
//!     amount_b_min: U256::zero(),
//!     recipient: provider,
//!     deadline: 60,
//! })?;
//! assert_eq!(exchange.get_price(a, b)?, units(2));
//!
//! let receipt = exchange.swap_exact_tokens_for_tokens(&SwapParams {
//!     amount_in: units(10),
//!     amount_out_min: units(19),
//!     path: vec![a, b],
//!     recipient: provider,
//!     deadline: 60,
//! })?;
//! assert!(receipt.amount_out >= units(19));
//! # Ok::<(), pairswap_amm::AmmError>(())
//! ```

pub mod clock;
pub mod custody;
pub mod engine;
pub mod error;
pub mod fixed_point;
pub mod liquidity;
pub mod pool;
pub mod pool_traits;
pub mod quote;
pub mod registry;
pub mod snapshot;
pub mod swap;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::{AssetTransfer, InMemoryCustody, SettledExchange};
pub use engine::{Exchange, ExchangeStats};
pub use error::{AmmError, AmmResult, Side};
pub use liquidity::{
    AddLiquidityParams, AddLiquidityReceipt, RemoveLiquidityParams, RemoveLiquidityReceipt,
};
pub use pool::Pool;
pub use pool_traits::{AmmPool, OrientedReserves};
pub use registry::{PoolRef, PoolRegistry};
pub use snapshot::{LedgerSnapshot, PoolRecord, SnapshotError};
pub use swap::{get_amount_in, get_amount_out, get_amount_out_with_fee, SwapParams, SwapReceipt};
pub use types::{AssetId, Orientation, OwnerId, PairKey, LOCKED_LIQUIDITY_OWNER};

/// Common numeric types for callers
pub use ethers_core::types::{Address, U256};
