//! Error taxonomy for engine operations
//!
//! Every variant is terminal for the operation that produced it. Validation
//! always runs before any state is written, so a returned error means the
//! pool is exactly as it was before the call.

use thiserror::Error;

/// Errors surfaced by the exchange engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// Current time is past the caller's deadline
    #[error("Expired: deadline {deadline} is before current time {now}")]
    Expired { deadline: u64, now: u64 },

    /// Swap path is not exactly two distinct assets
    #[error("Invalid path: expected two distinct assets, got {len} entries")]
    InvalidPath { len: usize },

    /// Both sides of a pair name the same asset
    #[error("Identical assets cannot form a pair")]
    IdenticalAssets,

    /// Pool has no reserves (or too little liquidity) for the requested operation
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    /// Zero input amount
    #[error("Insufficient input amount")]
    InsufficientInputAmount,

    /// Output is zero or below the caller's minimum
    #[error("Insufficient output amount: {amount_out} < minimum {amount_out_min}")]
    InsufficientOutputAmount {
        amount_out: ethers_core::types::U256,
        amount_out_min: ethers_core::types::U256,
    },

    /// Deposited or withdrawn amount is below the caller's minimum
    #[error("Insufficient {side} amount: {amount} < minimum {minimum}")]
    InsufficientAmount {
        side: Side,
        amount: ethers_core::types::U256,
        minimum: ethers_core::types::U256,
    },

    /// A deposit would mint no liquidity units
    #[error("Insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    /// A withdrawal would return nothing on one side
    #[error("Insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    /// Result does not fit in 256 bits
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Division by a zero denominator
    #[error("Division by zero")]
    DivisionByZero,

    /// Constant product decreased across a swap. Indicates a defect, never user error.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Engine settings outside their valid range
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The custody collaborator refused a transfer
    #[error("Custody rejected transfer: {0}")]
    CustodyRejected(String),
}

/// Which side of a caller-ordered pair an amount refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Result alias for engine operations
pub type AmmResult<T> = Result<T, AmmError>;
