//! Default configuration values
//!
//! Constants used when a configuration source leaves a setting unspecified.

/// Engine defaults
pub mod engine {
    /// Swap fee in basis points. The reference deployment charges no fee.
    pub const FEE_BPS: u32 = 0;

    /// Basis point denominator (10_000 = 100%)
    pub const BPS_DENOMINATOR: u32 = 10_000;

    /// Liquidity units locked forever on the first deposit into a pool (raw units)
    pub const MINIMUM_LIQUIDITY: u64 = 1_000;
}

/// Logging defaults
pub mod logging {
    /// Default filter directive when neither config nor `RUST_LOG` provide one
    pub const LEVEL: &str = "info";
}

/// Configuration source locations
pub mod sources {
    /// Base configuration file
    pub const BASE_FILE: &str = "config/pairswap.toml";

    /// Directory holding `<environment>.toml` overrides
    pub const ENVIRONMENTS_DIR: &str = "config/environments";

    /// Prefix for environment variable overrides (`PAIRSWAP_ENGINE__FEE_BPS=30`)
    pub const ENV_PREFIX: &str = "PAIRSWAP";
}
