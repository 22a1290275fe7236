//! # Pairswap Centralized Configuration
//!
//! Configuration management, defaults and logging setup shared by every
//! crate in the workspace.
//!
//! ## Features
//!
//! - **Engine Settings**: swap fee and the permanently locked minimum liquidity
//! - **Logging Settings**: filter level and output format for `tracing`
//! - **Storage Settings**: where ledger snapshots are written
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pairswap_config::{load_config, logging};
//!
//! let config = load_config(None).expect("configuration");
//! logging::init_tracing(&config.logging).expect("subscriber");
//! println!("swap fee: {} bps", config.engine.fee_bps);
//! ```

pub mod defaults;
pub mod exchange_config;
pub mod logging;

// Re-export commonly used types
pub use exchange_config::{
    load_config, EngineSettings, ExchangeConfig, LoggingSettings, StorageSettings,
};
