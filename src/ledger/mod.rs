//! Ledger module: account registry, journal validation, posting and the orchestrator

pub mod account;
pub mod core;
pub mod journal;
pub mod transaction;

pub use account::*;
pub use self::core::*;
pub use journal::*;
pub use transaction::*;
