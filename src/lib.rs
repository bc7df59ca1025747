//! # Bookkeeping Core
//!
//! A double-entry bookkeeping engine for small-business accounting.
//!
//! ## Features
//!
//! - **Account registry**: Asset, Liability, Equity, Revenue, and Expense accounts with running balances
//! - **Journal validation**: a pure check that every draft is complete and balanced
//! - **Atomic posting**: a transaction, its entries and the balance changes are committed together
//! - **Financial reporting**: trial balance, balance sheet, profit and loss, cash flow
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use bigdecimal::BigDecimal;
//! use bookkeeping_core::utils::MemoryStorage;
//! use bookkeeping_core::{AccountType, DraftBuilder, Ledger};
//! use chrono::NaiveDate;
//!
//! # async fn run() -> bookkeeping_core::LedgerResult<()> {
//! let ledger = Ledger::new(MemoryStorage::new());
//! let cash = ledger
//!     .create_account_with_code("1000", "Cash", AccountType::Asset, None)
//!     .await?;
//! let sales = ledger
//!     .create_account_with_code("4000", "Sales Revenue", AccountType::Revenue, None)
//!     .await?;
//!
//! let sale = DraftBuilder::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Cash sale")
//!     .debit(&cash.id, BigDecimal::from(1000), None)
//!     .credit(&sales.id, BigDecimal::from(1000), None)
//!     .build()?;
//! ledger.post(sale).await?;
//!
//! assert!(ledger.trial_balance().await?.is_balanced());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ledger;
pub mod reports;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use reports::*;
pub use traits::*;
pub use types::*;

// Re-export journal templates for convenience
pub use ledger::journal::patterns;
