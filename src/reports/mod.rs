//! Financial reporting: trial balance, balance sheet, profit and loss, cash flow

pub mod aggregator;
pub mod statements;

pub use aggregator::*;
pub use statements::*;
