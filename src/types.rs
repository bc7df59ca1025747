//! Core types and data structures for the bookkeeping engine

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Account types following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Assets - what the business owns (Cash, Inventory, Equipment, etc.)
    Asset,
    /// Liabilities - what the business owes (Loans, Accounts Payable, etc.)
    Liability,
    /// Equity - owner's interest in the business (Capital, Retained Earnings, etc.)
    Equity,
    /// Revenue - money earned by the business
    Revenue,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountType {
    /// Every account type, in chart-of-accounts order
    pub const ALL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Revenue,
        AccountType::Expense,
    ];

    /// Returns the normal balance side for this account type.
    ///
    /// Assets and Expenses normally have debit balances;
    /// Liabilities, Equity, and Revenue normally have credit balances.
    pub fn normal_balance(&self) -> EntryType {
        match self {
            AccountType::Asset | AccountType::Expense => EntryType::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                EntryType::Credit
            }
        }
    }

    /// Signed change an entry makes to a balance of this account type
    pub fn signed_effect(&self, entry_type: EntryType, amount: &BigDecimal) -> BigDecimal {
        if self.normal_balance() == entry_type {
            amount.clone()
        } else {
            -amount.clone()
        }
    }

    /// Lowercase name, as used in serialized data and by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AccountType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                LedgerError::Validation(ValidationError::Invalid(format!(
                    "Unknown account type '{}'",
                    s
                )))
            })
    }
}

/// Types of entries in double-entry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry - increases Assets and Expenses, decreases Liabilities, Equity, and Revenue
    Debit,
    /// Credit entry - increases Liabilities, Equity, and Revenue, decreases Assets and Expenses
    Credit,
}

impl EntryType {
    /// The other side of the ledger
    pub fn opposite(&self) -> EntryType {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        }
    }
}

/// Core account structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: String,
    /// Chart-of-accounts code such as "1000", used for report grouping
    pub code: Option<String>,
    /// Human-readable account name
    pub name: String,
    /// Type of account (Asset, Liability, etc.). Fixed once the account exists.
    pub account_type: AccountType,
    /// Free-form operator notes
    pub description: Option<String>,
    /// Running balance under the account type's sign convention
    pub balance: BigDecimal,
    /// When the account was created
    pub created_at: NaiveDateTime,
    /// When the account was last updated
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(
        id: String,
        code: Option<String>,
        name: String,
        account_type: AccountType,
        description: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            code,
            name,
            account_type,
            description,
            balance: BigDecimal::from(0),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the account balance based on an entry
    pub fn apply_entry(&mut self, entry_type: EntryType, amount: &BigDecimal) {
        self.balance += self.account_type.signed_effect(entry_type, amount);
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Code if present, otherwise the empty string (for sorting and display)
    pub fn code_or_empty(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }
}

/// Editable account metadata. Type and balance are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
}

/// A posted journal event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: String,
    /// Date when the transaction occurred
    pub date: NaiveDate,
    /// Description of the transaction
    pub description: String,
    /// Opaque fiscal year reference
    pub fiscal_year: Option<String>,
    /// Opaque identifier of the acting user
    pub created_by: Option<String>,
    /// When the transaction was posted
    pub created_at: NaiveDateTime,
}

/// One line of a posted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub id: String,
    /// Owning transaction
    pub transaction_id: String,
    /// Account being affected
    pub account_id: String,
    /// Type of entry (Debit or Credit)
    pub entry_type: EntryType,
    /// Positive magnitude
    pub amount: BigDecimal,
    /// Optional description for this specific line
    pub memo: Option<String>,
}

impl TransactionEntry {
    pub fn is_debit(&self) -> bool {
        self.entry_type == EntryType::Debit
    }
}

/// A transaction together with the entries it owns; the unit of posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedTransaction {
    pub transaction: Transaction,
    pub entries: Vec<TransactionEntry>,
}

impl PostedTransaction {
    /// Calculate total debits
    pub fn total_debits(&self) -> BigDecimal {
        self.entries
            .iter()
            .filter(|e| e.is_debit())
            .map(|e| &e.amount)
            .sum()
    }

    /// Calculate total credits
    pub fn total_credits(&self) -> BigDecimal {
        self.entries
            .iter()
            .filter(|e| !e.is_debit())
            .map(|e| &e.amount)
            .sum()
    }

    /// Whether any line touches the given account
    pub fn affects_account(&self, account_id: &str) -> bool {
        self.entries.iter().any(|e| e.account_id == account_id)
    }

    /// Inclusive date range check; open ends match everything
    pub fn within(&self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> bool {
        let date = self.transaction.date;
        start_date.is_none_or(|start| date >= start) && end_date.is_none_or(|end| date <= end)
    }
}

/// Reasons a draft or an account fails input validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Missing account: {0}")]
    MissingAccount(String),
    #[error("Entry {index} has a non-positive amount: {amount}")]
    InvalidAmount { index: usize, amount: String },
    #[error("{0}")]
    Invalid(String),
}

/// Errors that can occur in the ledger system
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Unbalanced entry: debits = {debits}, credits = {credits}, imbalance = {imbalance}")]
    Unbalanced {
        debits: BigDecimal,
        credits: BigDecimal,
        imbalance: BigDecimal,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("Posting failed: {0}")]
    Posting(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    /// Shorthand for a free-form validation failure
    pub fn invalid(message: impl Into<String>) -> Self {
        LedgerError::Validation(ValidationError::Invalid(message.into()))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_convention_follows_normal_side() {
        let amount = BigDecimal::from(250);
        assert_eq!(
            AccountType::Asset.signed_effect(EntryType::Debit, &amount),
            BigDecimal::from(250)
        );
        assert_eq!(
            AccountType::Expense.signed_effect(EntryType::Credit, &amount),
            BigDecimal::from(-250)
        );
        assert_eq!(
            AccountType::Revenue.signed_effect(EntryType::Credit, &amount),
            BigDecimal::from(250)
        );
        assert_eq!(
            AccountType::Liability.signed_effect(EntryType::Debit, &amount),
            BigDecimal::from(-250)
        );
    }

    #[test]
    fn opposite_side_reduces_every_balance() {
        let amount = BigDecimal::from(40);
        for account_type in AccountType::ALL {
            let against = account_type.normal_balance().opposite();
            assert_ne!(against, account_type.normal_balance());
            assert_eq!(against.opposite(), account_type.normal_balance());
            assert_eq!(
                account_type.signed_effect(against, &amount),
                BigDecimal::from(-40)
            );
        }
    }

    #[test]
    fn account_type_parses_case_insensitively() {
        assert_eq!("Revenue".parse::<AccountType>().unwrap(), AccountType::Revenue);
        assert_eq!(" asset ".parse::<AccountType>().unwrap(), AccountType::Asset);
        assert!(matches!(
            "income".parse::<AccountType>(),
            Err(LedgerError::Validation(ValidationError::Invalid(_)))
        ));
    }

    #[test]
    fn apply_entry_accumulates_balance() {
        let mut cash = Account::new(
            "a1".to_string(),
            Some("1000".to_string()),
            "Cash".to_string(),
            AccountType::Asset,
            None,
        );
        cash.apply_entry(EntryType::Debit, &BigDecimal::from(1000));
        cash.apply_entry(EntryType::Credit, &BigDecimal::from(300));
        assert_eq!(cash.balance, BigDecimal::from(700));
    }

    #[test]
    fn account_type_serializes_lowercase() {
        let json = serde_json::to_string(&AccountType::Liability).unwrap();
        assert_eq!(json, "\"liability\"");
    }
}
