//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::ledger::journal::ValidatedTransaction;
use crate::types::*;

/// Storage abstraction for the ledger system
///
/// The engine does no locking of its own. Implementations provide the
/// atomicity guarantees below (a SQL backend would use a database
/// transaction and `UPDATE ... SET balance = balance + $delta`).
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Insert a new account. Fails with `Conflict` if the id, or the code
    /// when present, is already taken.
    async fn insert_account(&self, account: &Account) -> LedgerResult<()>;

    /// Get an account by ID
    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>>;

    /// List all accounts, optionally filtered by type
    async fn list_accounts(&self, account_type: Option<AccountType>) -> LedgerResult<Vec<Account>>;

    /// Overwrite name, code and description. Never touches type or balance.
    async fn update_account_details(
        &self,
        account_id: &str,
        details: &AccountDetails,
    ) -> LedgerResult<Account>;

    /// Remove an account. The reference check and the removal must be one
    /// atomic step: `Conflict` if any entry references the account.
    async fn delete_account(&self, account_id: &str) -> LedgerResult<()>;

    /// Number of transaction entries referencing the account
    async fn count_account_entries(&self, account_id: &str) -> LedgerResult<usize>;

    /// Persist a transaction, all of its entries and the resulting balance
    /// changes as a single all-or-nothing unit.
    async fn commit_posting(&self, posting: &PostedTransaction) -> LedgerResult<()>;

    /// Get a transaction by ID
    async fn get_transaction(&self, transaction_id: &str)
        -> LedgerResult<Option<PostedTransaction>>;

    /// List all transactions within an inclusive date range
    async fn get_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>>;

    /// List transactions touching a specific account
    async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>>;
}

/// Trait for implementing custom account validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate an account before it is inserted or its details change
    fn validate_account(&self, account: &Account) -> LedgerResult<()>;
}

/// Extra transaction rules, applied after the built-in double-entry checks
pub trait TransactionValidator: Send + Sync {
    fn validate_transaction(&self, transaction: &ValidatedTransaction) -> LedgerResult<()>;
}

/// Default account validator with basic rules
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        if account.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name").into());
        }
        if account.code.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(LedgerError::invalid("Account code cannot be blank"));
        }
        Ok(())
    }
}

/// Default transaction validator: the built-in rules are enough
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, _transaction: &ValidatedTransaction) -> LedgerResult<()> {
        Ok(())
    }
}
