//! Posting validated transactions to storage

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::ledger::journal::ValidatedTransaction;
use crate::traits::*;
use crate::types::*;

/// Commits validated transactions as single atomic units
pub struct LedgerPoster<S: LedgerStorage> {
    storage: S,
    validator: Box<dyn TransactionValidator>,
}

impl<S: LedgerStorage> LedgerPoster<S> {
    /// Create a new poster
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultTransactionValidator),
        }
    }

    /// Create a new poster with extra transaction rules
    pub fn with_validator(storage: S, validator: Box<dyn TransactionValidator>) -> Self {
        Self { storage, validator }
    }

    /// Post a validated transaction.
    ///
    /// Ids are assigned here; rows and balance changes are handed to storage
    /// in one piece. Any failure leaves storage untouched and is reported as
    /// [`LedgerError::Posting`], except rejections by the extra rules, which
    /// keep their own error.
    pub async fn post(&self, validated: ValidatedTransaction) -> LedgerResult<PostedTransaction> {
        self.validator.validate_transaction(&validated)?;

        let posting = Self::assemble(&validated);
        let transaction_id = posting.transaction.id.clone();

        match self.storage.commit_posting(&posting).await {
            Ok(()) => {
                info!(
                    transaction_id = %transaction_id,
                    entries = posting.entries.len(),
                    total = %validated.total(),
                    "transaction posted"
                );
                Ok(posting)
            }
            Err(err) => {
                warn!(transaction_id = %transaction_id, error = %err, "posting failed");
                Err(match err {
                    LedgerError::Posting(_) => err,
                    other => LedgerError::Posting(other.to_string()),
                })
            }
        }
    }

    fn assemble(validated: &ValidatedTransaction) -> PostedTransaction {
        let transaction_id = uuid::Uuid::new_v4().to_string();
        let entries = validated
            .entries()
            .iter()
            .map(|line| TransactionEntry {
                id: uuid::Uuid::new_v4().to_string(),
                transaction_id: transaction_id.clone(),
                account_id: line.account_id.clone(),
                entry_type: line.entry_type,
                amount: line.amount.clone(),
                memo: line.memo.clone(),
            })
            .collect();

        PostedTransaction {
            transaction: Transaction {
                id: transaction_id,
                date: validated.date(),
                description: validated.description().to_string(),
                fiscal_year: validated.fiscal_year().map(str::to_string),
                created_by: validated.created_by().map(str::to_string),
                created_at: chrono::Utc::now().naive_utc(),
            },
            entries,
        }
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<PostedTransaction> {
        self.storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Get transactions for a specific account
    pub async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        self.storage
            .get_account_transactions(account_id, start_date, end_date)
            .await
    }

    /// Get all transactions within a date range
    pub async fn get_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        self.storage.get_transactions(start_date, end_date).await
    }

    /// Transactions tagged with the given fiscal year reference
    pub async fn get_fiscal_year_transactions(
        &self,
        fiscal_year: &str,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        let mut transactions = self.storage.get_transactions(None, None).await?;
        transactions.retain(|t| t.transaction.fiscal_year.as_deref() == Some(fiscal_year));
        Ok(transactions)
    }
}
