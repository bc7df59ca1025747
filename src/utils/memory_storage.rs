//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// Point inside a commit where an injected fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// After the transaction row is staged, before any entry row
    AfterTransactionRow,
    /// After this many entry rows are staged
    AfterEntryRows(usize),
    /// After the first balance change is staged
    DuringBalanceUpdate,
}

#[derive(Debug, Default)]
struct Journal {
    accounts: HashMap<String, Account>,
    transactions: HashMap<String, Transaction>,
    /// transaction id -> owned entries
    entries: HashMap<String, Vec<TransactionEntry>>,
    /// account id -> number of entries referencing it
    references: HashMap<String, usize>,
    pending_fault: Option<FaultPoint>,
}

impl Journal {
    fn posted(&self, transaction: &Transaction) -> PostedTransaction {
        PostedTransaction {
            transaction: transaction.clone(),
            entries: self
                .entries
                .get(&transaction.id)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn code_taken(&self, code: &str, except_id: Option<&str>) -> bool {
        self.accounts
            .values()
            .any(|a| a.code.as_deref() == Some(code) && Some(a.id.as_str()) != except_id)
    }

    fn sorted_postings<F>(&self, keep: F) -> Vec<PostedTransaction>
    where
        F: Fn(&PostedTransaction) -> bool,
    {
        let mut postings: Vec<PostedTransaction> = self
            .transactions
            .values()
            .map(|t| self.posted(t))
            .filter(|p| keep(p))
            .collect();
        postings.sort_by(|a, b| {
            a.transaction
                .date
                .cmp(&b.transaction.date)
                .then_with(|| a.transaction.created_at.cmp(&b.transaction.created_at))
                .then_with(|| a.transaction.id.cmp(&b.transaction.id))
        });
        postings
    }
}

/// Changes of one commit, held aside until every step has succeeded
struct StagedPosting {
    transaction: Transaction,
    entries: Vec<TransactionEntry>,
    accounts: HashMap<String, Account>,
}

fn injected(point: FaultPoint) -> LedgerError {
    LedgerError::Posting(format!("injected storage fault at {:?}", point))
}

/// In-memory storage implementation for testing and development.
///
/// Clones share the same underlying data. Every commit runs under one write
/// lock, so balance updates from concurrent postings cannot interleave.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<Journal>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a commit fail at `point`. The fault stays armed until a commit
    /// reaches it, then fires once; a commit that fails earlier for another
    /// reason leaves it armed. A commit with fewer entries than an
    /// `AfterEntryRows` count is refused and disarms the fault.
    pub fn inject_fault(&self, point: FaultPoint) -> LedgerResult<()> {
        self.write()?.pending_fault = Some(point);
        Ok(())
    }

    /// Number of stored transaction rows
    pub fn transaction_count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.transactions.len())
    }

    /// Number of stored entry rows
    pub fn entry_count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.entries.values().map(Vec::len).sum())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        *self.write()? = Journal::default();
        Ok(())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Journal>> {
        self.state
            .read()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Journal>> {
        self.state
            .write()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".to_string()))
    }

    fn stage(
        journal: &Journal,
        posting: &PostedTransaction,
        fault: &mut Option<FaultPoint>,
    ) -> LedgerResult<StagedPosting> {
        let mut fire = |point: FaultPoint| -> LedgerResult<()> {
            if *fault == Some(point) {
                *fault = None;
                Err(injected(point))
            } else {
                Ok(())
            }
        };

        let transaction = &posting.transaction;
        if journal.transactions.contains_key(&transaction.id) {
            return Err(LedgerError::Posting(format!(
                "duplicate transaction id {}",
                transaction.id
            )));
        }
        let mut staged = StagedPosting {
            transaction: transaction.clone(),
            entries: Vec::with_capacity(posting.entries.len()),
            accounts: HashMap::new(),
        };
        fire(FaultPoint::AfterTransactionRow)?;

        for entry in &posting.entries {
            if entry.transaction_id != transaction.id {
                return Err(LedgerError::Posting(format!(
                    "entry {} belongs to transaction {}, not {}",
                    entry.id, entry.transaction_id, transaction.id
                )));
            }
            if !journal.accounts.contains_key(&entry.account_id) {
                return Err(LedgerError::Posting(format!(
                    "account {} does not exist",
                    entry.account_id
                )));
            }
            staged.entries.push(entry.clone());
            fire(FaultPoint::AfterEntryRows(staged.entries.len()))?;
        }

        for entry in &posting.entries {
            let account = match staged.accounts.entry(entry.account_id.clone()) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    let original = journal
                        .accounts
                        .get(&entry.account_id)
                        .cloned()
                        .ok_or_else(|| LedgerError::AccountNotFound(entry.account_id.clone()))?;
                    slot.insert(original)
                }
            };
            account.apply_entry(entry.entry_type, &entry.amount);
            fire(FaultPoint::DuringBalanceUpdate)?;
        }

        Ok(staged)
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn insert_account(&self, account: &Account) -> LedgerResult<()> {
        let mut journal = self.write()?;
        if journal.accounts.contains_key(&account.id) {
            return Err(LedgerError::Conflict(format!(
                "account id '{}' already exists",
                account.id
            )));
        }
        if let Some(code) = account.code.as_deref() {
            if journal.code_taken(code, None) {
                return Err(LedgerError::Conflict(format!(
                    "account code '{}' already exists",
                    code
                )));
            }
        }
        journal.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        Ok(self.read()?.accounts.get(account_id).cloned())
    }

    async fn list_accounts(&self, account_type: Option<AccountType>) -> LedgerResult<Vec<Account>> {
        let journal = self.read()?;
        let filtered: Vec<Account> = journal
            .accounts
            .values()
            .filter(|account| account_type.is_none_or(|t| account.account_type == t))
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn update_account_details(
        &self,
        account_id: &str,
        details: &AccountDetails,
    ) -> LedgerResult<Account> {
        let mut journal = self.write()?;
        if let Some(code) = details.code.as_deref() {
            if journal.code_taken(code, Some(account_id)) {
                return Err(LedgerError::Conflict(format!(
                    "account code '{}' already exists",
                    code
                )));
            }
        }
        let account = journal
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;
        account.name = details.name.clone();
        account.code = details.code.clone();
        account.description = details.description.clone();
        account.updated_at = chrono::Utc::now().naive_utc();
        Ok(account.clone())
    }

    async fn delete_account(&self, account_id: &str) -> LedgerResult<()> {
        let mut journal = self.write()?;
        if !journal.accounts.contains_key(account_id) {
            return Err(LedgerError::AccountNotFound(account_id.to_string()));
        }
        let references = journal.references.get(account_id).copied().unwrap_or(0);
        if references > 0 {
            return Err(LedgerError::Conflict(format!(
                "account {} is referenced by {} transaction entries",
                account_id, references
            )));
        }
        journal.accounts.remove(account_id);
        Ok(())
    }

    async fn count_account_entries(&self, account_id: &str) -> LedgerResult<usize> {
        Ok(self
            .read()?
            .references
            .get(account_id)
            .copied()
            .unwrap_or(0))
    }

    async fn commit_posting(&self, posting: &PostedTransaction) -> LedgerResult<()> {
        let mut journal = self.write()?;
        if let Some(FaultPoint::AfterEntryRows(rows)) = journal.pending_fault {
            if rows == 0 || rows > posting.entries.len() {
                journal.pending_fault = None;
                return Err(LedgerError::Posting(format!(
                    "injected fault after {} entry rows cannot fire for a posting with {} entries",
                    rows,
                    posting.entries.len()
                )));
            }
        }

        let mut fault = journal.pending_fault;
        let staged = Self::stage(&journal, posting, &mut fault);
        journal.pending_fault = fault;
        let staged = staged?;

        for entry in &staged.entries {
            *journal
                .references
                .entry(entry.account_id.clone())
                .or_insert(0) += 1;
        }
        for (id, account) in staged.accounts {
            journal.accounts.insert(id, account);
        }
        let transaction_id = staged.transaction.id.clone();
        journal.entries.insert(transaction_id.clone(), staged.entries);
        journal.transactions.insert(transaction_id, staged.transaction);
        Ok(())
    }

    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> LedgerResult<Option<PostedTransaction>> {
        let journal = self.read()?;
        Ok(journal
            .transactions
            .get(transaction_id)
            .map(|t| journal.posted(t)))
    }

    async fn get_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        Ok(self
            .read()?
            .sorted_postings(|p| p.within(start_date, end_date)))
    }

    async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        Ok(self
            .read()?
            .sorted_postings(|p| p.affects_account(account_id) && p.within(start_date, end_date)))
    }
}
