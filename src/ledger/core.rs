//! Main ledger orchestrator that coordinates accounts, postings and reports

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::config::{ChartConfig, LedgerConfig};
use crate::ledger::journal::{DraftTransaction, ValidatedTransaction};
use crate::ledger::{AccountManager, LedgerPoster};
use crate::reports::*;
use crate::traits::*;
use crate::types::*;
use crate::utils::{EnhancedAccountValidator, LimitsTransactionValidator};

/// Main ledger system that orchestrates all accounting operations.
///
/// Owns one storage handle (cloned into each component) and is meant to be
/// built once at the application's composition root. Every method takes
/// `&self`; wrap the ledger in an `Arc` to share it between tasks.
pub struct Ledger<S: LedgerStorage> {
    storage: S,
    account_manager: AccountManager<S>,
    poster: LedgerPoster<S>,
    reports: ReportAggregator<S>,
}

impl<S: LedgerStorage + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend and default configuration
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, LedgerConfig::default())
    }

    /// Create a new ledger from `config`: the chart ranges drive the reports
    /// and the limits are enforced on every account and transaction.
    pub fn with_config(storage: S, config: LedgerConfig) -> Self {
        let LedgerConfig { chart, limits } = config;
        Self::with_validators(
            storage,
            chart,
            Box::new(EnhancedAccountValidator::new(limits.clone())),
            Box::new(LimitsTransactionValidator::new(limits)),
        )
    }

    /// Create a new ledger with custom validators. Limits are whatever the
    /// supplied validators enforce.
    pub fn with_validators(
        storage: S,
        chart: ChartConfig,
        account_validator: Box<dyn AccountValidator>,
        transaction_validator: Box<dyn TransactionValidator>,
    ) -> Self {
        Self {
            account_manager: AccountManager::with_validator(storage.clone(), account_validator),
            poster: LedgerPoster::with_validator(storage.clone(), transaction_validator),
            reports: ReportAggregator::new(storage.clone(), chart),
            storage,
        }
    }

    /// The storage handle shared by all components
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The account registry
    pub fn accounts(&self) -> &AccountManager<S> {
        &self.account_manager
    }

    /// The posting component
    pub fn poster(&self) -> &LedgerPoster<S> {
        &self.poster
    }

    /// The report aggregator
    pub fn reports(&self) -> &ReportAggregator<S> {
        &self.reports
    }

    // Account operations

    /// Create a new account
    pub async fn create_account(
        &self,
        name: &str,
        account_type: AccountType,
        description: Option<String>,
    ) -> LedgerResult<Account> {
        self.account_manager
            .create_account(name, account_type, description)
            .await
    }

    /// Create a new account with a chart-of-accounts code
    pub async fn create_account_with_code(
        &self,
        code: &str,
        name: &str,
        account_type: AccountType,
        description: Option<String>,
    ) -> LedgerResult<Account> {
        self.account_manager
            .create_account_with_code(code, name, account_type, description)
            .await
    }

    /// Get an account by ID
    pub async fn get_account(&self, account_id: &str) -> LedgerResult<Account> {
        self.account_manager.get_account(account_id).await
    }

    /// List accounts ordered by name, optionally of one type
    pub async fn list_accounts(
        &self,
        account_type: Option<AccountType>,
    ) -> LedgerResult<Vec<Account>> {
        self.account_manager.list_accounts(account_type).await
    }

    /// Edit an account's name, code and description
    pub async fn update_account_details(
        &self,
        account_id: &str,
        details: AccountDetails,
    ) -> LedgerResult<Account> {
        self.account_manager
            .update_account_details(account_id, details)
            .await
    }

    /// Delete an account
    pub async fn delete_account(&self, account_id: &str) -> LedgerResult<()> {
        self.account_manager.delete_account(account_id).await
    }

    /// Get current account balance
    pub async fn get_account_balance(&self, account_id: &str) -> LedgerResult<BigDecimal> {
        self.account_manager.get_balance(account_id).await
    }

    /// Get account balance as of a specific date
    pub async fn get_account_balance_as_of(
        &self,
        account_id: &str,
        as_of_date: NaiveDate,
    ) -> LedgerResult<BigDecimal> {
        self.account_manager
            .get_balance_as_of(account_id, as_of_date)
            .await
    }

    /// Setup a standard chart of accounts for small business
    pub async fn setup_standard_chart_of_accounts(&self) -> LedgerResult<HashMap<String, Account>> {
        crate::ledger::account::utils::create_standard_chart(&self.account_manager).await
    }

    // Transaction operations

    /// Post an already validated transaction
    pub async fn post(&self, validated: ValidatedTransaction) -> LedgerResult<PostedTransaction> {
        self.poster.post(validated).await
    }

    /// Validate a draft and post it
    pub async fn record(&self, draft: &DraftTransaction) -> LedgerResult<PostedTransaction> {
        let validated = draft.validate()?;
        self.poster.post(validated).await
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<PostedTransaction> {
        self.poster.get_transaction(transaction_id).await
    }

    /// Get transactions for a specific account
    pub async fn get_account_transactions(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        self.poster
            .get_account_transactions(account_id, start_date, end_date)
            .await
    }

    /// Get all transactions within a date range
    pub async fn get_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        self.poster.get_transactions(start_date, end_date).await
    }

    /// Get transactions tagged with a fiscal year
    pub async fn get_fiscal_year_transactions(
        &self,
        fiscal_year: &str,
    ) -> LedgerResult<Vec<PostedTransaction>> {
        self.poster.get_fiscal_year_transactions(fiscal_year).await
    }

    // Reporting operations

    /// Trial balance over current balances
    pub async fn trial_balance(&self) -> LedgerResult<TrialBalance> {
        self.reports.trial_balance().await
    }

    /// Trial balance as of a date
    pub async fn trial_balance_as_of(&self, as_of_date: NaiveDate) -> LedgerResult<TrialBalance> {
        self.reports.trial_balance_as_of(as_of_date).await
    }

    /// Balance sheet over current balances
    pub async fn balance_sheet(&self) -> LedgerResult<BalanceSheet> {
        self.reports.balance_sheet().await
    }

    /// Balance sheet as of a date
    pub async fn balance_sheet_as_of(&self, as_of_date: NaiveDate) -> LedgerResult<BalanceSheet> {
        self.reports.balance_sheet_as_of(as_of_date).await
    }

    /// Profit and loss over the whole ledger
    pub async fn profit_and_loss(&self) -> LedgerResult<ProfitAndLoss> {
        self.reports.profit_and_loss().await
    }

    /// Profit and loss for a date range, inclusive
    pub async fn profit_and_loss_for_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<ProfitAndLoss> {
        self.reports
            .profit_and_loss_for_period(start_date, end_date)
            .await
    }

    /// Cash flow statement for a date range, inclusive
    pub async fn cash_flow(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<CashFlowStatement> {
        self.reports.cash_flow(start_date, end_date).await
    }

    /// Validate the integrity of the ledger
    pub async fn verify_integrity(&self) -> LedgerResult<IntegrityReport> {
        self.reports.verify_integrity().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::journal::patterns;
    use crate::utils::memory_storage::MemoryStorage;

    #[tokio::test]
    async fn test_ledger_basic_operations() {
        let ledger = Ledger::new(MemoryStorage::new());

        let cash_account = ledger
            .create_account_with_code("1000", "Cash", AccountType::Asset, None)
            .await
            .unwrap();
        let revenue_account = ledger
            .create_account_with_code("4000", "Sales Revenue", AccountType::Revenue, None)
            .await
            .unwrap();

        let sale = patterns::cash_sale(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Sale of goods",
            &cash_account.id,
            &revenue_account.id,
            BigDecimal::from(1000),
        )
        .unwrap();
        ledger.post(sale).await.unwrap();

        assert_eq!(
            ledger.get_account_balance(&cash_account.id).await.unwrap(),
            BigDecimal::from(1000)
        );
        assert_eq!(
            ledger.get_account_balance(&revenue_account.id).await.unwrap(),
            BigDecimal::from(1000)
        );

        let balance_sheet = ledger.balance_sheet().await.unwrap();
        assert_eq!(balance_sheet.total_assets, BigDecimal::from(1000));

        let pnl = ledger.profit_and_loss().await.unwrap();
        assert_eq!(pnl.net_income, BigDecimal::from(1000));
    }

    #[tokio::test]
    async fn record_rejects_invalid_draft_without_touching_storage() {
        let ledger = Ledger::new(MemoryStorage::new());
        let draft = DraftTransaction::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Empty");

        assert!(matches!(
            ledger.record(&draft).await,
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.storage().transaction_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn configured_name_limit_applies_to_new_accounts() {
        let config =
            LedgerConfig::from_toml_str("[limits]\nmax_account_name_length = 4\n").unwrap();
        let ledger = Ledger::with_config(MemoryStorage::new(), config);

        assert!(matches!(
            ledger
                .create_account("Petty Cash", AccountType::Asset, None)
                .await,
            Err(LedgerError::Validation(ValidationError::Invalid(_)))
        ));
        assert!(ledger
            .list_accounts(None)
            .await
            .unwrap()
            .is_empty());
        assert!(ledger
            .create_account("Till", AccountType::Asset, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn default_ledger_rejects_malformed_codes() {
        let ledger = Ledger::new(MemoryStorage::new());
        assert!(matches!(
            ledger
                .create_account_with_code("10 00", "Cash", AccountType::Asset, None)
                .await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn strict_validator_runs_before_commit() {
        let ledger = Ledger::with_validators(
            MemoryStorage::new(),
            ChartConfig::default(),
            Box::new(crate::utils::EnhancedAccountValidator::default()),
            Box::new(crate::utils::StrictTransactionValidator::default()),
        );
        let cash = ledger
            .create_account_with_code("1000", "Cash", AccountType::Asset, None)
            .await
            .unwrap();
        let sales = ledger
            .create_account_with_code("4000", "Sales", AccountType::Revenue, None)
            .await
            .unwrap();

        let split = crate::ledger::journal::DraftBuilder::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Split sale",
        )
        .debit(&cash.id, BigDecimal::from(40), None)
        .debit(&cash.id, BigDecimal::from(60), None)
        .credit(&sales.id, BigDecimal::from(100), None)
        .build()
        .unwrap();

        assert!(matches!(
            ledger.post(split).await,
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.storage().entry_count().unwrap(), 0);
    }
}
