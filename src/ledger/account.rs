//! Account registry: the chart of accounts and its running balances

use bigdecimal::BigDecimal;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::traits::*;
use crate::types::*;

/// Account manager for handling chart of accounts operations
pub struct AccountManager<S: LedgerStorage> {
    pub(crate) storage: S,
    validator: Box<dyn AccountValidator>,
}

impl<S: LedgerStorage> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultAccountValidator),
        }
    }

    /// Create a new account manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn AccountValidator>) -> Self {
        Self { storage, validator }
    }

    /// Register a new account with a generated id
    pub async fn create_account(
        &self,
        name: &str,
        account_type: AccountType,
        description: Option<String>,
    ) -> LedgerResult<Account> {
        self.insert(None, name, account_type, description).await
    }

    /// Register a new account under a chart-of-accounts code
    pub async fn create_account_with_code(
        &self,
        code: &str,
        name: &str,
        account_type: AccountType,
        description: Option<String>,
    ) -> LedgerResult<Account> {
        self.insert(Some(code.trim().to_string()), name, account_type, description)
            .await
    }

    async fn insert(
        &self,
        code: Option<String>,
        name: &str,
        account_type: AccountType,
        description: Option<String>,
    ) -> LedgerResult<Account> {
        let account = Account::new(
            uuid::Uuid::new_v4().to_string(),
            code,
            name.trim().to_string(),
            account_type,
            description,
        );

        self.validator.validate_account(&account)?;
        self.storage.insert_account(&account).await?;

        info!(
            account_id = %account.id,
            code = account.code_or_empty(),
            account_type = %account.account_type,
            "account created"
        );
        Ok(account)
    }

    /// Get an account by ID, if it exists
    pub async fn find_account(&self, account_id: &str) -> LedgerResult<Option<Account>> {
        self.storage.get_account(account_id).await
    }

    /// Get an account by ID, returning an error if not found
    pub async fn get_account(&self, account_id: &str) -> LedgerResult<Account> {
        self.storage
            .get_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }

    /// List accounts ordered by name, optionally restricted to one type
    pub async fn list_accounts(
        &self,
        account_type: Option<AccountType>,
    ) -> LedgerResult<Vec<Account>> {
        let mut accounts = self.storage.list_accounts(account_type).await?;
        accounts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    /// Edit name, code and description. The account type cannot change.
    pub async fn update_account_details(
        &self,
        account_id: &str,
        details: AccountDetails,
    ) -> LedgerResult<Account> {
        let current = self.get_account(account_id).await?;

        let details = AccountDetails {
            name: details.name.trim().to_string(),
            code: details.code.map(|c| c.trim().to_string()),
            description: details.description,
        };
        let candidate = Account {
            name: details.name.clone(),
            code: details.code.clone(),
            description: details.description.clone(),
            ..current
        };
        self.validator.validate_account(&candidate)?;

        self.storage
            .update_account_details(account_id, &details)
            .await
    }

    /// Delete an account that no transaction entry references
    pub async fn delete_account(&self, account_id: &str) -> LedgerResult<()> {
        match self.storage.delete_account(account_id).await {
            Ok(()) => {
                info!(account_id, "account deleted");
                Ok(())
            }
            Err(err) => {
                warn!(account_id, error = %err, "account deletion refused");
                Err(err)
            }
        }
    }

    /// How many posted entries reference the account
    pub async fn entry_count(&self, account_id: &str) -> LedgerResult<usize> {
        self.get_account(account_id).await?;
        self.storage.count_account_entries(account_id).await
    }

    /// Current stored balance
    pub async fn get_balance(&self, account_id: &str) -> LedgerResult<BigDecimal> {
        Ok(self.get_account(account_id).await?.balance)
    }

    /// Balance recomputed from entries dated on or before `as_of_date`
    pub async fn get_balance_as_of(
        &self,
        account_id: &str,
        as_of_date: chrono::NaiveDate,
    ) -> LedgerResult<BigDecimal> {
        let account = self.get_account(account_id).await?;
        let transactions = self
            .storage
            .get_account_transactions(account_id, None, Some(as_of_date))
            .await?;

        let mut balance = BigDecimal::from(0);
        for entry in transactions
            .iter()
            .flat_map(|t| &t.entries)
            .filter(|e| e.account_id == account_id)
        {
            balance += account.account_type.signed_effect(entry.entry_type, &entry.amount);
        }
        Ok(balance)
    }
}

/// Utility functions for working with accounts
pub mod utils {
    use super::*;

    const STANDARD_CHART: &[(&str, &str, &str, AccountType)] = &[
        ("cash", "1000", "Cash", AccountType::Asset),
        ("accounts_receivable", "1200", "Accounts Receivable", AccountType::Asset),
        ("inventory", "1300", "Inventory", AccountType::Asset),
        ("equipment", "1600", "Equipment", AccountType::Asset),
        ("accounts_payable", "2000", "Accounts Payable", AccountType::Liability),
        ("salary_withholding", "2200", "Salary Withholding Payable", AccountType::Liability),
        ("loans_payable", "2700", "Long-term Loans", AccountType::Liability),
        ("owners_capital", "3000", "Owner's Capital", AccountType::Equity),
        ("retained_earnings", "3200", "Retained Earnings", AccountType::Equity),
        ("sales_revenue", "4000", "Sales Revenue", AccountType::Revenue),
        ("service_revenue", "4100", "Service Revenue", AccountType::Revenue),
        ("cost_of_goods_sold", "5000", "Cost of Goods Sold", AccountType::Expense),
        ("rent_expense", "6000", "Rent Expense", AccountType::Expense),
        ("utilities_expense", "6100", "Utilities Expense", AccountType::Expense),
        ("salaries_expense", "6200", "Salaries Expense", AccountType::Expense),
    ];

    /// Create a standard chart of accounts for a small business, keyed by a
    /// short slug such as `"cash"` or `"sales_revenue"`.
    pub async fn create_standard_chart<S: LedgerStorage>(
        account_manager: &AccountManager<S>,
    ) -> LedgerResult<HashMap<String, Account>> {
        let mut accounts = HashMap::with_capacity(STANDARD_CHART.len());
        for (slug, code, name, account_type) in STANDARD_CHART {
            let account = account_manager
                .create_account_with_code(code, name, *account_type, None)
                .await?;
            accounts.insert((*slug).to_string(), account);
        }
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::journal::patterns;
    use crate::ledger::LedgerPoster;
    use crate::utils::MemoryStorage;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn names_are_trimmed_and_blank_names_rejected() {
        let manager = AccountManager::new(MemoryStorage::new());

        let account = manager
            .create_account("  Petty Cash ", AccountType::Asset, None)
            .await
            .unwrap();
        assert_eq!(account.name, "Petty Cash");
        assert_eq!(account.balance, BigDecimal::from(0));

        let err = manager
            .create_account("   ", AccountType::Asset, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Validation(ValidationError::MissingField("name"))
        );
    }

    #[tokio::test]
    async fn missing_account_is_reported() {
        let manager = AccountManager::new(MemoryStorage::new());
        assert!(manager.find_account("nope").await.unwrap().is_none());
        assert!(matches!(
            manager.get_account("nope").await,
            Err(LedgerError::AccountNotFound(_))
        ));
        assert!(matches!(
            manager.entry_count("nope").await,
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_type_and_balance() {
        let storage = MemoryStorage::new();
        let manager = AccountManager::new(storage.clone());
        let poster = LedgerPoster::new(storage);

        let cash = manager
            .create_account_with_code("1000", "Cash", AccountType::Asset, None)
            .await
            .unwrap();
        let sales = manager
            .create_account_with_code("4000", "Sales", AccountType::Revenue, None)
            .await
            .unwrap();
        let sale = patterns::cash_sale(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            "Sale",
            &cash.id,
            &sales.id,
            BigDecimal::from(250),
        )
        .unwrap();
        poster.post(sale).await.unwrap();

        let updated = manager
            .update_account_details(
                &cash.id,
                AccountDetails {
                    name: " Cash on Hand ".to_string(),
                    code: Some(" 1001 ".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Cash on Hand");
        assert_eq!(updated.code.as_deref(), Some("1001"));
        assert_eq!(updated.account_type, AccountType::Asset);
        assert_eq!(updated.balance, BigDecimal::from(250));
    }

    #[tokio::test]
    async fn balance_as_of_ignores_later_entries() {
        let storage = MemoryStorage::new();
        let manager = AccountManager::new(storage.clone());
        let poster = LedgerPoster::new(storage);
        let cash = manager
            .create_account("Cash", AccountType::Asset, None)
            .await
            .unwrap();
        let rent = manager
            .create_account("Rent", AccountType::Expense, None)
            .await
            .unwrap();
        let capital = manager
            .create_account("Capital", AccountType::Equity, None)
            .await
            .unwrap();

        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        poster
            .post(
                patterns::owner_investment(day(1), "Seed", &cash.id, &capital.id, BigDecimal::from(900))
                    .unwrap(),
            )
            .await
            .unwrap();
        poster
            .post(
                patterns::expense_payment(day(20), "Rent", &rent.id, &cash.id, BigDecimal::from(300))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            manager.get_balance_as_of(&cash.id, day(10)).await.unwrap(),
            BigDecimal::from(900)
        );
        assert_eq!(
            manager.get_balance_as_of(&cash.id, day(31)).await.unwrap(),
            BigDecimal::from(600)
        );
        assert_eq!(manager.get_balance(&cash.id).await.unwrap(), BigDecimal::from(600));
        assert_eq!(manager.entry_count(&cash.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn standard_chart_has_unique_codes() {
        let manager = AccountManager::new(MemoryStorage::new());
        let chart = utils::create_standard_chart(&manager).await.unwrap();

        assert_eq!(chart.len(), 15);
        assert_eq!(chart["cash"].code.as_deref(), Some("1000"));
        assert_eq!(chart["loans_payable"].account_type, AccountType::Liability);

        // seeding twice collides on codes
        assert!(matches!(
            utils::create_standard_chart(&manager).await,
            Err(LedgerError::Conflict(_))
        ));
    }
}
