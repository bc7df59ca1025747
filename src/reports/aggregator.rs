//! Financial statements derived from the account registry

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::config::{AssetClass, ChartConfig, LiabilityClass};
use crate::reports::statements::*;
use crate::traits::LedgerStorage;
use crate::types::*;

/// Read-only projections over the ledger. Nothing is cached: every call
/// reads storage afresh, so a report reflects whatever was committed when
/// it ran.
pub struct ReportAggregator<S: LedgerStorage> {
    storage: S,
    chart: ChartConfig,
}

/// Accounts paired with the balance a report should use for them
type Snapshot = Vec<(Account, BigDecimal)>;

impl<S: LedgerStorage> ReportAggregator<S> {
    pub fn new(storage: S, chart: ChartConfig) -> Self {
        Self { storage, chart }
    }

    /// Code ranges used to group accounts
    pub fn chart(&self) -> &ChartConfig {
        &self.chart
    }

    /// Stored balances, or balances rebuilt from entries dated up to `as_of`
    async fn snapshot(&self, as_of: Option<NaiveDate>) -> LedgerResult<Snapshot> {
        let accounts = self.storage.list_accounts(None).await?;
        let Some(date) = as_of else {
            return Ok(accounts
                .into_iter()
                .map(|a| {
                    let balance = a.balance.clone();
                    (a, balance)
                })
                .collect());
        };

        let transactions = self.storage.get_transactions(None, Some(date)).await?;
        let mut balances = replay(&accounts, &transactions);
        Ok(accounts
            .into_iter()
            .map(|a| {
                let balance = balances.remove(&a.id).unwrap_or_else(|| BigDecimal::from(0));
                (a, balance)
            })
            .collect())
    }

    /// Trial balance over current stored balances
    pub async fn trial_balance(&self) -> LedgerResult<TrialBalance> {
        let snapshot = self.snapshot(None).await?;
        Ok(build_trial_balance(None, snapshot))
    }

    /// Trial balance rebuilt from entries dated on or before `as_of_date`
    pub async fn trial_balance_as_of(&self, as_of_date: NaiveDate) -> LedgerResult<TrialBalance> {
        let snapshot = self.snapshot(Some(as_of_date)).await?;
        Ok(build_trial_balance(Some(as_of_date), snapshot))
    }

    /// Balance sheet over current stored balances
    pub async fn balance_sheet(&self) -> LedgerResult<BalanceSheet> {
        let snapshot = self.snapshot(None).await?;
        Ok(self.build_balance_sheet(None, snapshot))
    }

    /// Balance sheet rebuilt from entries dated on or before `as_of_date`
    pub async fn balance_sheet_as_of(&self, as_of_date: NaiveDate) -> LedgerResult<BalanceSheet> {
        let snapshot = self.snapshot(Some(as_of_date)).await?;
        Ok(self.build_balance_sheet(Some(as_of_date), snapshot))
    }

    fn build_balance_sheet(
        &self,
        as_of_date: Option<NaiveDate>,
        snapshot: Snapshot,
    ) -> BalanceSheet {
        let mut asset_groups: HashMap<AssetClass, Vec<ReportLine>> = HashMap::new();
        let mut liability_groups: HashMap<LiabilityClass, Vec<ReportLine>> = HashMap::new();
        let mut equity = Vec::new();

        for (account, balance) in sorted(snapshot) {
            match account.account_type {
                AccountType::Asset => asset_groups
                    .entry(self.chart.asset_class(account.code.as_deref()))
                    .or_default()
                    .push(line(account, balance)),
                AccountType::Liability => liability_groups
                    .entry(self.chart.liability_class(account.code.as_deref()))
                    .or_default()
                    .push(line(account, balance)),
                AccountType::Equity => equity.push(line(account, balance)),
                AccountType::Revenue | AccountType::Expense => {}
            }
        }

        let assets: Vec<ReportSection> = [AssetClass::Current, AssetClass::Fixed, AssetClass::Other]
            .into_iter()
            .filter_map(|class| {
                asset_groups
                    .remove(&class)
                    .map(|items| ReportSection::new(class.label(), items))
            })
            .collect();

        let mut liabilities_and_equity: Vec<ReportSection> =
            [LiabilityClass::Current, LiabilityClass::LongTerm]
                .into_iter()
                .filter_map(|class| {
                    liability_groups
                        .remove(&class)
                        .map(|items| ReportSection::new(class.label(), items))
                })
                .collect();
        if !equity.is_empty() {
            liabilities_and_equity.push(ReportSection::new("Equity", equity));
        }

        let total_assets: BigDecimal = assets.iter().map(|s| &s.total).sum();
        let total_liabilities_and_equity: BigDecimal =
            liabilities_and_equity.iter().map(|s| &s.total).sum();

        debug!(sections = assets.len() + liabilities_and_equity.len(), "balance sheet built");

        BalanceSheet {
            as_of_date,
            assets,
            liabilities_and_equity,
            total_assets,
            total_liabilities_and_equity,
        }
    }

    /// Profit and loss over current stored balances
    pub async fn profit_and_loss(&self) -> LedgerResult<ProfitAndLoss> {
        let snapshot = self.snapshot(None).await?;
        Ok(build_profit_and_loss(None, None, snapshot))
    }

    /// Profit and loss from entries dated within `start_date..=end_date`
    pub async fn profit_and_loss_for_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<ProfitAndLoss> {
        check_period(start_date, end_date)?;

        let accounts = self.storage.list_accounts(None).await?;
        let transactions = self
            .storage
            .get_transactions(Some(start_date), Some(end_date))
            .await?;
        let mut movements = replay(&accounts, &transactions);
        let snapshot = accounts
            .into_iter()
            .map(|a| {
                let amount = movements.remove(&a.id).unwrap_or_else(|| BigDecimal::from(0));
                (a, amount)
            })
            .collect();

        Ok(build_profit_and_loss(
            Some(start_date),
            Some(end_date),
            snapshot,
        ))
    }

    /// Cash flow statement for `start_date..=end_date`.
    ///
    /// Each transaction that moves a configured cash account is classified by
    /// the other accounts it touches: non-current assets make it investing,
    /// equity or long-term liabilities make it financing, anything else is
    /// operating.
    pub async fn cash_flow(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<CashFlowStatement> {
        check_period(start_date, end_date)?;

        let accounts: HashMap<String, Account> = self
            .storage
            .list_accounts(None)
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();
        let cash_ids: HashSet<&str> = accounts
            .values()
            .filter(|a| {
                a.account_type == AccountType::Asset && self.chart.is_cash(a.code.as_deref())
            })
            .map(|a| a.id.as_str())
            .collect();

        let transactions = self
            .storage
            .get_transactions(Some(start_date), Some(end_date))
            .await?;

        let mut operating_activities = Vec::new();
        let mut investing_activities = Vec::new();
        let mut financing_activities = Vec::new();
        let zero = BigDecimal::from(0);

        for posted in transactions {
            let mut amount = BigDecimal::from(0);
            for entry in posted
                .entries
                .iter()
                .filter(|e| cash_ids.contains(e.account_id.as_str()))
            {
                if entry.is_debit() {
                    amount += &entry.amount;
                } else {
                    amount -= &entry.amount;
                }
            }
            if amount == zero {
                continue;
            }

            let counterparts: Vec<&Account> = posted
                .entries
                .iter()
                .filter(|e| !cash_ids.contains(e.account_id.as_str()))
                .filter_map(|e| accounts.get(&e.account_id))
                .collect();

            let item = CashFlowItem {
                transaction_id: posted.transaction.id,
                date: posted.transaction.date,
                description: posted.transaction.description,
                amount,
            };

            let investing = counterparts.iter().any(|a| {
                a.account_type == AccountType::Asset
                    && self.chart.asset_class(a.code.as_deref()) != AssetClass::Current
            });
            let financing = counterparts.iter().any(|a| match a.account_type {
                AccountType::Equity => true,
                AccountType::Liability => {
                    self.chart.liability_class(a.code.as_deref()) == LiabilityClass::LongTerm
                }
                _ => false,
            });

            if investing {
                investing_activities.push(item);
            } else if financing {
                financing_activities.push(item);
            } else {
                operating_activities.push(item);
            }
        }

        let net_operating_cash_flow: BigDecimal =
            operating_activities.iter().map(|i| &i.amount).sum();
        let net_investing_cash_flow: BigDecimal =
            investing_activities.iter().map(|i| &i.amount).sum();
        let net_financing_cash_flow: BigDecimal =
            financing_activities.iter().map(|i| &i.amount).sum();
        let net_cash_flow =
            &net_operating_cash_flow + &net_investing_cash_flow + &net_financing_cash_flow;

        Ok(CashFlowStatement {
            start_date,
            end_date,
            operating_activities,
            investing_activities,
            financing_activities,
            net_operating_cash_flow,
            net_investing_cash_flow,
            net_financing_cash_flow,
            net_cash_flow,
        })
    }

    /// Rebuild every balance from the full entry history and compare it with
    /// the stored running balance; also confirm the trial balance totals agree.
    pub async fn verify_integrity(&self) -> LedgerResult<IntegrityReport> {
        let accounts = self.storage.list_accounts(None).await?;
        let transactions = self.storage.get_transactions(None, None).await?;
        let recomputed = replay(&accounts, &transactions);
        let zero = BigDecimal::from(0);

        let mut issues = Vec::new();
        let mut drifted_accounts = Vec::new();
        for account in &accounts {
            let expected = recomputed.get(&account.id).unwrap_or(&zero);
            if *expected != account.balance {
                issues.push(format!(
                    "Account '{}' stores {} but its entries sum to {}",
                    account.name, account.balance, expected
                ));
                drifted_accounts.push(BalanceDrift {
                    account_id: account.id.clone(),
                    name: account.name.clone(),
                    stored: account.balance.clone(),
                    recomputed: expected.clone(),
                });
            }
        }

        let snapshot = accounts
            .into_iter()
            .map(|a| {
                let balance = a.balance.clone();
                (a, balance)
            })
            .collect();
        let trial_balance = build_trial_balance(None, snapshot);
        if !trial_balance.is_balanced() {
            issues.push(format!(
                "Trial balance is not balanced: debits = {}, credits = {}",
                trial_balance.total_debit, trial_balance.total_credit
            ));
        }

        debug!(issues = issues.len(), "integrity check finished");

        Ok(IntegrityReport {
            is_valid: issues.is_empty(),
            issues,
            drifted_accounts,
            trial_balance_total_debit: trial_balance.total_debit,
            trial_balance_total_credit: trial_balance.total_credit,
        })
    }
}

/// Signed per-account totals of the given transactions
fn replay(accounts: &[Account], transactions: &[PostedTransaction]) -> HashMap<String, BigDecimal> {
    let types: HashMap<&str, AccountType> = accounts
        .iter()
        .map(|a| (a.id.as_str(), a.account_type))
        .collect();

    let mut balances: HashMap<String, BigDecimal> = HashMap::new();
    for entry in transactions.iter().flat_map(|t| &t.entries) {
        if let Some(account_type) = types.get(entry.account_id.as_str()) {
            *balances
                .entry(entry.account_id.clone())
                .or_insert_with(|| BigDecimal::from(0)) +=
                account_type.signed_effect(entry.entry_type, &entry.amount);
        }
    }
    balances
}

fn check_period(start_date: NaiveDate, end_date: NaiveDate) -> LedgerResult<()> {
    if start_date > end_date {
        return Err(LedgerError::invalid(format!(
            "Invalid period: start {} is after end {}",
            start_date, end_date
        )));
    }
    Ok(())
}

/// Order by code, then name
fn sorted(mut snapshot: Snapshot) -> Snapshot {
    snapshot.sort_by(|(a, _), (b, _)| {
        a.code_or_empty()
            .cmp(b.code_or_empty())
            .then_with(|| a.name.cmp(&b.name))
    });
    snapshot
}

fn line(account: Account, amount: BigDecimal) -> ReportLine {
    ReportLine {
        account_id: account.id,
        code: account.code,
        name: account.name,
        amount,
    }
}

/// Place a balance in the debit or credit column.
///
/// A positive balance sits on the account's normal side; a negative one is
/// shown as its magnitude on the opposite side.
fn columns(account_type: AccountType, balance: &BigDecimal) -> (BigDecimal, BigDecimal) {
    let zero = BigDecimal::from(0);
    if *balance == zero {
        return (zero.clone(), zero);
    }
    let on_normal_side = *balance > zero;
    let debit_column = match account_type.normal_balance() {
        EntryType::Debit => on_normal_side,
        EntryType::Credit => !on_normal_side,
    };
    if debit_column {
        (balance.abs(), zero)
    } else {
        (zero, balance.abs())
    }
}

fn build_trial_balance(as_of_date: Option<NaiveDate>, snapshot: Snapshot) -> TrialBalance {
    let mut total_debit = BigDecimal::from(0);
    let mut total_credit = BigDecimal::from(0);

    let rows: Vec<TrialBalanceRow> = sorted(snapshot)
        .into_iter()
        .map(|(account, balance)| {
            let (debit, credit) = columns(account.account_type, &balance);
            total_debit += &debit;
            total_credit += &credit;
            TrialBalanceRow {
                account_id: account.id,
                code: account.code,
                name: account.name,
                debit,
                credit,
            }
        })
        .collect();

    debug!(rows = rows.len(), "trial balance built");

    TrialBalance {
        as_of_date,
        rows,
        total_debit,
        total_credit,
    }
}

fn build_profit_and_loss(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    snapshot: Snapshot,
) -> ProfitAndLoss {
    let mut revenue = Vec::new();
    let mut expenses = Vec::new();
    for (account, amount) in sorted(snapshot) {
        match account.account_type {
            AccountType::Revenue => revenue.push(line(account, amount)),
            AccountType::Expense => expenses.push(line(account, amount)),
            _ => {}
        }
    }

    let total_revenue: BigDecimal = revenue.iter().map(|l| &l.amount).sum();
    let total_expenses: BigDecimal = expenses.iter().map(|l| &l.amount).sum();
    let net_income = &total_revenue - &total_expenses;

    ProfitAndLoss {
        start_date,
        end_date,
        revenue,
        expenses,
        total_revenue,
        total_expenses,
        net_income,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStorage;

    fn account(id: &str, code: &str, account_type: AccountType, balance: i64) -> Account {
        let mut account = Account::new(
            id.to_string(),
            Some(code.to_string()),
            id.to_string(),
            account_type,
            None,
        );
        account.balance = BigDecimal::from(balance);
        account
    }

    async fn aggregator_with(accounts: &[Account]) -> ReportAggregator<MemoryStorage> {
        let storage = MemoryStorage::new();
        for a in accounts {
            storage.insert_account(a).await.unwrap();
        }
        ReportAggregator::new(storage, ChartConfig::default())
    }

    #[test]
    fn negative_balances_switch_columns() {
        let overdraft = columns(AccountType::Asset, &BigDecimal::from(-40));
        assert_eq!(overdraft, (BigDecimal::from(0), BigDecimal::from(40)));

        let refund = columns(AccountType::Revenue, &BigDecimal::from(-15));
        assert_eq!(refund, (BigDecimal::from(15), BigDecimal::from(0)));

        let normal = columns(AccountType::Liability, &BigDecimal::from(70));
        assert_eq!(normal, (BigDecimal::from(0), BigDecimal::from(70)));
    }

    #[tokio::test]
    async fn balance_sheet_groups_by_code_range() {
        let aggregator = aggregator_with(&[
            account("cash", "1000", AccountType::Asset, 500),
            account("van", "1600", AccountType::Asset, 2000),
            account("deposit", "2100", AccountType::Asset, 100),
            account("payables", "2000", AccountType::Liability, 300),
            account("mortgage", "2700", AccountType::Liability, 1500),
            account("capital", "3000", AccountType::Equity, 700),
            account("sales", "4000", AccountType::Revenue, 900),
        ])
        .await;

        let sheet = aggregator.balance_sheet().await.unwrap();
        let categories: Vec<&str> = sheet.assets.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, ["Current Assets", "Fixed Assets", "Other Assets"]);
        assert_eq!(sheet.total_assets, BigDecimal::from(2600));
        assert_eq!(
            sheet.section("Long-term Liabilities").unwrap().total,
            BigDecimal::from(1500)
        );
        assert_eq!(sheet.section("Equity").unwrap().items.len(), 1);
        assert_eq!(sheet.total_liabilities_and_equity, BigDecimal::from(2500));
        // the unclosed revenue is not plugged into equity
        assert_eq!(sheet.difference(), BigDecimal::from(100));
    }

    #[tokio::test]
    async fn custom_chart_moves_section_boundaries() {
        let storage = MemoryStorage::new();
        storage
            .insert_account(&account("van", "1600", AccountType::Asset, 2000))
            .await
            .unwrap();
        let chart = ChartConfig {
            current_asset_limit: 1700,
            fixed_asset_limit: 1900,
            ..ChartConfig::default()
        };
        let aggregator = ReportAggregator::new(storage, chart);

        assert_eq!(aggregator.chart().asset_class(Some("1600")), AssetClass::Current);
        let sheet = aggregator.balance_sheet().await.unwrap();
        assert_eq!(sheet.assets[0].category, "Current Assets");
    }

    #[tokio::test]
    async fn empty_sections_are_omitted() {
        let aggregator =
            aggregator_with(&[account("cash", "1000", AccountType::Asset, 10)]).await;
        let sheet = aggregator.balance_sheet().await.unwrap();
        assert_eq!(sheet.assets.len(), 1);
        assert!(sheet.liabilities_and_equity.is_empty());
    }

    #[tokio::test]
    async fn integrity_check_spots_drift() {
        let aggregator =
            aggregator_with(&[account("cash", "1000", AccountType::Asset, 50)]).await;
        let report = aggregator.verify_integrity().await.unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.drifted_accounts.len(), 1);
        assert_eq!(report.drifted_accounts[0].recomputed, BigDecimal::from(0));
    }

    #[tokio::test]
    async fn inverted_period_is_rejected() {
        let aggregator = aggregator_with(&[]).await;
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            aggregator.cash_flow(start, end).await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn trial_balance_serializes_presentation_shape() {
        let tb = build_trial_balance(
            None,
            vec![(account("cash", "1000", AccountType::Asset, 5), BigDecimal::from(5))],
        );
        let json = serde_json::to_value(&tb).unwrap();
        let row = &json["rows"][0];
        assert_eq!(row["code"], "1000");
        assert_eq!(row["name"], "cash");
        assert!(row.get("debit").is_some());
        assert!(row.get("credit").is_some());
        assert!(json.get("totalDebit").is_some());
    }
}
