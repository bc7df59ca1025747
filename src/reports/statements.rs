//! Report shapes handed to the presentation layer

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;

/// One account's line in the trial balance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceRow {
    pub account_id: String,
    pub code: Option<String>,
    pub name: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
}

/// Every account's balance split into debit and credit columns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalance {
    /// `None` means current stored balances
    pub as_of_date: Option<NaiveDate>,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
}

impl TrialBalance {
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// A named amount inside a report section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub account_id: String,
    pub code: Option<String>,
    pub name: String,
    pub amount: BigDecimal,
}

/// A category of a statement, e.g. "Current Assets"
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub category: String,
    pub items: Vec<ReportLine>,
    pub total: BigDecimal,
}

impl ReportSection {
    pub(crate) fn new(category: &str, items: Vec<ReportLine>) -> Self {
        let total: BigDecimal = items.iter().map(|line| &line.amount).sum();
        Self {
            category: category.to_string(),
            items,
            total,
        }
    }
}

/// Balance sheet. The two sides are reported as they are; no balancing
/// figure is added, so unclosed profit or loss shows up in `difference()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub as_of_date: Option<NaiveDate>,
    pub assets: Vec<ReportSection>,
    pub liabilities_and_equity: Vec<ReportSection>,
    pub total_assets: BigDecimal,
    pub total_liabilities_and_equity: BigDecimal,
}

impl BalanceSheet {
    /// Assets minus liabilities and equity
    pub fn difference(&self) -> BigDecimal {
        &self.total_assets - &self.total_liabilities_and_equity
    }

    pub fn is_balanced(&self) -> bool {
        self.total_assets == self.total_liabilities_and_equity
    }

    pub fn section(&self, category: &str) -> Option<&ReportSection> {
        self.assets
            .iter()
            .chain(&self.liabilities_and_equity)
            .find(|s| s.category == category)
    }
}

/// Profit and loss statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLoss {
    /// Both `None` for a statement over the whole ledger
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub revenue: Vec<ReportLine>,
    pub expenses: Vec<ReportLine>,
    pub total_revenue: BigDecimal,
    pub total_expenses: BigDecimal,
    pub net_income: BigDecimal,
}

/// Cash flow statement structure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowStatement {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub operating_activities: Vec<CashFlowItem>,
    pub investing_activities: Vec<CashFlowItem>,
    pub financing_activities: Vec<CashFlowItem>,
    pub net_operating_cash_flow: BigDecimal,
    pub net_investing_cash_flow: BigDecimal,
    pub net_financing_cash_flow: BigDecimal,
    pub net_cash_flow: BigDecimal,
}

/// Net cash movement of one transaction; positive is cash in
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowItem {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: BigDecimal,
}

/// An account whose stored balance disagrees with its entry history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub account_id: String,
    pub name: String,
    pub stored: BigDecimal,
    pub recomputed: BigDecimal,
}

/// Report on ledger integrity and validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub drifted_accounts: Vec<BalanceDrift>,
    pub trial_balance_total_debit: BigDecimal,
    pub trial_balance_total_credit: BigDecimal,
}
