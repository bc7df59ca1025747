//! Journal entry drafting and validation
//!
//! Validation is a pure function over a [`DraftTransaction`]. It never reads
//! storage, so the same rules back both posting and live balance previews.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// A proposed journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    /// Target account; `None` while the line is still being filled in
    pub account_id: Option<String>,
    pub entry_type: EntryType,
    pub amount: BigDecimal,
    pub memo: Option<String>,
}

impl DraftEntry {
    pub fn debit(account_id: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            account_id: Some(account_id.into()),
            entry_type: EntryType::Debit,
            amount,
            memo: None,
        }
    }

    pub fn credit(account_id: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            account_id: Some(account_id.into()),
            entry_type: EntryType::Credit,
            amount,
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn is_debit(&self) -> bool {
        self.entry_type == EntryType::Debit
    }
}

/// A proposed transaction, as captured from user input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftTransaction {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub fiscal_year: Option<String>,
    pub created_by: Option<String>,
    pub entries: Vec<DraftEntry>,
}

impl DraftTransaction {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Run the double-entry rules; see [`validate`]
    pub fn validate(&self) -> LedgerResult<ValidatedTransaction> {
        validate(self)
    }
}

/// A journal line that passed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedEntry {
    pub account_id: String,
    pub entry_type: EntryType,
    pub amount: BigDecimal,
    pub memo: Option<String>,
}

/// A balanced transaction ready for posting.
///
/// Only [`validate`] can produce one, so holding a value proves the
/// double-entry rules held for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedTransaction {
    date: NaiveDate,
    description: String,
    fiscal_year: Option<String>,
    created_by: Option<String>,
    entries: Vec<ValidatedEntry>,
    total: BigDecimal,
}

impl ValidatedTransaction {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn fiscal_year(&self) -> Option<&str> {
        self.fiscal_year.as_deref()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn entries(&self) -> &[ValidatedEntry] {
        &self.entries
    }

    /// Debit total, which equals the credit total
    pub fn total(&self) -> &BigDecimal {
        &self.total
    }
}

/// Running totals of a draft, for previews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceCheck {
    pub debits: BigDecimal,
    pub credits: BigDecimal,
    /// debits - credits
    pub difference: BigDecimal,
}

impl BalanceCheck {
    pub fn is_balanced(&self) -> bool {
        self.difference == BigDecimal::from(0)
    }
}

/// Sum both sides of a draft without judging it
pub fn balance_check(draft: &DraftTransaction) -> BalanceCheck {
    let debits: BigDecimal = draft
        .entries
        .iter()
        .filter(|e| e.is_debit())
        .map(|e| &e.amount)
        .sum();
    let credits: BigDecimal = draft
        .entries
        .iter()
        .filter(|e| !e.is_debit())
        .map(|e| &e.amount)
        .sum();
    let difference = &debits - &credits;
    BalanceCheck {
        debits,
        credits,
        difference,
    }
}

/// Apply the double-entry rules in order, stopping at the first failure:
///
/// 1. date and description present
/// 2. at least two entries, each naming an account
/// 3. every amount strictly positive
/// 4. debits equal credits
pub fn validate(draft: &DraftTransaction) -> LedgerResult<ValidatedTransaction> {
    let date = draft.date.ok_or(ValidationError::MissingField("date"))?;
    let description = draft.description.trim();
    if description.is_empty() {
        return Err(ValidationError::MissingField("description").into());
    }

    if draft.entries.len() < 2 {
        return Err(ValidationError::MissingAccount(format!(
            "transaction needs at least two entries, got {}",
            draft.entries.len()
        ))
        .into());
    }
    let mut account_ids = Vec::with_capacity(draft.entries.len());
    for (index, entry) in draft.entries.iter().enumerate() {
        match entry.account_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => account_ids.push(id.to_string()),
            _ => {
                return Err(ValidationError::MissingAccount(format!(
                    "entry {} has no account",
                    index
                ))
                .into())
            }
        }
    }

    let zero = BigDecimal::from(0);
    for (index, entry) in draft.entries.iter().enumerate() {
        if entry.amount <= zero {
            return Err(ValidationError::InvalidAmount {
                index,
                amount: entry.amount.to_string(),
            }
            .into());
        }
    }

    let check = balance_check(draft);
    if !check.is_balanced() {
        return Err(LedgerError::Unbalanced {
            imbalance: check.difference.abs(),
            debits: check.debits,
            credits: check.credits,
        });
    }

    let entries = draft
        .entries
        .iter()
        .zip(account_ids)
        .map(|(entry, account_id)| ValidatedEntry {
            account_id,
            entry_type: entry.entry_type,
            amount: entry.amount.clone(),
            memo: entry.memo.clone(),
        })
        .collect();

    Ok(ValidatedTransaction {
        date,
        description: description.to_string(),
        fiscal_year: draft.fiscal_year.clone(),
        created_by: draft.created_by.clone(),
        entries,
        total: check.debits,
    })
}

/// Transaction builder for creating complex transactions
#[derive(Debug)]
pub struct DraftBuilder {
    draft: DraftTransaction,
}

impl DraftBuilder {
    /// Create a new transaction builder
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            draft: DraftTransaction::new(date, description),
        }
    }

    pub fn fiscal_year(mut self, fiscal_year: impl Into<String>) -> Self {
        self.draft.fiscal_year = Some(fiscal_year.into());
        self
    }

    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.draft.created_by = Some(user.into());
        self
    }

    /// Add a debit entry
    pub fn debit(
        mut self,
        account_id: impl Into<String>,
        amount: BigDecimal,
        memo: Option<String>,
    ) -> Self {
        self.draft.entries.push(DraftEntry {
            memo,
            ..DraftEntry::debit(account_id, amount)
        });
        self
    }

    /// Add a credit entry
    pub fn credit(
        mut self,
        account_id: impl Into<String>,
        amount: BigDecimal,
        memo: Option<String>,
    ) -> Self {
        self.draft.entries.push(DraftEntry {
            memo,
            ..DraftEntry::credit(account_id, amount)
        });
        self
    }

    /// Add a custom entry
    pub fn entry(mut self, entry: DraftEntry) -> Self {
        self.draft.entries.push(entry);
        self
    }

    /// The draft as built so far, unvalidated
    pub fn draft(&self) -> &DraftTransaction {
        &self.draft
    }

    /// Validate and build the transaction
    pub fn build(self) -> LedgerResult<ValidatedTransaction> {
        validate(&self.draft)
    }
}

/// Parameters for a salary payment with withholding
pub struct SalaryPaymentParams {
    pub date: NaiveDate,
    pub description: String,
    pub salary_expense_account_id: String,
    pub cash_account_id: String,
    pub withholding_account_id: String,
    pub gross_amount: BigDecimal,
    pub withheld_amount: BigDecimal,
}

/// Journal templates for everyday business events
pub mod patterns {
    use super::*;

    /// Cash or credit sale: debit cash/receivables, credit revenue
    pub fn cash_sale(
        date: NaiveDate,
        description: &str,
        cash_or_receivables_account_id: &str,
        revenue_account_id: &str,
        amount: BigDecimal,
    ) -> LedgerResult<ValidatedTransaction> {
        DraftBuilder::new(date, description)
            .debit(cash_or_receivables_account_id, amount.clone(), None)
            .credit(revenue_account_id, amount, None)
            .build()
    }

    /// Expense paid in cash: debit expense, credit cash
    pub fn expense_payment(
        date: NaiveDate,
        description: &str,
        expense_account_id: &str,
        cash_account_id: &str,
        amount: BigDecimal,
    ) -> LedgerResult<ValidatedTransaction> {
        DraftBuilder::new(date, description)
            .debit(expense_account_id, amount.clone(), None)
            .credit(cash_account_id, amount, None)
            .build()
    }

    /// Asset bought outright or on account
    pub fn asset_purchase(
        date: NaiveDate,
        description: &str,
        asset_account_id: &str,
        cash_or_payables_account_id: &str,
        amount: BigDecimal,
    ) -> LedgerResult<ValidatedTransaction> {
        DraftBuilder::new(date, description)
            .debit(asset_account_id, amount.clone(), None)
            .credit(cash_or_payables_account_id, amount, None)
            .build()
    }

    /// Goods or services received from a supplier, payable later
    pub fn purchase_on_credit(
        date: NaiveDate,
        description: &str,
        inventory_or_expense_account_id: &str,
        payables_account_id: &str,
        amount: BigDecimal,
    ) -> LedgerResult<ValidatedTransaction> {
        DraftBuilder::new(date, description)
            .debit(
                inventory_or_expense_account_id,
                amount.clone(),
                Some("Purchase".to_string()),
            )
            .credit(
                payables_account_id,
                amount,
                Some("Owed to supplier".to_string()),
            )
            .build()
    }

    pub fn loan_received(
        date: NaiveDate,
        description: &str,
        cash_account_id: &str,
        loan_payable_account_id: &str,
        amount: BigDecimal,
    ) -> LedgerResult<ValidatedTransaction> {
        DraftBuilder::new(date, description)
            .debit(
                cash_account_id,
                amount.clone(),
                Some("Cash received from loan".to_string()),
            )
            .credit(
                loan_payable_account_id,
                amount,
                Some("Loan payable".to_string()),
            )
            .build()
    }

    pub fn owner_investment(
        date: NaiveDate,
        description: &str,
        cash_account_id: &str,
        equity_account_id: &str,
        amount: BigDecimal,
    ) -> LedgerResult<ValidatedTransaction> {
        DraftBuilder::new(date, description)
            .debit(
                cash_account_id,
                amount.clone(),
                Some("Cash invested by owner".to_string()),
            )
            .credit(
                equity_account_id,
                amount,
                Some("Owner's capital contribution".to_string()),
            )
            .build()
    }

    /// Payroll run: gross salary expensed, net paid in cash, the rest
    /// held as a liability until remitted.
    pub fn salary_payment(params: SalaryPaymentParams) -> LedgerResult<ValidatedTransaction> {
        let net_amount = &params.gross_amount - &params.withheld_amount;

        let builder = DraftBuilder::new(params.date, params.description)
            .debit(
                params.salary_expense_account_id,
                params.gross_amount,
                Some("Gross salary".to_string()),
            )
            .credit(
                params.cash_account_id,
                net_amount,
                Some("Net pay".to_string()),
            );

        if params.withheld_amount == BigDecimal::from(0) {
            builder.build()
        } else {
            builder
                .credit(
                    params.withholding_account_id,
                    params.withheld_amount,
                    Some("Withheld from salary".to_string()),
                )
                .build()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn balanced_draft_validates() {
        let validated = DraftBuilder::new(day(), "Sale")
            .debit("cash", BigDecimal::from(1000), None)
            .credit("sales", BigDecimal::from(1000), None)
            .build()
            .unwrap();

        assert_eq!(validated.entries().len(), 2);
        assert_eq!(validated.total(), &BigDecimal::from(1000));
        assert_eq!(validated.description(), "Sale");
    }

    #[test]
    fn memos_carry_through_validation() {
        let validated = DraftBuilder::new(day(), "Till takings")
            .entry(DraftEntry::debit("cash", BigDecimal::from(60)).with_memo("float"))
            .entry(DraftEntry::credit("sales", BigDecimal::from(60)))
            .build()
            .unwrap();

        assert_eq!(validated.entries()[0].memo.as_deref(), Some("float"));
        assert_eq!(validated.entries()[1].memo, None);
    }

    #[test]
    fn missing_date_is_reported_first() {
        let draft = DraftTransaction {
            date: None,
            description: String::new(),
            entries: vec![DraftEntry::debit("cash", BigDecimal::from(-1))],
            ..DraftTransaction::default()
        };
        assert_eq!(
            validate(&draft).unwrap_err(),
            LedgerError::Validation(ValidationError::MissingField("date"))
        );
    }

    #[test]
    fn blank_description_is_missing() {
        let draft = DraftBuilder::new(day(), "   ")
            .debit("cash", BigDecimal::from(1), None)
            .credit("sales", BigDecimal::from(1), None);
        assert_eq!(
            draft.build().unwrap_err(),
            LedgerError::Validation(ValidationError::MissingField("description"))
        );
    }

    #[test]
    fn single_entry_is_missing_an_account() {
        let err = DraftBuilder::new(day(), "One-sided")
            .debit("cash", BigDecimal::from(10), None)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::MissingAccount(_))
        ));
    }

    #[test]
    fn unresolved_account_is_missing_an_account() {
        let err = DraftBuilder::new(day(), "Half filled")
            .debit("cash", BigDecimal::from(10), None)
            .entry(DraftEntry {
                account_id: None,
                entry_type: EntryType::Credit,
                amount: BigDecimal::from(10),
                memo: None,
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Validation(ValidationError::MissingAccount(
                "entry 1 has no account".to_string()
            ))
        );
    }

    #[test]
    fn account_check_precedes_amount_check() {
        let err = DraftBuilder::new(day(), "Bad")
            .debit("cash", BigDecimal::from(0), None)
            .credit("  ", BigDecimal::from(5), None)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::MissingAccount(_))
        ));
    }

    #[test]
    fn zero_amount_is_invalid() {
        let err = DraftBuilder::new(day(), "Zero")
            .debit("cash", BigDecimal::from(0), None)
            .credit("sales", BigDecimal::from(0), None)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Validation(ValidationError::InvalidAmount {
                index: 0,
                amount: "0".to_string()
            })
        );
    }

    #[test]
    fn unbalanced_draft_reports_imbalance() {
        let err = DraftBuilder::new(day(), "Short credit")
            .debit("cash", BigDecimal::from(500), None)
            .credit("sales", BigDecimal::from(400), None)
            .build()
            .unwrap_err();
        match err {
            LedgerError::Unbalanced {
                debits,
                credits,
                imbalance,
            } => {
                assert_eq!(debits, BigDecimal::from(500));
                assert_eq!(credits, BigDecimal::from(400));
                assert_eq!(imbalance, BigDecimal::from(100));
            }
            other => panic!("expected unbalanced error, got {other:?}"),
        }
    }

    #[test]
    fn credit_heavy_imbalance_is_positive() {
        let err = DraftBuilder::new(day(), "Short debit")
            .debit("cash", BigDecimal::from(400), None)
            .credit("sales", BigDecimal::from(500), None)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Unbalanced { imbalance, .. } if imbalance == BigDecimal::from(100)
        ));
    }

    #[test]
    fn validation_is_repeatable() {
        let builder = DraftBuilder::new(day(), "Twice")
            .debit("cash", BigDecimal::from(500), None)
            .credit("sales", BigDecimal::from(400), None);
        let draft = builder.draft().clone();
        assert_eq!(validate(&draft), validate(&draft));
    }

    #[test]
    fn balance_check_previews_without_failing() {
        let draft = DraftBuilder::new(day(), "Preview")
            .debit("cash", BigDecimal::from(300), None)
            .credit("sales", BigDecimal::from(120), None);
        let check = balance_check(draft.draft());
        assert_eq!(check.difference, BigDecimal::from(180));
        assert!(!check.is_balanced());
    }

    #[test]
    fn salary_payment_splits_withholding() {
        let txn = patterns::salary_payment(SalaryPaymentParams {
            date: day(),
            description: "April payroll".to_string(),
            salary_expense_account_id: "salaries".to_string(),
            cash_account_id: "cash".to_string(),
            withholding_account_id: "tax_payable".to_string(),
            gross_amount: BigDecimal::from(5000),
            withheld_amount: BigDecimal::from(500),
        })
        .unwrap();

        assert_eq!(txn.entries().len(), 3);
        assert_eq!(txn.entries()[1].amount, BigDecimal::from(4500));
        assert_eq!(txn.total(), &BigDecimal::from(5000));
    }

    #[test]
    fn salary_payment_without_withholding_has_two_lines() {
        let txn = patterns::salary_payment(SalaryPaymentParams {
            date: day(),
            description: "Casual wages".to_string(),
            salary_expense_account_id: "salaries".to_string(),
            cash_account_id: "cash".to_string(),
            withholding_account_id: "tax_payable".to_string(),
            gross_amount: BigDecimal::from(800),
            withheld_amount: BigDecimal::from(0),
        })
        .unwrap();
        assert_eq!(txn.entries().len(), 2);
    }
}
