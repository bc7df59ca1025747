//! Validation utilities

use std::collections::HashSet;

use crate::config::LimitsConfig;
use crate::ledger::journal::ValidatedTransaction;
use crate::traits::*;
use crate::types::*;

/// Validate that an account code is valid
pub fn validate_account_code(code: &str, max_length: usize) -> LedgerResult<()> {
    if code.trim().is_empty() {
        return Err(LedgerError::invalid("Account code cannot be empty"));
    }

    if code.chars().count() > max_length {
        return Err(LedgerError::invalid(format!(
            "Account code cannot exceed {} characters",
            max_length
        )));
    }

    // alphanumeric, dashes, dots
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(LedgerError::invalid(
            "Account code can only contain letters, digits, dashes, and dots",
        ));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str, max_length: usize) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }

    if name.chars().count() > max_length {
        return Err(LedgerError::invalid(format!(
            "Account name cannot exceed {} characters",
            max_length
        )));
    }

    Ok(())
}

/// Validate the length of a free-text description
pub fn validate_description(description: &str, max_length: usize) -> LedgerResult<()> {
    if description.chars().count() > max_length {
        return Err(LedgerError::invalid(format!(
            "Description cannot exceed {} characters",
            max_length
        )));
    }

    Ok(())
}

/// Account validator enforcing the configured limits
pub struct EnhancedAccountValidator {
    limits: LimitsConfig,
}

impl EnhancedAccountValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }
}

impl Default for EnhancedAccountValidator {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl AccountValidator for EnhancedAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        validate_account_name(&account.name, self.limits.max_account_name_length)?;
        if let Some(code) = account.code.as_deref() {
            validate_account_code(code, self.limits.max_account_code_length)?;
        }
        if let Some(description) = account.description.as_deref() {
            validate_description(description, self.limits.max_description_length)?;
        }
        Ok(())
    }
}

/// Transaction validator enforcing the configured description length
pub struct LimitsTransactionValidator {
    limits: LimitsConfig,
}

impl LimitsTransactionValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }
}

impl Default for LimitsTransactionValidator {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl TransactionValidator for LimitsTransactionValidator {
    fn validate_transaction(&self, transaction: &ValidatedTransaction) -> LedgerResult<()> {
        validate_description(transaction.description(), self.limits.max_description_length)
    }
}

/// Transaction validator with stricter bookkeeping rules: bounded
/// descriptions, and no account appearing twice on the same side.
pub struct StrictTransactionValidator {
    limits: LimitsTransactionValidator,
}

impl StrictTransactionValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            limits: LimitsTransactionValidator::new(limits),
        }
    }
}

impl Default for StrictTransactionValidator {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl TransactionValidator for StrictTransactionValidator {
    fn validate_transaction(&self, transaction: &ValidatedTransaction) -> LedgerResult<()> {
        self.limits.validate_transaction(transaction)?;

        let mut seen = HashSet::new();
        for entry in transaction.entries() {
            if !seen.insert((entry.account_id.as_str(), entry.entry_type)) {
                return Err(LedgerError::invalid(format!(
                    "Account '{}' appears multiple times with the same entry type in transaction",
                    entry.account_id
                )));
            }
        }

        Ok(())
    }
}
