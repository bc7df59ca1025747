//! Ledger configuration: chart-of-accounts ranges and input limits.

use std::path::Path;

use serde::Deserialize;

use crate::types::{LedgerError, LedgerResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LedgerConfig {
    /// How account codes map to report categories.
    #[serde(default)]
    pub chart: ChartConfig,
    /// Length limits enforced by the enhanced validators.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl LedgerConfig {
    /// Parses configuration from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if the text is not valid TOML or a
    /// value has the wrong type.
    pub fn from_toml_str(text: &str) -> LedgerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> LedgerResult<()> {
        if self.chart.current_asset_limit > self.chart.fixed_asset_limit {
            return Err(LedgerError::Config(format!(
                "current_asset_limit ({}) must not exceed fixed_asset_limit ({})",
                self.chart.current_asset_limit, self.chart.fixed_asset_limit
            )));
        }
        Ok(())
    }
}

/// Balance sheet grouping of asset accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Current,
    Fixed,
    Other,
}

impl AssetClass {
    pub fn label(&self) -> &'static str {
        match self {
            AssetClass::Current => "Current Assets",
            AssetClass::Fixed => "Fixed Assets",
            AssetClass::Other => "Other Assets",
        }
    }
}

/// Balance sheet grouping of liability accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiabilityClass {
    Current,
    LongTerm,
}

impl LiabilityClass {
    pub fn label(&self) -> &'static str {
        match self {
            LiabilityClass::Current => "Current Liabilities",
            LiabilityClass::LongTerm => "Long-term Liabilities",
        }
    }
}

/// Code thresholds used to partition the chart of accounts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartConfig {
    /// Asset codes below this are current assets.
    #[serde(default = "default_current_asset_limit")]
    pub current_asset_limit: u32,
    /// Asset codes below this (and not current) are fixed assets.
    #[serde(default = "default_fixed_asset_limit")]
    pub fixed_asset_limit: u32,
    /// Liability codes below this are current liabilities.
    #[serde(default = "default_current_liability_limit")]
    pub current_liability_limit: u32,
    /// Codes of the accounts the cash flow statement treats as cash.
    #[serde(default = "default_cash_accounts")]
    pub cash_accounts: Vec<String>,
}

fn default_current_asset_limit() -> u32 {
    1500
}

fn default_fixed_asset_limit() -> u32 {
    2000
}

fn default_current_liability_limit() -> u32 {
    2500
}

fn default_cash_accounts() -> Vec<String> {
    vec!["1000".to_string()]
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            current_asset_limit: default_current_asset_limit(),
            fixed_asset_limit: default_fixed_asset_limit(),
            current_liability_limit: default_current_liability_limit(),
            cash_accounts: default_cash_accounts(),
        }
    }
}

impl ChartConfig {
    pub fn asset_class(&self, code: Option<&str>) -> AssetClass {
        match code.and_then(numeric_code) {
            Some(n) if n < self.current_asset_limit => AssetClass::Current,
            Some(n) if n < self.fixed_asset_limit => AssetClass::Fixed,
            _ => AssetClass::Other,
        }
    }

    pub fn liability_class(&self, code: Option<&str>) -> LiabilityClass {
        match code.and_then(numeric_code) {
            Some(n) if n < self.current_liability_limit => LiabilityClass::Current,
            _ => LiabilityClass::LongTerm,
        }
    }

    pub fn is_cash(&self, code: Option<&str>) -> bool {
        code.is_some_and(|c| self.cash_accounts.iter().any(|cash| cash == c))
    }
}

/// Leading digits of an account code, e.g. "1010-A" -> 1010.
fn numeric_code(code: &str) -> Option<u32> {
    let digits: String = code
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Input length limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_account_name_length")]
    pub max_account_name_length: usize,
    #[serde(default = "default_max_account_code_length")]
    pub max_account_code_length: usize,
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
}

fn default_max_account_name_length() -> usize {
    100
}

fn default_max_account_code_length() -> usize {
    20
}

fn default_max_description_length() -> usize {
    500
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_account_name_length: default_max_account_name_length(),
            max_account_code_length: default_max_account_code_length(),
            max_description_length: default_max_description_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = LedgerConfig::from_toml_str("").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.chart.current_asset_limit, 1500);
        assert_eq!(config.limits.max_description_length, 500);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = LedgerConfig::from_toml_str(
            r#"
            [chart]
            current_asset_limit = 1200
            cash_accounts = ["1000", "1010"]
            "#,
        )
        .unwrap();
        assert_eq!(config.chart.current_asset_limit, 1200);
        assert_eq!(config.chart.fixed_asset_limit, 2000);
        assert!(config.chart.is_cash(Some("1010")));
        assert!(!config.chart.is_cash(None));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = LedgerConfig::from_toml_str("[chart\ncurrent_asset_limit = 1").unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn inverted_asset_limits_are_rejected() {
        let err = LedgerConfig::from_toml_str(
            "[chart]\ncurrent_asset_limit = 3000\nfixed_asset_limit = 2000\n",
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn classification_by_code_prefix() {
        let chart = ChartConfig::default();
        assert_eq!(chart.asset_class(Some("1000")), AssetClass::Current);
        assert_eq!(chart.asset_class(Some("1499")), AssetClass::Current);
        assert_eq!(chart.asset_class(Some("1500")), AssetClass::Fixed);
        assert_eq!(chart.asset_class(Some("1710-B")), AssetClass::Fixed);
        assert_eq!(chart.asset_class(Some("2100")), AssetClass::Other);
        assert_eq!(chart.asset_class(Some("misc")), AssetClass::Other);
        assert_eq!(chart.asset_class(None), AssetClass::Other);
        assert_eq!(chart.liability_class(Some("2000")), LiabilityClass::Current);
        assert_eq!(chart.liability_class(Some("2600")), LiabilityClass::LongTerm);
        assert_eq!(chart.liability_class(None), LiabilityClass::LongTerm);
    }
}
