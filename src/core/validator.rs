use crate::domain::model::Transaction;
use crate::domain::tax_id::{self, TAX_ID_LENGTH};
use rust_decimal::Decimal;

/// A single business rule. Returns the reasons the transaction breaks it,
/// or an empty list when it passes.
pub trait Rule: Send + Sync {
    fn check(&self, transaction: &Transaction) -> Vec<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub reasons: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }
}

pub struct PositiveValue;

impl Rule for PositiveValue {
    fn check(&self, transaction: &Transaction) -> Vec<String> {
        if transaction.value > Decimal::ZERO {
            Vec::new()
        } else {
            vec!["value must be positive".to_string()]
        }
    }
}

/// 檢查納稅人識別碼長度與 modulo-11 檢查碼。
pub struct TaxIdCheckDigits;

impl Rule for TaxIdCheckDigits {
    fn check(&self, transaction: &Transaction) -> Vec<String> {
        let value = transaction.tax_id.as_str();
        if value.len() != TAX_ID_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
            return vec![format!("tax id must be exactly {} digits", TAX_ID_LENGTH)];
        }
        if !tax_id::is_valid(value) {
            return vec!["tax id check digits do not match".to_string()];
        }
        Vec::new()
    }
}

/// Ordered set of rules applied to every decoded transaction.
pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
}

impl Validator {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// The baseline gate, optionally extended with the tax-id rule.
    pub fn standard(validate_tax_id: bool) -> Self {
        let validator = Self::empty().with_rule(PositiveValue);
        if validate_tax_id {
            validator.with_rule(TaxIdCheckDigits)
        } else {
            validator
        }
    }

    pub fn validate(&self, transaction: &Transaction) -> Validation {
        let reasons = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(transaction))
            .collect();
        Validation { reasons }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::standard(false)
    }
}
