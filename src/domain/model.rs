use crate::domain::tax_id::TaxId;
use crate::domain::transaction_type::TransactionType;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 從一行定寬記錄解碼出的交易。
///
/// `value` 永遠是非負數；正負號由 `kind` 的性質決定。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: &'static TransactionType,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub value: Decimal,
    pub tax_id: TaxId,
    pub card: String,
    pub store_owner: String,
    pub store_name: String,
}

impl Transaction {
    pub fn signed_value(&self) -> Decimal {
        self.kind.nature.signed(self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub transactions: Vec<Transaction>,
    pub balance: Decimal,
}

pub type Summary = BTreeMap<String, SummaryEntry>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total_lines: u64,
    pub success_count: u64,
    pub failed_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl ImportResult {
    pub fn new(with_summary: bool) -> Self {
        Self {
            summary: with_summary.then(Summary::new),
            ..Self::default()
        }
    }

    /// Drops the per-merchant summary once the caller has consumed it.
    pub fn clear_summary(&mut self) {
        self.summary = None;
    }
}
