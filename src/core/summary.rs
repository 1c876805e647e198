use crate::domain::model::{Summary, SummaryEntry, Transaction};

/// Groups accepted transactions by store name and keeps a signed running balance.
///
/// Grows with the number of accepted transactions, not with the batch size.
#[derive(Debug, Default)]
pub struct SummaryAggregator {
    entries: Summary,
}

impl SummaryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, transaction: &Transaction) {
        let entry = self
            .entries
            .entry(transaction.store_name.clone())
            .or_default();
        entry.balance += transaction.signed_value();
        entry.transactions.push(transaction.clone());
    }

    pub fn get(&self, store_name: &str) -> Option<&SummaryEntry> {
        self.entries.get(store_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_summary(self) -> Summary {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tax_id::TaxId;
    use crate::domain::transaction_type;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn transaction(code: u8, value: Decimal, store_name: &str) -> Transaction {
        Transaction {
            kind: transaction_type::lookup(code).unwrap(),
            date: NaiveDate::from_ymd_opt(2020, 4, 28).unwrap(),
            time: NaiveTime::from_hms_opt(12, 50, 0).unwrap(),
            value,
            tax_id: TaxId::new("28584565345").unwrap(),
            card: "3424****8752".to_string(),
            store_owner: "Owner".to_string(),
            store_name: store_name.to_string(),
        }
    }

    #[test]
    fn test_income_minus_expense() {
        let mut aggregator = SummaryAggregator::new();
        aggregator.record(&transaction(1, dec!(100.00), "Store Name"));
        aggregator.record(&transaction(9, dec!(30.00), "Store Name"));

        let entry = aggregator.get("Store Name").unwrap();
        assert_eq!(entry.balance, dec!(70.00));
        assert_eq!(entry.transactions.len(), 2);
    }

    #[test]
    fn test_entries_are_per_store() {
        let mut aggregator = SummaryAggregator::new();
        aggregator.record(&transaction(1, dec!(10.00), "A"));
        aggregator.record(&transaction(2, dec!(4.50), "B"));
        aggregator.record(&transaction(4, dec!(1.00), "A"));

        assert_eq!(aggregator.len(), 2);
        let summary = aggregator.into_summary();
        assert_eq!(summary["A"].balance, dec!(11.00));
        assert_eq!(summary["B"].balance, dec!(-4.50));
        assert_eq!(summary["A"].transactions[1].value, dec!(1.00));
    }

    #[test]
    fn test_new_aggregator_is_empty() {
        assert!(SummaryAggregator::new().is_empty());
    }
}
