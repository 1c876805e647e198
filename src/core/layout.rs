//! Canonical fixed-width record layout.
//!
//! Offsets count characters, not bytes: owner and store names may carry
//! non-ASCII letters.

use crate::domain::model::Transaction;
use std::ops::Range;

pub const TYPE: Range<usize> = 0..1;
pub const DATE: Range<usize> = 1..9;
pub const VALUE: Range<usize> = 9..19;
pub const TAX_ID: Range<usize> = 19..30;
pub const CARD: Range<usize> = 30..42;
pub const TIME: Range<usize> = 42..48;
pub const STORE_OWNER: Range<usize> = 48..62;
/// Store name runs from here to the end of the line.
pub const STORE_NAME_START: usize = 62;

/// Shortest line that still holds every fixed field.
pub const MIN_RECORD_WIDTH: usize = STORE_NAME_START;

/// Width the store name is padded to when encoding.
pub const STORE_NAME_WIDTH: usize = 19;

/// 將交易轉回定寬格式，名稱以空白補齊、金額以最小單位補零。
pub fn encode_record(transaction: &Transaction) -> String {
    let mut value = transaction.value;
    value.rescale(2);
    let minor_units = value.mantissa();

    let mut line = String::with_capacity(STORE_NAME_START + STORE_NAME_WIDTH);
    line.push_str(&transaction.kind.code.to_string());
    line.push_str(&transaction.date.format("%Y%m%d").to_string());
    line.push_str(&format!("{:0>width$}", minor_units, width = VALUE.len()));
    line.push_str(&fit(transaction.tax_id.as_str(), TAX_ID.len()));
    line.push_str(&fit(&transaction.card, CARD.len()));
    line.push_str(&transaction.time.format("%H%M%S").to_string());
    line.push_str(&fit(&transaction.store_owner, STORE_OWNER.len()));
    line.push_str(&fit(&transaction.store_name, STORE_NAME_WIDTH));
    line
}

// Truncates or right-pads with spaces to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tax_id::TaxId;
    use crate::domain::transaction_type;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    #[test]
    fn test_field_ranges_are_contiguous() {
        let ranges = [TYPE, DATE, VALUE, TAX_ID, CARD, TIME, STORE_OWNER];
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(STORE_OWNER.end, STORE_NAME_START);
    }

    #[test]
    fn test_encode_record_layout() {
        let transaction = Transaction {
            kind: transaction_type::lookup(3).unwrap(),
            date: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
            time: NaiveTime::from_hms_opt(15, 34, 53).unwrap(),
            value: dec!(142.00),
            tax_id: TaxId::new("09620676017").unwrap(),
            card: "4753****3153".to_string(),
            store_owner: "JOÃO MACEDO".to_string(),
            store_name: "BAR DO JOÃO".to_string(),
        };

        let line = encode_record(&transaction);
        assert!(line.starts_with("3201903010000014200096206760174753****3153153453JOÃO MACEDO   BAR DO JOÃO"));
        assert_eq!(line.chars().count(), STORE_NAME_START + STORE_NAME_WIDTH);
    }
}
