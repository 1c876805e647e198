use crate::core::layout::{self, MIN_RECORD_WIDTH, STORE_NAME_START};
use crate::domain::model::Transaction;
use crate::domain::tax_id::TaxId;
use crate::domain::transaction_type;
use crate::utils::error::DecodeError;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::ops::Range;

// Character positions at which a field starts or ends, in layout order.
const BOUNDARIES: [usize; 8] = [
    layout::TYPE.start,
    layout::DATE.start,
    layout::VALUE.start,
    layout::TAX_ID.start,
    layout::CARD.start,
    layout::TIME.start,
    layout::STORE_OWNER.start,
    STORE_NAME_START,
];

/// Slices a line into its fields by character offset, then parses each one.
///
/// Pure: no I/O, no shared state, safe to call from many tasks at once.
pub fn decode(line: &str) -> Result<Transaction, DecodeError> {
    let fields = Fields::split(line)?;

    let code = fields.get(0);
    let kind = code
        .parse::<u8>()
        .ok()
        .and_then(|c| transaction_type::lookup(c).ok())
        .ok_or_else(|| DecodeError::UnknownType {
            code: code.to_string(),
        })?;

    let date = parse_date(fields.get(1))?;
    let value = parse_value(fields.get(2))?;
    let tax_id = parse_tax_id(fields.get(3))?;
    let card = fields.get(4).to_string();
    let time = parse_time(fields.get(5))?;
    let store_owner = fields.get(6).trim().to_string();
    let store_name = fields.rest().trim().to_string();

    Ok(Transaction {
        kind,
        date,
        time,
        value,
        tax_id,
        card,
        store_owner,
        store_name,
    })
}

struct Fields<'a> {
    line: &'a str,
    // Byte offset of every boundary in `BOUNDARIES`.
    offsets: [usize; 8],
}

impl<'a> Fields<'a> {
    fn split(line: &'a str) -> Result<Self, DecodeError> {
        let mut offsets = [0usize; 8];
        let mut next = 0;

        let positions = line
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(line.len()));

        for (char_pos, byte) in positions.enumerate() {
            if char_pos == BOUNDARIES[next] {
                offsets[next] = byte;
                next += 1;
                if next == BOUNDARIES.len() {
                    return Ok(Self { line, offsets });
                }
            }
        }

        Err(DecodeError::TooShort {
            length: line.chars().count(),
            minimum: MIN_RECORD_WIDTH,
        })
    }

    fn get(&self, index: usize) -> &'a str {
        let range: Range<usize> = self.offsets[index]..self.offsets[index + 1];
        &self.line[range]
    }

    fn rest(&self) -> &'a str {
        &self.line[self.offsets[BOUNDARIES.len() - 1]..]
    }
}

fn digits(field: &'static str, raw: &str) -> Result<(), DecodeError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(field, raw));
    }
    Ok(())
}

fn malformed(field: &'static str, raw: &str) -> DecodeError {
    DecodeError::MalformedField {
        field,
        value: raw.to_string(),
    }
}

// Digits are checked first, so slicing by byte and parsing cannot fail below.
fn number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, DecodeError> {
    raw.parse::<T>().map_err(|_| malformed(field, raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate, DecodeError> {
    digits("date", raw)?;
    let year = number::<i32>("date", &raw[0..4])?;
    let month = number::<u32>("date", &raw[4..6])?;
    let day = number::<u32>("date", &raw[6..8])?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| malformed("date", raw))
}

fn parse_time(raw: &str) -> Result<NaiveTime, DecodeError> {
    digits("time", raw)?;
    let hour = number::<u32>("time", &raw[0..2])?;
    let minute = number::<u32>("time", &raw[2..4])?;
    let second = number::<u32>("time", &raw[4..6])?;
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| malformed("time", raw))
}

fn parse_value(raw: &str) -> Result<Decimal, DecodeError> {
    digits("value", raw)?;
    let minor_units = number::<i64>("value", raw)?;
    Ok(Decimal::new(minor_units, 2))
}

fn parse_tax_id(raw: &str) -> Result<TaxId, DecodeError> {
    digits("tax_id", raw)?;
    TaxId::new(raw).map_err(|_| malformed("tax_id", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::encode_record;
    use rust_decimal_macros::dec;

    const SCENARIO_LINE: &str =
        "3201903010000014200096206760174753****3153153453JOÃO MACEDO   BAR DO JOÃO       ";

    fn line_with(field: Range<usize>, replacement: &str) -> String {
        let mut chars: Vec<char> = SCENARIO_LINE.chars().collect();
        chars.splice(field, replacement.chars());
        chars.into_iter().collect()
    }

    #[test]
    fn test_decode_reference_line() {
        let transaction = decode(SCENARIO_LINE).unwrap();

        assert_eq!(transaction.kind.code, 3);
        assert_eq!(transaction.kind.description, "Financing");
        assert_eq!(transaction.date, NaiveDate::from_ymd_opt(2019, 3, 1).unwrap());
        assert_eq!(transaction.value, dec!(142.00));
        assert_eq!(transaction.tax_id.as_str(), "09620676017");
        assert_eq!(transaction.card, "4753****3153");
        assert_eq!(transaction.time, NaiveTime::from_hms_opt(15, 34, 53).unwrap());
        assert_eq!(transaction.store_owner, "JOÃO MACEDO");
        assert_eq!(transaction.store_name, "BAR DO JOÃO");
    }

    #[test]
    fn test_decode_is_deterministic() {
        assert_eq!(decode(SCENARIO_LINE).unwrap(), decode(SCENARIO_LINE).unwrap());
    }

    #[test]
    fn test_decode_all_catalog_types() {
        for code in 1..=9u8 {
            let line = line_with(layout::TYPE, &code.to_string());
            let transaction = decode(&line).unwrap();
            assert_eq!(transaction.kind.code, code);
        }
    }

    #[test]
    fn test_too_short_line() {
        let short = "3201903010000014200096206760174753****3153153453JOÃO MACEDO";
        assert_eq!(
            decode(short),
            Err(DecodeError::TooShort {
                length: 59,
                minimum: MIN_RECORD_WIDTH
            })
        );
        assert!(matches!(decode(""), Err(DecodeError::TooShort { length: 0, .. })));
    }

    #[test]
    fn test_exact_minimum_width_has_empty_store_name() {
        let line: String = SCENARIO_LINE.chars().take(MIN_RECORD_WIDTH).collect();
        let transaction = decode(&line).unwrap();
        assert_eq!(transaction.store_name, "");
    }

    #[test]
    fn test_unknown_type_code() {
        let line = line_with(layout::TYPE, "0");
        assert_eq!(
            decode(&line),
            Err(DecodeError::UnknownType {
                code: "0".to_string()
            })
        );
        assert!(matches!(
            decode(&line_with(layout::TYPE, "X")),
            Err(DecodeError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_malformed_fields() {
        let cases = [
            (layout::DATE, "20190230", "date"),
            (layout::DATE, "2019-3-1", "date"),
            (layout::VALUE, "00000142.0", "value"),
            (layout::TAX_ID, "0962067601X", "tax_id"),
            (layout::TIME, "246000", "time"),
            (layout::TIME, "15 34 ", "time"),
        ];

        for (range, replacement, field) in cases {
            let line = line_with(range, replacement);
            match decode(&line) {
                Err(DecodeError::MalformedField { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected malformed {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_card_is_kept_verbatim() {
        let line = line_with(layout::CARD, " 4753**3153 ");
        assert_eq!(decode(&line).unwrap().card, " 4753**3153 ");
    }

    #[test]
    fn test_special_characters_in_names() {
        let line = line_with(48..SCENARIO_LINE.chars().count(), "JOSÉ & MARIA  CAFÉ DO JOÃO     ");
        let transaction = decode(&line).unwrap();
        assert_eq!(transaction.store_owner, "JOSÉ & MARIA");
        assert_eq!(transaction.store_name, "CAFÉ DO JOÃO");
    }

    #[test]
    fn test_decode_encoded_record() {
        let decoded = decode(SCENARIO_LINE).unwrap();
        assert_eq!(decode(&encode_record(&decoded)).unwrap(), decoded);
    }
}
