use crate::utils::error::TaxIdError;
use serde::Serialize;
use std::fmt;

pub const TAX_ID_LENGTH: usize = 11;

const FIRST_PASS_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const SECOND_PASS_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

/// 11 位數的納稅人識別碼。
///
/// 建構時只拒絕空白字串；長度與檢查碼由驗證規則負責。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaxId(String);

impl TaxId {
    pub fn new(value: impl Into<String>) -> Result<Self, TaxIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(TaxIdError::Blank);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `DDD.DDD.DDD-DD`, or `None` when the value is not exactly 11 ASCII digits.
    pub fn formatted(&self) -> Option<String> {
        let v = &self.0;
        if !is_eleven_digits(v) {
            return None;
        }
        Some(format!("{}.{}.{}-{}", &v[..3], &v[3..6], &v[6..9], &v[9..]))
    }

    pub fn has_valid_check_digits(&self) -> bool {
        is_valid(&self.0)
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formatted() {
            Some(formatted) => f.write_str(&formatted),
            None => f.write_str(&self.0),
        }
    }
}

impl Serialize for TaxId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn is_eleven_digits(value: &str) -> bool {
    value.len() == TAX_ID_LENGTH && value.bytes().all(|b| b.is_ascii_digit())
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Computes the two modulo-11 check digits for a 9-digit base.
pub fn check_digits(base: &[u32; 9]) -> (u32, u32) {
    let first = check_digit(base, &FIRST_PASS_WEIGHTS);

    let mut extended = [0u32; 10];
    extended[..9].copy_from_slice(base);
    extended[9] = first;
    let second = check_digit(&extended, &SECOND_PASS_WEIGHTS);

    (first, second)
}

/// True when `value` is 11 digits whose last two match the computed check digits.
pub fn is_valid(value: &str) -> bool {
    if !is_eleven_digits(value) {
        return false;
    }

    let digits: Vec<u32> = value.bytes().map(|b| u32::from(b - b'0')).collect();
    let mut base = [0u32; 9];
    base.copy_from_slice(&digits[..9]);

    let (first, second) = check_digits(&base);
    digits[9] == first && digits[10] == second
}
