use crate::utils::error::CatalogError;
use rust_decimal::Decimal;
use serde::Serialize;

/// 交易性質：收入或支出，決定金額在餘額中的正負號。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Nature {
    pub fn sign(self) -> Sign {
        match self {
            Nature::Income => Sign::Plus,
            Nature::Expense => Sign::Minus,
        }
    }

    /// Applies this nature's sign to a non-negative amount.
    pub fn signed(self, value: Decimal) -> Decimal {
        match self.sign() {
            Sign::Plus => value,
            Sign::Minus => -value,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TransactionType {
    pub code: u8,
    pub description: &'static str,
    pub nature: Nature,
}

impl TransactionType {
    pub fn sign(&self) -> Sign {
        self.nature.sign()
    }
}

// 以描述序列化，與對外的交易輸出格式一致
impl Serialize for TransactionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.description)
    }
}

const fn entry(code: u8, description: &'static str, nature: Nature) -> TransactionType {
    TransactionType {
        code,
        description,
        nature,
    }
}

static CATALOG: [TransactionType; 9] = [
    entry(1, "Debit", Nature::Income),
    entry(2, "Boleto", Nature::Expense),
    entry(3, "Financing", Nature::Expense),
    entry(4, "Credit", Nature::Income),
    entry(5, "Loan Receipt", Nature::Income),
    entry(6, "Sales", Nature::Income),
    entry(7, "TED Receipt", Nature::Income),
    entry(8, "DOC Receipt", Nature::Income),
    entry(9, "Rent", Nature::Expense),
];

/// Looks up a transaction type by its numeric code.
pub fn lookup(code: u8) -> Result<&'static TransactionType, CatalogError> {
    CATALOG
        .iter()
        .find(|t| t.code == code)
        .ok_or(CatalogError::NotFound { code })
}

pub fn all() -> &'static [TransactionType] {
    &CATALOG
}
