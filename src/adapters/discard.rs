use crate::domain::model::Transaction;
use crate::domain::ports::BulkWriter;
use crate::utils::error::WriteError;
use async_trait::async_trait;

/// 試跑用的寫入端：只計數，每批寫完即丟棄，記憶體不隨檔案大小成長。
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardBulkWriter {
    written: u64,
    batches: u64,
}

impl DiscardBulkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }
}

#[async_trait]
impl BulkWriter for DiscardBulkWriter {
    async fn write(&mut self, batch: Vec<Transaction>) -> Result<(), WriteError> {
        self.written += batch.len() as u64;
        self.batches += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::encode_record;
    use crate::core::pipeline::{ImportOptions, ImportPipeline};
    use crate::domain::tax_id::TaxId;
    use crate::domain::transaction_type;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_counts_without_keeping_records() {
        let line = encode_record(&Transaction {
            kind: transaction_type::lookup(4).unwrap(),
            date: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
            time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            value: dec!(5.00),
            tax_id: TaxId::new("12345678909").unwrap(),
            card: "1111****2222".to_string(),
            store_owner: "ANA SILVA".to_string(),
            store_name: "PADARIA BOM DIA".to_string(),
        });
        let input: String = (0..5000).map(|_| format!("{}\n", line)).collect();

        let options = ImportOptions {
            batch_size: 100,
            ..ImportOptions::default()
        };
        let mut pipeline = ImportPipeline::new(DiscardBulkWriter::new(), &options);
        let result = pipeline.run(input.as_bytes()).await.unwrap();

        assert_eq!(result.success_count, 5000);
        let writer = pipeline.into_writer();
        assert_eq!(writer.written(), 5000);
        assert_eq!(writer.batches(), 50);
    }
}
