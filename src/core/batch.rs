use crate::domain::model::Transaction;
use crate::domain::ports::BulkWriter;
use crate::utils::error::WriteError;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// 累積已驗證的交易，滿批時交給 BulkWriter。
///
/// 最多只持有一批交易；寫入錯誤直接往上傳，不重試也不跳過。
pub struct BatchAccumulator<W: BulkWriter> {
    writer: W,
    batch: Vec<Transaction>,
    threshold: usize,
    flushes: u64,
    persisted: u64,
}

impl<W: BulkWriter> BatchAccumulator<W> {
    pub fn new(writer: W, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            writer,
            batch: Vec::with_capacity(threshold),
            threshold,
            flushes: 0,
            persisted: 0,
        }
    }

    /// Adds a transaction. Returns `Ok(true)` when this push filled the batch
    /// and it was flushed.
    pub async fn push(&mut self, transaction: Transaction) -> Result<bool, WriteError> {
        self.batch.push(transaction);
        if self.batch.len() >= self.threshold {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Hands the pending batch to the writer. Empty batches never reach it.
    pub async fn flush(&mut self) -> Result<(), WriteError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let batch = std::mem::replace(&mut self.batch, Vec::with_capacity(self.threshold));
        let size = batch.len() as u64;
        self.writer.write(batch).await?;

        self.flushes += 1;
        self.persisted += size;
        tracing::debug!("Flushed batch #{} ({} records)", self.flushes, size);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Records written by completed flushes.
    pub fn persisted(&self) -> u64 {
        self.persisted
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Drops any unflushed records and zeroes the counters.
    pub fn reset(&mut self) {
        self.batch.clear();
        self.flushes = 0;
        self.persisted = 0;
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBulkWriter;
    use crate::domain::tax_id::TaxId;
    use crate::domain::transaction_type;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn transaction() -> Transaction {
        Transaction {
            kind: transaction_type::lookup(6).unwrap(),
            date: NaiveDate::from_ymd_opt(2020, 4, 28).unwrap(),
            time: NaiveTime::from_hms_opt(12, 50, 0).unwrap(),
            value: dec!(10.00),
            tax_id: TaxId::new("28584565345").unwrap(),
            card: "3424****8752".to_string(),
            store_owner: "Owner".to_string(),
            store_name: "Store".to_string(),
        }
    }

    async fn fill(count: usize, threshold: usize) -> MemoryBulkWriter {
        let writer = MemoryBulkWriter::new();
        let mut accumulator = BatchAccumulator::new(writer.clone(), threshold);
        for _ in 0..count {
            accumulator.push(transaction()).await.unwrap();
        }
        accumulator.flush().await.unwrap();
        writer
    }

    #[tokio::test]
    async fn test_batch_boundaries() {
        let n = 4;
        for (count, expected_flushes, last) in [(n - 1, 1, n - 1), (n, 1, n), (n + 1, 2, 1)] {
            let writer = fill(count, n).await;
            let sizes = writer.batch_sizes().await;
            assert_eq!(sizes.len(), expected_flushes, "count {}", count);
            assert_eq!(*sizes.last().unwrap(), last, "count {}", count);
            assert_eq!(writer.len().await, count);
        }
    }

    #[tokio::test]
    async fn test_empty_flush_is_noop() {
        let writer = fill(0, 4).await;
        assert!(writer.batch_sizes().await.is_empty());
    }

    #[tokio::test]
    async fn test_push_reports_flush() {
        let mut accumulator = BatchAccumulator::new(MemoryBulkWriter::new(), 2);
        assert!(!accumulator.push(transaction()).await.unwrap());
        assert!(accumulator.push(transaction()).await.unwrap());
        assert_eq!(accumulator.pending(), 0);
        assert_eq!(accumulator.flushes(), 1);
        assert_eq!(accumulator.persisted(), 2);
    }

    struct BrokenWriter;

    #[async_trait]
    impl BulkWriter for BrokenWriter {
        async fn write(&mut self, _batch: Vec<Transaction>) -> Result<(), WriteError> {
            Err(WriteError::new("disk full"))
        }
    }

    #[tokio::test]
    async fn test_write_error_propagates() {
        let mut accumulator = BatchAccumulator::new(BrokenWriter, 1);
        let error = accumulator.push(transaction()).await.unwrap_err();
        assert_eq!(error.message, "disk full");
        assert_eq!(accumulator.persisted(), 0);
        assert_eq!(accumulator.flushes(), 0);
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        let accumulator = BatchAccumulator::new(MemoryBulkWriter::new(), 0);
        assert_eq!(accumulator.threshold(), 1);
    }
}
