use crate::domain::model::Transaction;
use crate::domain::ports::BulkWriter;
use crate::utils::error::WriteError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keeps every written batch in memory so tests can inspect what was flushed.
#[derive(Debug, Clone, Default)]
pub struct MemoryBulkWriter {
    batches: Arc<Mutex<Vec<Vec<Transaction>>>>,
}

impl MemoryBulkWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn batch_sizes(&self) -> Vec<usize> {
        let batches = self.batches.lock().await;
        batches.iter().map(Vec::len).collect()
    }

    pub async fn len(&self) -> usize {
        let batches = self.batches.lock().await;
        batches.iter().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        let batches = self.batches.lock().await;
        batches.iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl BulkWriter for MemoryBulkWriter {
    async fn write(&mut self, batch: Vec<Transaction>) -> Result<(), WriteError> {
        let mut batches = self.batches.lock().await;
        batches.push(batch);
        Ok(())
    }
}
