use crate::domain::model::Transaction;
use crate::utils::error::{Result, WriteError};
use async_trait::async_trait;
use tokio::io::AsyncBufRead;

/// Opens input files as forward-only line streams.
pub trait SourceStorage: Send + Sync {
    type Reader: AsyncBufRead + Unpin + Send;

    fn open(&self, name: &str) -> impl std::future::Future<Output = Result<Self::Reader>> + Send;
}

/// 批次寫入持久層。每次呼叫應以單一批量操作完成，而非逐列寫入。
#[async_trait]
pub trait BulkWriter: Send {
    async fn write(&mut self, batch: Vec<Transaction>) -> std::result::Result<(), WriteError>;
}

/// Receives the raw text of rejected lines. Fire-and-forget: implementations
/// must not fail the import.
pub trait FailedRecordSink: Send {
    fn reject(&mut self, line_number: u64, raw: &str, reason: &str);
}

pub trait ConfigProvider: Send + Sync {
    fn source_path(&self) -> &str;
    fn database_path(&self) -> &str;
    fn batch_size(&self) -> usize;
    fn summary_enabled(&self) -> bool;
    fn validate_tax_id(&self) -> bool;
    fn failed_records_path(&self) -> Option<&str>;
}
