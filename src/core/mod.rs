pub mod batch;
pub mod decoder;
pub mod engine;
pub mod layout;
pub mod pipeline;
pub mod report;
pub mod summary;
pub mod validator;

pub use crate::domain::model::{ImportResult, SummaryEntry, Transaction};
pub use crate::domain::ports::{BulkWriter, ConfigProvider, FailedRecordSink, SourceStorage};
pub use crate::utils::error::Result;
