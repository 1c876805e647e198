pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::adapters::{
    discard::DiscardBulkWriter, failed_records::CsvFailedRecordSink, local::LocalStorage,
    memory::MemoryBulkWriter, sqlite::SqliteBulkWriter,
};
pub use crate::app::ImportJob;
pub use crate::core::{
    engine::ImportEngine,
    pipeline::{ImportOptions, ImportPipeline},
};
pub use crate::domain::model::{ImportResult, Transaction};
pub use crate::utils::error::{ImportAborted, ImportError, Result};
