use crate::adapters::discard::DiscardBulkWriter;
use crate::adapters::failed_records::CsvFailedRecordSink;
use crate::adapters::local::LocalStorage;
use crate::adapters::sqlite::SqliteBulkWriter;
use crate::core::engine::ImportEngine;
use crate::core::pipeline::{ImportOptions, ImportPipeline};
use crate::core::report;
use crate::core::{BulkWriter, ConfigProvider, ImportResult};
use crate::utils::error::{ImportAborted, ImportError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// 將設定組裝成一次完整的匯入：來源檔、寫入端、失敗記錄檔與引擎。
pub struct ImportJob<C: ConfigProvider> {
    config: C,
    dry_run: bool,
    monitor: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl<C: ConfigProvider> ImportJob<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            dry_run: false,
            monitor: false,
            cancel: None,
        }
    }

    /// Dry runs decode and validate everything, then count and drop each batch.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled;
        self
    }

    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn run(&self) -> std::result::Result<ImportResult, ImportAborted> {
        if self.dry_run {
            tracing::info!("🔍 Dry run: records will not be written to the database");
            return self.execute(DiscardBulkWriter::new()).await;
        }

        let writer = SqliteBulkWriter::open(self.config.database_path()).map_err(setup_failure)?;
        tracing::info!("💾 Writing to {}", self.config.database_path());
        self.execute(writer).await
    }

    async fn execute<W: BulkWriter>(
        &self,
        writer: W,
    ) -> std::result::Result<ImportResult, ImportAborted> {
        let options = ImportOptions::from_config(&self.config);
        let mut pipeline = ImportPipeline::new(writer, &options);

        if let Some(path) = self.config.failed_records_path() {
            let sink = CsvFailedRecordSink::create(path).map_err(setup_failure)?;
            tracing::info!("📝 Rejected lines go to {}", path);
            pipeline = pipeline.with_failed_sink(sink);
        }

        if let Some(flag) = &self.cancel {
            pipeline = pipeline.with_cancellation(Arc::clone(flag));
        }

        let (directory, file_name) = split_source(self.config.source_path()).map_err(setup_failure)?;
        let engine = ImportEngine::new_with_monitoring(LocalStorage::new(directory), self.monitor);
        engine.run(&file_name, &mut pipeline).await
    }
}

/// Writes the per-store CSV if requested, then drops the summary from the
/// result unless it was asked for on its own.
pub fn export_summary(
    result: &mut ImportResult,
    summary_csv: Option<&str>,
    keep_summary: bool,
) -> Result<()> {
    if let (Some(path), Some(summary)) = (summary_csv, result.summary.as_ref()) {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        report::write_summary_csv(summary, File::create(path)?)?;
        tracing::info!("📁 Summary saved to: {}", path);
    }

    if !keep_summary {
        result.clear_summary();
    }
    Ok(())
}

fn split_source(source: &str) -> Result<(&Path, String)> {
    let path = Path::new(source);
    let file_name = path
        .file_name()
        .ok_or_else(|| ImportError::InvalidConfigValueError {
            field: "source.path".to_string(),
            value: source.to_string(),
            reason: "Path does not name a file".to_string(),
        })?
        .to_string_lossy()
        .into_owned();
    let directory = path.parent().unwrap_or_else(|| Path::new(""));
    Ok((directory, file_name))
}

fn setup_failure(error: ImportError) -> ImportAborted {
    ImportAborted {
        partial: ImportResult::default(),
        persisted: 0,
        error,
    }
}
