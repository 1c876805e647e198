use crate::core::pipeline::ImportPipeline;
use crate::domain::model::ImportResult;
use crate::domain::ports::{BulkWriter, SourceStorage};
use crate::utils::error::ImportAborted;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// Opens the input, hands the stream to the pipeline and reports the run.
///
/// The reader is moved into the pipeline, so it is released on every exit
/// path, including fatal aborts.
pub struct ImportEngine<S: SourceStorage> {
    storage: S,
    monitor: SystemMonitor,
}

impl<S: SourceStorage> ImportEngine<S> {
    pub fn new(storage: S) -> Self {
        Self::new_with_monitoring(storage, false)
    }

    pub fn new_with_monitoring(storage: S, monitor_enabled: bool) -> Self {
        Self {
            storage,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run<W: BulkWriter>(
        &self,
        name: &str,
        pipeline: &mut ImportPipeline<W>,
    ) -> Result<ImportResult, ImportAborted> {
        let started = Instant::now();
        tracing::info!("Importing {}", name);
        self.monitor.log_stats("Before import");

        let reader = match self.storage.open(name).await {
            Ok(reader) => reader,
            Err(error) => {
                tracing::error!("Cannot open {}: {}", name, error);
                return Err(ImportAborted {
                    partial: ImportResult::default(),
                    persisted: 0,
                    error,
                });
            }
        };

        let outcome = pipeline.run(reader).await;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(result) => tracing::info!(
                "Import completed for {}: {} successful, {} failed, Total: {} in {}ms",
                name,
                result.success_count,
                result.failed_count,
                result.total_lines,
                elapsed.as_millis()
            ),
            Err(aborted) => tracing::error!(
                "Error importing file {} at line {}: {}",
                name,
                aborted.partial.total_lines,
                aborted.error
            ),
        }

        self.monitor.log_stats("After import");
        self.monitor.log_final_stats();
        outcome
    }
}
