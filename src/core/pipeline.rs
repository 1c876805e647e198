use crate::core::batch::{BatchAccumulator, DEFAULT_BATCH_SIZE};
use crate::core::decoder;
use crate::core::summary::SummaryAggregator;
use crate::core::validator::Validator;
use crate::domain::model::{ImportResult, Transaction};
use crate::domain::ports::{BulkWriter, ConfigProvider, FailedRecordSink};
use crate::utils::error::{ImportAborted, ImportError};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub batch_size: usize,
    pub summary: bool,
    pub validate_tax_id: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            summary: false,
            validate_tax_id: false,
        }
    }
}

impl ImportOptions {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            batch_size: config.batch_size(),
            summary: config.summary_enabled(),
            validate_tax_id: config.validate_tax_id(),
        }
    }
}

/// 單行處理結果。解碼與驗證都是純函式，可安全地在多個 task 間平行呼叫。
#[derive(Debug)]
pub enum LineOutcome {
    Blank,
    Accepted(Transaction),
    Rejected(String),
}

/// Strips the line terminator and decodes lossily: invalid UTF-8 bytes become
/// U+FFFD, so a badly encoded record is judged by the decoder instead of
/// failing the stream.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

pub fn classify(validator: &Validator, line: &str) -> LineOutcome {
    if line.trim().is_empty() {
        return LineOutcome::Blank;
    }

    let transaction = match decoder::decode(line) {
        Ok(transaction) => transaction,
        Err(e) => return LineOutcome::Rejected(e.to_string()),
    };

    let validation = validator.validate(&transaction);
    if validation.is_valid() {
        LineOutcome::Accepted(transaction)
    } else {
        LineOutcome::Rejected(validation.reasons.join("; "))
    }
}

/// Drives one file through decode, validate, summarize and batched persistence.
///
/// Per-record failures are counted and logged; stream and write failures end
/// the run with an [`ImportAborted`] that still carries the counts so far.
pub struct ImportPipeline<W: BulkWriter> {
    validator: Validator,
    accumulator: BatchAccumulator<W>,
    summary_enabled: bool,
    failed_sink: Option<Box<dyn FailedRecordSink>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<W: BulkWriter> ImportPipeline<W> {
    pub fn new(writer: W, options: &ImportOptions) -> Self {
        Self {
            validator: Validator::standard(options.validate_tax_id),
            accumulator: BatchAccumulator::new(writer, options.batch_size),
            summary_enabled: options.summary,
            failed_sink: None,
            cancel: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_failed_sink(mut self, sink: impl FailedRecordSink + 'static) -> Self {
        self.failed_sink = Some(Box::new(sink));
        self
    }

    /// Checked only after a completed flush, so a cancelled run never leaves
    /// a half-written batch behind.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn writer(&self) -> &W {
        self.accumulator.writer()
    }

    pub fn into_writer(self) -> W {
        self.accumulator.into_writer()
    }

    pub async fn run<R>(&mut self, mut reader: R) -> Result<ImportResult, ImportAborted>
    where
        R: AsyncBufRead + Unpin,
    {
        self.accumulator.reset();
        let mut result = ImportResult::new(false);
        let mut summary = self.summary_enabled.then(SummaryAggregator::new);
        let started = Instant::now();

        let mut buffer = Vec::with_capacity(256);
        let mut line_number: u64 = 0;

        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(source) => {
                    let error = ImportError::StreamError {
                        line: line_number + 1,
                        source,
                    };
                    return Err(self.abort(result, summary, error));
                }
            }
            line_number += 1;

            let line = decode_line(&buffer);
            if let Cow::Owned(_) = line {
                tracing::warn!("Line {} is not valid UTF-8, invalid bytes replaced", line_number);
            }

            match classify(&self.validator, &line) {
                LineOutcome::Blank => continue,
                LineOutcome::Rejected(reason) => {
                    result.total_lines += 1;
                    result.failed_count += 1;
                    tracing::warn!("Rejected line {}: {}", line_number, reason);
                    if let Some(sink) = self.failed_sink.as_mut() {
                        sink.reject(line_number, &line, &reason);
                    }
                }
                LineOutcome::Accepted(transaction) => {
                    result.total_lines += 1;
                    result.success_count += 1;
                    if let Some(aggregator) = summary.as_mut() {
                        aggregator.record(&transaction);
                    }

                    match self.accumulator.push(transaction).await {
                        Ok(false) => {}
                        Ok(true) => {
                            self.log_progress(started);
                            if self.is_cancelled() {
                                return Err(self.abort(result, summary, ImportError::Cancelled));
                            }
                        }
                        Err(e) => return Err(self.abort(result, summary, e.into())),
                    }
                }
            }
        }

        // 最後一批不足門檻的資料
        if let Err(e) = self.accumulator.flush().await {
            return Err(self.abort(result, summary, e.into()));
        }

        result.summary = summary.map(SummaryAggregator::into_summary);
        Ok(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn log_progress(&self, started: Instant) {
        let elapsed = started.elapsed();
        let seconds = elapsed.as_secs_f64();
        if seconds <= 0.0 {
            return;
        }

        let persisted = self.accumulator.persisted();
        tracing::debug!(
            "Processed: {} | Speed: {:.0} rec/s | Elapsed time: {:?}",
            persisted,
            persisted as f64 / seconds,
            elapsed
        );
    }

    fn abort(
        &self,
        mut partial: ImportResult,
        summary: Option<SummaryAggregator>,
        error: ImportError,
    ) -> ImportAborted {
        partial.summary = summary.map(SummaryAggregator::into_summary);
        let persisted = self.accumulator.persisted();
        tracing::error!(
            "Import aborted at line {} ({} records persisted): {}",
            partial.total_lines,
            persisted,
            error
        );
        ImportAborted {
            partial,
            persisted,
            error,
        }
    }
}
