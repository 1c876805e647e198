use crate::domain::ports::FailedRecordSink;
use crate::utils::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes rejected lines as `line,reason,raw` CSV rows.
///
/// Write errors are logged and otherwise ignored; the import never depends
/// on this file. Buffered rows are flushed when the sink is dropped.
pub struct CsvFailedRecordSink<W: Write> {
    writer: csv::Writer<W>,
    broken: bool,
}

impl CsvFailedRecordSink<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(File::create(path)?)
    }
}

impl<W: Write> CsvFailedRecordSink<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(["line", "reason", "raw"])?;
        Ok(Self {
            writer,
            broken: false,
        })
    }

    pub fn into_inner(mut self) -> Option<W> {
        self.writer.flush().ok()?;
        self.writer.into_inner().ok()
    }
}

impl<W: Write + Send> FailedRecordSink for CsvFailedRecordSink<W> {
    fn reject(&mut self, line_number: u64, raw: &str, reason: &str) {
        if self.broken {
            return;
        }

        let line = line_number.to_string();
        if let Err(e) = self.writer.write_record([line.as_str(), reason, raw]) {
            // 只警告一次，之後的失敗記錄直接略過
            tracing::warn!("Failed-record file is no longer writable: {}", e);
            self.broken = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_lines_are_written() {
        let mut sink = CsvFailedRecordSink::new(Vec::new()).unwrap();
        sink.reject(2, "320190301", "record too short: 9 characters, at least 62 required");
        sink.reject(5, "0,x", "unknown transaction type code '0'");

        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "line,reason,raw");
        assert!(lines[1].starts_with("2,record too short"));
        assert!(lines[2].ends_with(",\"0,x\""));
    }

    #[test]
    fn test_create_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("failed.csv");
        {
            let mut sink = CsvFailedRecordSink::create(&path).unwrap();
            sink.reject(1, "bad", "reason");
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("1,reason,bad"));
    }
}
