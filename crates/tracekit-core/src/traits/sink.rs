//! Write boundary: where index rows go.

use std::io::Write;
use std::sync::Mutex;

use crate::errors::SinkError;
use crate::types::IndexRow;

/// Receives exported traceability index rows.
pub trait IndexSink {
    fn write_rows(&self, rows: &[IndexRow]) -> Result<(), SinkError>;
}

/// Writes one JSON object per line using the schema field names.
pub struct JsonLinesSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|e| SinkError::Write {
            message: e.to_string(),
        })
    }
}

impl<W: Write> IndexSink for JsonLinesSink<W> {
    fn write_rows(&self, rows: &[IndexRow]) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|e| SinkError::Write {
            message: e.to_string(),
        })?;
        for row in rows {
            serde_json::to_writer(&mut *writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Collects rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<IndexRow>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<IndexRow> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl IndexSink for MemorySink {
    fn write_rows(&self, rows: &[IndexRow]) -> Result<(), SinkError> {
        let mut guard = self.rows.lock().map_err(|e| SinkError::Write {
            message: e.to_string(),
        })?;
        guard.extend_from_slice(rows);
        Ok(())
    }
}
