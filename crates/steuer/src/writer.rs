//! Line-delimited JSON output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::types::{Field, TaxError, TaxOutcome, TaxResult};

/// Output file written when no other path is configured.
pub const DEFAULT_OUTPUT: &str = "steuer.jsonl";

/// Writes one compact JSON object per line.
pub struct JsonlWriter<W: Write> {
    writer: W,
    written: usize,
}

impl JsonlWriter<File> {
    /// Create or truncate `path`. Lines go straight to the file, unbuffered.
    pub fn create(path: &Path) -> TaxOutcome<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Append one record followed by a newline.
    ///
    /// Non-finite values are refused: JSON would carry them as `null`.
    pub fn write_record(&mut self, record: &TaxResult) -> TaxOutcome<()> {
        if let Some(field) = Field::ALL
            .into_iter()
            .find(|f| !record.get(*f).is_finite())
        {
            return Err(TaxError::Serialize(<serde_json::Error as serde::ser::Error>::custom(format!(
                "{field} is {}, not a finite number",
                record.get(field)
            ))));
        }
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush the inner writer and hand it back.
    pub fn finish(mut self) -> TaxOutcome<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write `results` to `path`, one line each, in order.
///
/// Stops at the first failure. Returns the number of records written.
pub fn write_results(path: &Path, results: &[TaxResult]) -> TaxOutcome<usize> {
    let mut writer = JsonlWriter::create(path)?;
    for record in results {
        writer.write_record(record)?;
    }
    let written = writer.written();
    writer.finish()?;
    tracing::info!("Wrote {written} records to {}", path.display());
    Ok(written)
}
