//! CSV row sink.
//!
//! Buffered `csv::Writer` over the run's output file. The header is
//! written on create; rows are appended in the order handed in and
//! flushed by `finish`.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::Writer;

const WRITE_BUFFER_SIZE: usize = 8192;

/// Error writing the CSV file.
#[derive(Debug)]
pub enum SinkError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(e) => write!(f, "CSV: {e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<csv::Error> for SinkError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Buffered CSV writer with a fixed header.
pub struct CsvSink {
    writer: Writer<BufWriter<File>>,
    path: PathBuf,
    rows_written: usize,
}

impl CsvSink {
    /// Create the output file and write the header row.
    pub fn create(path: &Path, columns: &[&str]) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        let mut writer = Writer::from_writer(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file));
        writer.write_record(columns)?;
        log::debug!("created CSV file: {}", path.display());
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    /// Append one row. Fields must match the header's column order.
    pub fn write_row<I, T>(&mut self, row: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Rows appended so far, excluding the header.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered rows and close the file, returning its path.
    pub fn finish(mut self) -> Result<PathBuf, SinkError> {
        self.writer.flush()?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COLUMNS: [&str; 3] = ["id", "name", "email"];

    #[test]
    fn header_written_on_create() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::create(&path, &COLUMNS).unwrap();
        sink.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,name,email\n");
    }

    #[test]
    fn rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path, &COLUMNS).unwrap();
        sink.write_row(["1", "Ada", "ada@example.com"]).unwrap();
        sink.write_row(["2", "Grace", "grace@example.com"]).unwrap();
        assert_eq!(sink.rows_written(), 2);
        sink.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id,name,email",
                "1,Ada,ada@example.com",
                "2,Grace,grace@example.com"
            ]
        );
    }

    #[test]
    fn empty_fields_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path, &COLUMNS).unwrap();
        sink.write_row(["3", "", ""]).unwrap();
        sink.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("3,,\n"));
    }

    #[test]
    fn create_fails_on_missing_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = CsvSink::create(&path, &COLUMNS);
        assert!(matches!(result, Err(SinkError::Io(_))));
    }
}
