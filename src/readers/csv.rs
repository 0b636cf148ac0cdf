use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder};

use crate::coerce::text_cell;
use crate::types::{Cell, Dataset, Result};

use super::{bind_rows, DataReader};

/// CSV/TSV file reader for exported census sheets
pub struct CsvReader {
    path: PathBuf,
    delimiter: u8,
}

impl CsvReader {
    /// Create a new CSV reader
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            delimiter: b',',
        })
    }

    /// Create a new TSV reader
    pub fn new_tsv(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            delimiter: b'\t',
        })
    }

    fn create_reader(&self) -> Result<Reader<BufReader<File>>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        // Header rows are skipped positionally, not parsed as names
        let csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Ok(csv_reader)
    }
}

impl DataReader for CsvReader {
    fn read(&mut self) -> Result<Dataset> {
        let mut reader = self.create_reader()?;

        // Blank lines are skipped by the parser; restore them as empty rows so
        // the header skip counts physical sheet rows.
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(line) = record.position().map(|p| p.line() as usize) {
                while rows.len() + 1 < line {
                    rows.push(Vec::new());
                }
            }
            rows.push(record.iter().map(text_cell).collect());
        }

        bind_rows(rows)
    }
}
