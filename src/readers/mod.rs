pub mod csv;
pub mod excel;

use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::types::{Cell, Column, Dataset, FileFormat, Result, INPUT_COLUMNS, SKIP_ROWS};

/// Common trait for census table readers
pub trait DataReader {
    /// Read the data rows below the fixed header block, bound to column names
    fn read(&mut self) -> Result<Dataset>;
}

/// Detect the input format from the file extension
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    FileFormat::from_extension(ext).ok_or_else(|| {
        Error::UnsupportedFormat(format!("Unsupported file extension: .{}", ext))
    })
}

/// Create a reader for the given file path
pub fn create_reader(path: &Path, sheet: Option<&str>) -> Result<Box<dyn DataReader>> {
    match detect_format(path)? {
        FileFormat::Csv => Ok(Box::new(csv::CsvReader::new(path)?)),
        FileFormat::Tsv => Ok(Box::new(csv::CsvReader::new_tsv(path)?)),
        FileFormat::Excel => Ok(Box::new(excel::ExcelReader::new(path, sheet)?)),
    }
}

/// Columns a dataset cannot be cleaned without
const REQUIRED_COLUMNS: [Column; 3] = [Column::AreaName, Column::BirthPlace, Column::Total];

/// Bind raw sheet rows (sheet row 1 first) to a dataset.
///
/// The first `SKIP_ROWS` rows are dropped. Width is the widest remaining row;
/// shorter rows are padded with empty cells.
pub fn bind_rows(rows: Vec<Vec<Cell>>) -> Result<Dataset> {
    let data: Vec<Vec<Cell>> = rows.into_iter().skip(SKIP_ROWS).collect();
    let width = data.iter().map(Vec::len).max().unwrap_or(0);

    if width > INPUT_COLUMNS.len() {
        return Err(Error::TooManyColumns {
            found: width,
            max: INPUT_COLUMNS.len(),
        });
    }

    let mut dataset = Dataset::with_width(width);
    for column in REQUIRED_COLUMNS {
        if dataset.index_of(column).is_none() {
            return Err(Error::MissingColumn(column.name()));
        }
    }

    dataset.records = data
        .into_iter()
        .map(|mut row| {
            row.resize(width, Cell::Empty);
            row
        })
        .collect();

    debug!(width, rows = dataset.len(), "bound input columns");
    Ok(dataset)
}
