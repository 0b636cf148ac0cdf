use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use tracing::debug;

use crate::coerce::text_cell;
use crate::error::Error;
use crate::types::{Cell, Dataset, Result};

use super::{bind_rows, DataReader};

/// Excel file reader (supports .xlsx, .xls, .xlsm, .xlsb, .ods)
pub struct ExcelReader {
    path: PathBuf,
    sheet: Option<String>,
}

impl ExcelReader {
    pub fn new(path: &Path, sheet: Option<&str>) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            sheet: sheet.map(str::to_string),
        })
    }

    /// Convert Excel Data to a cell
    fn data_to_cell(dt: &Data) -> Cell {
        match dt {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => text_cell(s),
            Data::Float(f) => Cell::Float(*f),
            Data::Int(i) => Cell::Int(*i),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(d) => Self::excel_serial_to_cell(d.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => text_cell(s),
        }
    }

    /// Convert an Excel serial date to a date cell
    fn excel_serial_to_cell(serial: f64) -> Cell {
        // Excel epoch is 1899-12-30 (with the 1900 leap year bug)
        let days = serial as i64;
        chrono::NaiveDate::from_ymd_opt(1899, 12, 30)
            .and_then(|base| base.checked_add_signed(chrono::Duration::days(days)))
            .map(Cell::Date)
            .unwrap_or(Cell::Float(serial))
    }

    fn sheet_name(&self, workbook: &Sheets<std::io::BufReader<std::fs::File>>) -> Result<String> {
        let names = workbook.sheet_names();
        match &self.sheet {
            Some(wanted) => names
                .iter()
                .find(|n| *n == wanted)
                .cloned()
                .ok_or_else(|| Error::SheetNotFound(wanted.clone())),
            None => names
                .first()
                .cloned()
                .ok_or_else(|| Error::InvalidInput("Workbook has no sheets".to_string())),
        }
    }
}

impl DataReader for ExcelReader {
    fn read(&mut self) -> Result<Dataset> {
        let mut workbook: Sheets<std::io::BufReader<std::fs::File>> =
            open_workbook_auto(&self.path)?;

        let sheet_name = self.sheet_name(&workbook)?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(Error::Excel)?;

        // The used range may start below row 1 or right of column A; rows
        // are counted from the top of the sheet.
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        debug!(sheet = %sheet_name, start_row, start_col, "reading worksheet");

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            let mut cells: Vec<Cell> = vec![Cell::Empty; start_col];
            cells.extend(row.iter().map(Self::data_to_cell));
            rows.push(cells);
        }

        bind_rows(rows)
    }
}
