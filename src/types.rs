use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sheet rows above the data (title, merged headers, sub-headers)
pub const SKIP_ROWS: usize = 4;

/// Default input workbook, relative to the working directory
pub const DEFAULT_INPUT: &str = "DS-0000-D01-MDDS.XLSX";

/// Default output file consumed by the map front end
pub const DEFAULT_OUTPUT: &str = "react-app/public/Final_Cleaned_Data.csv";

/// Positional layout of the census table
pub const INPUT_COLUMNS: [Column; 14] = [
    Column::TableName,
    Column::State,
    Column::District,
    Column::AreaName,
    Column::BirthPlace,
    Column::Total,
    Column::Male,
    Column::Female,
    Column::RuralTotal,
    Column::RuralMale,
    Column::RuralFemale,
    Column::UrbanTotal,
    Column::UrbanMale,
    Column::UrbanFemale,
];

/// Columns converted to non-negative integers
pub const COUNT_COLUMNS: [Column; 5] = [
    Column::Total,
    Column::Male,
    Column::Female,
    Column::RuralTotal,
    Column::UrbanTotal,
];

/// Columns written to the cleaned file, in order
pub const OUTPUT_COLUMNS: [Column; 7] = [
    Column::AreaName,
    Column::BirthPlace,
    Column::Total,
    Column::Male,
    Column::Female,
    Column::RuralTotal,
    Column::UrbanTotal,
];

/// A named column of the census table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    TableName,
    State,
    District,
    AreaName,
    BirthPlace,
    Total,
    Male,
    Female,
    RuralTotal,
    RuralMale,
    RuralFemale,
    UrbanTotal,
    UrbanMale,
    UrbanFemale,
}

impl Column {
    /// Header name as written to the output file
    pub fn name(self) -> &'static str {
        match self {
            Column::TableName => "TableName",
            Column::State => "State",
            Column::District => "District",
            Column::AreaName => "Area Name",
            Column::BirthPlace => "Birth place",
            Column::Total => "Total",
            Column::Male => "Male",
            Column::Female => "Female",
            Column::RuralTotal => "Rural_Total",
            Column::RuralMale => "Rural_Male",
            Column::RuralFemale => "Rural_Female",
            Column::UrbanTotal => "Urban_Total",
            Column::UrbanMale => "Urban_Male",
            Column::UrbanFemale => "Urban_Female",
        }
    }
}

/// A single spreadsheet value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text form used for pattern matching and output
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Int(i) => Cow::Owned(i.to_string()),
            // f64 Display drops the fraction of integral values: 12.0 -> "12"
            Cell::Float(f) => Cow::Owned(f.to_string()),
            Cell::Bool(true) => Cow::Borrowed("True"),
            Cell::Bool(false) => Cow::Borrowed("False"),
            Cell::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// One input row, positionally bound to `Dataset::columns`
pub type Record = Vec<Cell>;

/// In-memory table flowing through the pipeline
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Bind the leading input column names to `width` positional columns
    pub fn with_width(width: usize) -> Self {
        Self {
            columns: INPUT_COLUMNS[..width.min(INPUT_COLUMNS.len())].to_vec(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn index_of(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Keep only records matching `keep`; returns how many were removed
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Record) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|r| keep(r));
        before - self.records.len()
    }
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Tsv,
    Excel,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(FileFormat::Excel),
            _ => None,
        }
    }
}

/// Row accounting for a single pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub rows_before: usize,
    pub removed: usize,
}

impl StageReport {
    pub fn rows_after(&self) -> usize {
        self.rows_before - self.removed
    }
}

/// Outcome of one cleaning run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub stages: Vec<StageReport>,
    pub rows_written: usize,
    pub columns: Vec<String>,
}

/// JSON report written next to the cleaned file on request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Tool version
    pub version: String,

    /// Input file name (without path)
    pub input_file: String,

    /// Input hash (SHA-256)
    pub input_hash: String,

    pub format: FileFormat,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,

    /// RFC 3339 timestamp
    pub generated_at: String,

    pub output_file: String,

    pub summary: RunSummary,
}

/// Result type for the application
pub type Result<T> = std::result::Result<T, crate::error::Error>;
