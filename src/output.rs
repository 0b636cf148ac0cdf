use std::path::Path;

use csv::{Terminator, WriterBuilder};
use serde::Serialize;

use crate::error::Error;
use crate::types::{Dataset, Result};

/// Serialize a dataset as CSV with a header row and no index column
pub fn to_csv_bytes(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(dataset.columns.iter().map(|c| c.name()))?;
    for record in &dataset.records {
        writer.write_record(record.iter().map(|cell| cell.render().into_owned()))?;
    }

    writer.into_inner().map_err(|e| {
        let err = e.error();
        Error::Io(std::io::Error::new(err.kind(), err.to_string()))
    })
}

/// Write the cleaned dataset, creating parent directories and replacing any
/// previous file. Nothing is written unless serialization succeeds.
pub fn write_csv_file(dataset: &Dataset, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(dataset)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Write a value as pretty JSON
pub fn write_json_file<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
