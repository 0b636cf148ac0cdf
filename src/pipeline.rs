use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::coerce::{coerce_in_place, to_count};
use crate::filters;
use crate::output;
use crate::readers::{create_reader, detect_format};
use crate::types::{
    Column, Dataset, Record, Result, RunReport, RunSummary, StageReport, COUNT_COLUMNS,
    OUTPUT_COLUMNS,
};

/// Cleaning stages, applied once each in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DropMissingKeys,
    DropNumericBirthPlace,
    DropNationalTotal,
    CoerceCounts,
    DropZeroTotal,
    DropContinentSummaries,
    DropElsewhere,
    DropUnclassifiable,
    DropAggregates,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::DropMissingKeys,
        Stage::DropNumericBirthPlace,
        Stage::DropNationalTotal,
        Stage::CoerceCounts,
        Stage::DropZeroTotal,
        Stage::DropContinentSummaries,
        Stage::DropElsewhere,
        Stage::DropUnclassifiable,
        Stage::DropAggregates,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::DropMissingKeys => "missing_keys",
            Stage::DropNumericBirthPlace => "numeric_birth_place",
            Stage::DropNationalTotal => "national_total",
            Stage::CoerceCounts => "coerce_counts",
            Stage::DropZeroTotal => "zero_total",
            Stage::DropContinentSummaries => "continent_summaries",
            Stage::DropElsewhere => "elsewhere",
            Stage::DropUnclassifiable => "unclassifiable",
            Stage::DropAggregates => "aggregates",
        }
    }

    /// Apply the stage to the whole dataset; returns the rows removed
    pub fn apply(self, dataset: &mut Dataset) -> usize {
        let area = dataset.index_of(Column::AreaName);
        let birth = dataset.index_of(Column::BirthPlace);

        match self {
            Stage::DropMissingKeys => match (area, birth) {
                (Some(a), Some(b)) => dataset.retain(|r| !r[a].is_empty() && !r[b].is_empty()),
                _ => 0,
            },
            Stage::DropNumericBirthPlace => {
                drop_matching(dataset, birth, filters::is_numeric_header)
            }
            Stage::DropNationalTotal => drop_matching(dataset, area, filters::is_national_total),
            Stage::CoerceCounts => {
                coerce_counts(dataset);
                0
            }
            Stage::DropZeroTotal => match dataset.index_of(Column::Total) {
                Some(total) => dataset.retain(|r| to_count(&r[total]).map_or(false, |n| n > 0)),
                None => 0,
            },
            Stage::DropContinentSummaries => {
                let mut removed = 0;
                for (pattern, re) in filters::continent_filters() {
                    let n = drop_matching(dataset, birth, |b| re.is_match(b));
                    if n > 0 {
                        debug!(pattern, removed = n, "dropped continent summary rows");
                    }
                    removed += n;
                }
                removed
            }
            Stage::DropElsewhere => drop_matching(dataset, birth, filters::is_elsewhere),
            Stage::DropUnclassifiable => drop_matching(dataset, birth, filters::is_unclassifiable),
            Stage::DropAggregates => drop_matching(dataset, birth, filters::is_aggregate),
        }
    }
}

/// Remove records whose rendered cell in `column` satisfies `matches`
fn drop_matching<F>(dataset: &mut Dataset, column: Option<usize>, matches: F) -> usize
where
    F: Fn(&str) -> bool,
{
    match column {
        Some(idx) => dataset.retain(|r: &Record| !matches(&r[idx].render())),
        None => 0,
    }
}

fn coerce_counts(dataset: &mut Dataset) {
    let indices: Vec<usize> = COUNT_COLUMNS
        .iter()
        .filter_map(|c| dataset.index_of(*c))
        .collect();

    let mut recovered = 0usize;
    for record in &mut dataset.records {
        for &idx in &indices {
            if !coerce_in_place(&mut record[idx]) {
                recovered += 1;
            }
        }
    }
    debug!(columns = indices.len(), recovered, "coerced count columns");
}

/// Run every stage in order, recording row accounting per stage
pub fn clean(dataset: &mut Dataset) -> Vec<StageReport> {
    let mut reports = Vec::with_capacity(Stage::ALL.len());

    for stage in Stage::ALL {
        let rows_before = dataset.len();
        let removed = stage.apply(dataset);
        let report = StageReport {
            stage: stage.name().to_string(),
            rows_before,
            removed,
        };

        match stage {
            Stage::DropNationalTotal => info!("Removed {} national summary rows", removed),
            Stage::DropZeroTotal => info!("Removed {} zero rows", removed),
            _ => debug!(
                stage = stage.name(),
                removed,
                rows_after = report.rows_after(),
                "stage complete"
            ),
        }

        reports.push(report);
    }

    reports
}

/// Keep the output columns that exist, in output order
pub fn project(dataset: &Dataset) -> Dataset {
    let keep: Vec<(Column, usize)> = OUTPUT_COLUMNS
        .iter()
        .filter_map(|c| dataset.index_of(*c).map(|idx| (*c, idx)))
        .collect();

    Dataset {
        columns: keep.iter().map(|(c, _)| *c).collect(),
        records: dataset
            .records
            .iter()
            .map(|r| keep.iter().map(|(_, idx)| r[*idx].clone()).collect())
            .collect(),
    }
}

/// Load the input table
pub fn load(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let mut reader = create_reader(path, sheet)?;
    let dataset = reader.read()?;
    info!("Read {} rows", dataset.len());
    Ok(dataset)
}

/// Load, clean and project, without touching the output location
pub fn clean_file(path: &Path, sheet: Option<&str>) -> Result<(Dataset, RunSummary)> {
    let mut dataset = load(path, sheet)?;
    let rows_read = dataset.len();

    let stages = clean(&mut dataset);
    let projected = project(&dataset);

    let summary = RunSummary {
        rows_read,
        stages,
        rows_written: projected.len(),
        columns: projected.columns.iter().map(|c| c.name().to_string()).collect(),
    };

    Ok((projected, summary))
}

/// Options for a full cleaning run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheet: Option<String>,
    pub report: Option<PathBuf>,
}

/// Clean the input and write the output file (and the report, if requested)
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let (dataset, summary) = clean_file(&options.input, options.sheet.as_deref())?;

    if dataset.is_empty() {
        warn!("No rows survived cleaning; writing header only");
    }
    output::write_csv_file(&dataset, &options.output)?;
    info!(
        "Done! Saved {} rows to {}",
        summary.rows_written,
        options.output.display()
    );
    info!("Columns: {:?}", summary.columns);

    if let Some(report_path) = &options.report {
        let report = build_report(options, &summary)?;
        output::write_json_file(&report, report_path)?;
        info!("Run report written to: {}", report_path.display());
    }

    Ok(summary)
}

fn build_report(options: &RunOptions, summary: &RunSummary) -> Result<RunReport> {
    let input_file = options
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(RunReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        input_file,
        input_hash: compute_file_hash(&options.input)?,
        format: detect_format(&options.input)?,
        sheet: options.sheet.clone(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        output_file: options.output.display().to_string(),
        summary: summary.clone(),
    })
}

/// Compute SHA-256 hash of a file (streaming to handle large files)
fn compute_file_hash(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const HEADER: &str = "Table D-01 Migrants by place of birth\n\
        Table,State,District,Area Name,Birth place,Persons\n\
        ,,,,,Total\n\
        1,2,3,4,5,6,7,8,9,10,11,12,13,14\n";

    fn census_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{}{}", HEADER, body).unwrap();
        file
    }

    fn row(area: &str, birth: &str, total: &str) -> String {
        format!(
            "D0101,27,000,{},{},{},1,1,0,0,0,0,0,0\n",
            area, birth, total
        )
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn small_dataset(rows: &[(&str, &str, Cell)]) -> Dataset {
        let mut dataset = Dataset::with_width(6);
        dataset.records = rows
            .iter()
            .map(|(area, birth, total)| {
                vec![
                    text("D01"),
                    text("27"),
                    text("000"),
                    text(area),
                    text(birth),
                    total.clone(),
                ]
            })
            .collect();
        dataset
    }

    fn birth_places(dataset: &Dataset) -> Vec<String> {
        let idx = dataset.index_of(Column::BirthPlace).unwrap();
        dataset
            .records
            .iter()
            .map(|r| r[idx].render().into_owned())
            .collect()
    }

    #[test]
    fn test_numeric_birth_place_removed() {
        let mut dataset = small_dataset(&[
            ("Pune", "12", Cell::Int(5)),
            ("Pune", "Goa", Cell::Int(5)),
        ]);
        let mut numeric = small_dataset(&[("Pune", "", Cell::Int(5))]);
        numeric.records[0][4] = Cell::Float(12.0);
        dataset.records.extend(numeric.records);

        assert_eq!(Stage::DropNumericBirthPlace.apply(&mut dataset), 2);
        assert_eq!(birth_places(&dataset), vec!["Goa"]);
    }

    #[test]
    fn test_padded_india_removed() {
        let mut dataset = small_dataset(&[
            (" india ", "Goa", Cell::Int(5)),
            ("Indore", "Goa", Cell::Int(5)),
        ]);
        assert_eq!(Stage::DropNationalTotal.apply(&mut dataset), 1);
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_missing_keys_removed() {
        let mut dataset = small_dataset(&[
            ("Pune", "Goa", Cell::Int(5)),
            ("Pune", "Goa", Cell::Int(5)),
            ("Pune", "Goa", Cell::Int(5)),
        ]);
        dataset.records[0][3] = Cell::Empty;
        dataset.records[1][4] = Cell::Empty;
        assert_eq!(Stage::DropMissingKeys.apply(&mut dataset), 2);
    }

    #[test]
    fn test_invalid_total_coerced_then_removed() {
        let mut dataset = small_dataset(&[
            ("Pune", "Goa", text("N/A")),
            ("Pune", "Kerala", text("1500")),
        ]);
        Stage::CoerceCounts.apply(&mut dataset);
        assert_eq!(dataset.records[0][5], Cell::Int(0));
        assert_eq!(dataset.records[1][5], Cell::Int(1500));

        assert_eq!(Stage::DropZeroTotal.apply(&mut dataset), 1);
        assert_eq!(birth_places(&dataset), vec!["Kerala"]);
    }

    #[test]
    fn test_continent_summary_any_casing() {
        let mut dataset = small_dataset(&[
            ("Pune", "Countries in Europe", Cell::Int(5)),
            ("Pune", "COUNTRIES IN AFRICA", Cell::Int(5)),
            ("Pune", "countries in oceania", Cell::Int(5)),
            ("Pune", "France", Cell::Int(5)),
        ]);
        assert_eq!(Stage::DropContinentSummaries.apply(&mut dataset), 3);
        assert_eq!(birth_places(&dataset), vec!["France"]);
    }

    #[test]
    fn test_born_in_removed_by_aggregate_filter() {
        let mut dataset = small_dataset(&[("Mumbai", "Born in this district", text("1500"))]);
        let reports = clean(&mut dataset);

        assert!(dataset.is_empty());
        let aggregate = reports.last().unwrap();
        assert_eq!(aggregate.stage, "aggregates");
        assert_eq!(aggregate.removed, 1);
    }

    #[test]
    fn test_missing_optional_column_skipped() {
        let mut dataset = small_dataset(&[("Pune", "Goa", Cell::Int(5))]);
        assert_eq!(dataset.index_of(Column::Male), None);
        Stage::CoerceCounts.apply(&mut dataset);

        let projected = project(&dataset);
        assert_eq!(
            projected.columns,
            vec![Column::AreaName, Column::BirthPlace, Column::Total]
        );
    }

    #[test]
    fn test_clean_file_end_to_end() {
        let mut body = String::new();
        body.push_str(&row("INDIA", "Total", "100000"));
        body.push_str(&row(" india ", "Maharashtra", "900"));
        body.push_str(&row("Pune", "12", "9"));
        body.push_str(&row("Pune", "Maharashtra", "500"));
        body.push_str(&row("Pune", "Goa", "N/A"));
        body.push_str(&row("Pune", "Countries in Europe", "40"));
        body.push_str(&row("Pune", "Elsewhere", "30"));
        body.push_str(&row("Pune", "Unclassifiable", "20"));
        body.push_str(&row("Mumbai", "Born in this district", "1500"));
        body.push_str(&row("Mumbai", "States in India beyond the state", "70"));
        body.push_str(&row("Mumbai", "Kerala", "12.0"));
        body.push_str(",,,,Goa,5\n");
        let file = census_csv(&body);

        let (dataset, summary) = clean_file(file.path(), None).unwrap();

        assert_eq!(summary.rows_read, 12);
        assert_eq!(summary.rows_written, 2);
        assert_eq!(birth_places(&dataset), vec!["Maharashtra", "Kerala"]);
        assert_eq!(
            summary.columns,
            vec![
                "Area Name",
                "Birth place",
                "Total",
                "Male",
                "Female",
                "Rural_Total",
                "Urban_Total"
            ]
        );

        // Row counts never grow between stages
        let mut rows = summary.rows_read;
        for stage in &summary.stages {
            assert_eq!(stage.rows_before, rows);
            rows = stage.rows_after();
        }
        assert_eq!(rows, summary.rows_written);
    }

    #[test]
    fn test_output_invariants_hold() {
        let mut body = String::new();
        for (area, birth, total) in [
            ("Pune", "Maharashtra", "500"),
            ("India", "Goa", "7"),
            ("Nagpur", "Karnataka", "0"),
            ("Nagpur", "Gujarat", "-4"),
            ("Nagpur", "Last residence", "4"),
            ("Nashik", "Nepal", "33"),
        ] {
            body.push_str(&row(area, birth, total));
        }
        let file = census_csv(&body);
        let (dataset, _) = clean_file(file.path(), None).unwrap();

        let area = dataset.index_of(Column::AreaName).unwrap();
        let birth = dataset.index_of(Column::BirthPlace).unwrap();
        let total = dataset.index_of(Column::Total).unwrap();
        assert_eq!(dataset.len(), 2);
        for record in &dataset.records {
            assert!(!filters::is_national_total(&record[area].render()));
            let place = record[birth].render();
            assert!(!filters::is_aggregate(&place));
            assert!(!filters::is_numeric_header(&place));
            match &record[total] {
                Cell::Int(n) => assert!(*n > 0),
                other => panic!("total not coerced: {:?}", other),
            }
        }
    }

    #[test]
    fn test_run_writes_output_and_report() {
        let file = census_csv(&row("Pune", "Maharashtra", "500"));
        let dir = tempdir().unwrap();
        let options = RunOptions {
            input: file.path().to_path_buf(),
            output: dir.path().join("public").join("cleaned.csv"),
            sheet: None,
            report: Some(dir.path().join("report.json")),
        };

        let summary = run(&options).unwrap();
        assert_eq!(summary.rows_written, 1);

        let written = std::fs::read_to_string(&options.output).unwrap();
        assert_eq!(
            written,
            "Area Name,Birth place,Total,Male,Female,Rural_Total,Urban_Total\n\
             Pune,Maharashtra,500,1,1,0,0\n"
        );

        let report: RunReport =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(report.input_hash.len(), 64);
        assert_eq!(report.summary.rows_written, 1);
    }

    #[test]
    fn test_well_formed_row_survives_with_projected_columns() {
        let file = census_csv("D0101,27,000,Pune,Maharashtra,500,260,240,300,150,150,200,110,90\n");
        let dir = tempdir().unwrap();
        let options = RunOptions {
            input: file.path().to_path_buf(),
            output: dir.path().join("cleaned.csv"),
            sheet: None,
            report: None,
        };

        let summary = run(&options).unwrap();
        assert_eq!(summary.rows_written, 1);

        let written = std::fs::read_to_string(&options.output).unwrap();
        assert_eq!(
            written,
            "Area Name,Birth place,Total,Male,Female,Rural_Total,Urban_Total\n\
             Pune,Maharashtra,500,260,240,300,200\n"
        );
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let mut body = row("Pune", "Maharashtra", "500");
        body.push_str(&row("Pune", "\"Goa, Daman\"", "12"));
        let file = census_csv(&body);
        let dir = tempdir().unwrap();
        let options = RunOptions {
            input: file.path().to_path_buf(),
            output: dir.path().join("cleaned.csv"),
            sheet: None,
            report: None,
        };

        run(&options).unwrap();
        let first = std::fs::read(&options.output).unwrap();
        run(&options).unwrap();
        let second = std::fs::read(&options.output).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_file_hash() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "test content").unwrap();

        let hash = compute_file_hash(file.path()).unwrap();
        assert_eq!(hash.len(), 64); // SHA-256 produces 64 hex chars
    }
}
