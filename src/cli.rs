use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::RunOptions;
use crate::types::{DEFAULT_INPUT, DEFAULT_OUTPUT};

/// Clean census migration-by-birthplace tables into a display-ready CSV
#[derive(Parser, Debug)]
#[command(name = "census-migration-clean")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input spreadsheet (xlsx, xls, xlsm, xlsb, ods, csv, tsv)
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output CSV file (parent directories are created)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub out: PathBuf,

    /// Worksheet to read (first sheet if not specified)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Write a JSON run report with per-stage row counts
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            input: self.input.clone(),
            output: self.out.clone(),
            sheet: self.sheet.clone(),
            report: self.report.clone(),
        }
    }
}
