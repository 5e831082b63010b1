//! zxcel CLI - evaluate spreadsheets from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zxcel::prelude::*;
use zxcel::{CsvExport, ERROR_MARKER};

#[derive(Parser)]
#[command(name = "zxcel")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a sheet, recalculate it and print the result
    Eval {
        /// Input file (csv, tsv or json records)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Write formula text instead of computed values (csv/tsv only)
        #[arg(long)]
        formulas: bool,
    },

    /// Show information about a sheet
    Info {
        /// Input file
        input: PathBuf,
    },

    /// Print one cell after recalculation
    Get {
        /// Input file
        input: PathBuf,

        /// Cell reference, e.g. B4
        cell: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Tsv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Eval {
            input,
            output,
            format,
            formulas,
        } => eval(&input, output.as_deref(), format, formulas),
        Commands::Info { input } => show_info(&input),
        Commands::Get { input, cell } => get_cell(&input, &cell),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Load a sheet, choosing the reader from the file extension
fn open(input: &Path) -> Result<Spreadsheet> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let sheet = match extension.as_deref() {
        Some("json") => {
            let text = std::fs::read_to_string(input)
                .with_context(|| format!("Failed to read '{}'", input.display()))?;
            let records: Vec<Vec<CellRecord>> = serde_json::from_str(&text)
                .with_context(|| format!("'{}' is not a list of record rows", input.display()))?;
            Spreadsheet::from_records(records, SheetOptions::default())
        }
        Some("tsv") | Some("tab") => {
            Spreadsheet::open_csv(input, &CsvReadOptions::tsv(), SheetOptions::default())
                .with_context(|| format!("Failed to open '{}'", input.display()))?
        }
        _ => Spreadsheet::open_csv(input, &CsvReadOptions::default(), SheetOptions::default())
            .with_context(|| format!("Failed to open '{}'", input.display()))?,
    };

    Ok(sheet)
}

fn eval(input: &Path, output: Option<&Path>, format: Format, formulas: bool) -> Result<()> {
    let sheet = open(input)?;

    let text = match format {
        Format::Json => serde_json::to_string_pretty(&sheet.to_records())
            .context("Failed to serialize records")?
            + "\n",
        Format::Csv | Format::Tsv => {
            let base = match format {
                Format::Tsv => CsvWriteOptions::tsv(),
                _ => CsvWriteOptions::default(),
            };
            let options = CsvWriteOptions {
                export: if formulas {
                    CsvExport::Formulas
                } else {
                    CsvExport::Values
                },
                ..base
            };
            CsvWriter::write_string(sheet.grid(), &options).context("Failed to write CSV")?
        }
    };

    if let Some(output_path) = output {
        std::fs::write(output_path, &text)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!("Wrote '{}'", output_path.display());
    } else {
        io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let mut sheet = open(input)?;
    let stats = sheet.recalc();
    let (rows, cols) = sheet.grid().dimensions();

    println!("File: {}", input.display());
    println!("Dimensions: {} rows x {} columns", rows, cols);
    match sheet.grid().used_range() {
        Some(range) => println!("Used range: {}", range.to_a1_string()),
        None => println!("Used range: (empty)"),
    }
    println!("Formulas: {}", stats.formula_count);
    println!("Errors: {}", stats.errors);
    println!("Circular references: {}", stats.circular_references);

    Ok(())
}

fn get_cell(input: &Path, reference: &str) -> Result<()> {
    let sheet = open(input)?;
    let cell = sheet
        .cell(reference)
        .with_context(|| format!("No cell '{}' in '{}'", reference, input.display()))?;

    println!("{}", cell.value);
    if let Some(formula) = cell.formula_text() {
        println!("Formula: {}", formula);
    }
    println!("Type: {}", cell.cell_type().code());
    if let CellValue::Error(e) = &cell.value {
        eprintln!("{}: {}", ERROR_MARKER, e.kind());
    }

    Ok(())
}
