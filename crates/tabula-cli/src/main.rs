//! Tabula CLI - workbook assembly tool

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabula::prelude::*;
use tabula::{LogReporter, XlsxReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(
    author,
    version,
    about = "Build XLSX workbooks from CSV, TSV, XLSX and BibTeX files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a BibTeX file to a one-sheet workbook
    Bib {
        /// Input .bib file
        input: PathBuf,

        /// Output .xlsx file
        #[arg(short, long)]
        output: PathBuf,

        /// Name of the sheet (default: BibTeX)
        #[arg(long)]
        sheet_name: Option<String>,

        /// Store Year and Page Count as integers and add a KeywordList column
        #[arg(long)]
        typed: bool,
    },

    /// Merge CSV, TSV and XLSX files into one workbook
    Merge {
        /// Input files, added in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output .xlsx file
        #[arg(short, long)]
        output: PathBuf,

        /// Field delimiter for .csv inputs
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Sheets to take from .xlsx inputs, e.g. "1-3,5" (default: all)
        #[arg(long)]
        sheets: Option<String>,

        /// Sheet name for inputs that produce a single sheet
        #[arg(long)]
        name: Option<String>,
    },

    /// List the sheets of an XLSX file
    Sheets {
        /// Input .xlsx file
        input: PathBuf,

        /// Only list these sheets, e.g. "2-4"
        #[arg(long)]
        sheets: Option<String>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Bib {
            input,
            output,
            sheet_name,
            typed,
        } => convert_bibliography(&input, &output, sheet_name.as_deref(), typed),
        Commands::Merge {
            inputs,
            output,
            delimiter,
            sheets,
            name,
        } => merge(&inputs, &output, delimiter, sheets, name),
        Commands::Sheets { input, sheets } => list_sheets(&input, sheets.as_deref()),
    }
}

/// Log records go to stderr, filtered by `RUST_LOG` (default: warn)
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs every warning and keeps a count for the summary line
#[derive(Default)]
struct CountingReporter {
    count: usize,
}

impl Reporter for CountingReporter {
    fn report(&mut self, warning: ImportWarning) {
        self.count += 1;
        LogReporter.report(warning);
    }
}

fn convert_bibliography(
    input: &Path,
    output: &Path,
    sheet_name: Option<&str>,
    typed: bool,
) -> Result<()> {
    let mut reporter = CountingReporter::default();
    let mut workbook = Workbook::from_bibliography_with(input, sheet_name, &mut reporter)
        .with_context(|| format!("Failed to import '{}'", input.display()))?;

    if typed {
        for sheet in workbook.sheets_mut() {
            sheet.coerce_column_types();
        }
    }

    workbook
        .to_spreadsheet(output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    let entries: usize = workbook.sheets().map(Sheet::row_count).sum();
    eprintln!(
        "Wrote {} entries to '{}' ({} page count warnings)",
        entries,
        output.display(),
        reporter.count
    );
    Ok(())
}

fn merge(
    inputs: &[PathBuf],
    output: &Path,
    delimiter: char,
    sheets: Option<String>,
    name: Option<String>,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }

    let mut import = FileImport::new().delimiter(delimiter as u8);
    import.sheets = sheets;
    import.sheet_name = name;

    let workbook_name = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    let mut workbook = Workbook::new(workbook_name);

    for input in inputs {
        workbook
            .add_from_file(input, &import)
            .with_context(|| format!("Failed to add '{}'", input.display()))?;
    }

    workbook
        .to_spreadsheet(output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    eprintln!("{}", workbook);
    eprintln!("Wrote {} sheets to '{}'", workbook.sheet_count(), output.display());
    Ok(())
}

fn list_sheets(input: &Path, sheets: Option<&str>) -> Result<()> {
    let range = sheets
        .map(RangeSpec::parse)
        .transpose()
        .context("Invalid sheet range")?;

    let mut reader = XlsxReader::open(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    let selected = match &range {
        Some(range) => range.resolve(reader.sheet_count()),
        None => (0..reader.sheet_count()).collect(),
    };

    println!("File: {}", input.display());
    println!("Sheets: {}", reader.sheet_count());
    for index in selected {
        let sheet = reader
            .read_sheet(index)
            .with_context(|| format!("Failed to read sheet {}", index + 1))?;
        println!("  {}. {} ({} rows)", index + 1, sheet.name(), sheet.row_count());
    }

    Ok(())
}
