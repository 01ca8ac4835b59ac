//! unsheet CLI - header-keyed record extraction from Excel workbooks
//!
//! A command-line tool that turns XLSX sheets into JSON records.

use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use unsheet::extract::extract_sheet;
use unsheet::render::JsonFormat;
use unsheet::{ParseOptions, SkipReason, WorkbookRecords, XlsxReader};

/// Header-keyed record extraction from Excel workbooks
#[derive(Parser)]
#[command(
    name = "unsheet",
    author = "iyulab",
    version,
    about = "Extract header-keyed records from Excel workbooks",
    long_about = "unsheet - Concurrent record extraction from XLSX workbooks.\n\n\
                  Finds the header row of each sheet and converts the rows below it \
                  to JSON records keyed by header."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from a workbook as JSON
    #[command(visible_alias = "records")]
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Sheets processed at once, 0 for unbounded [default: 5]
        #[arg(short = 'j', long, value_name = "N")]
        max_concurrent: Option<usize>,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// List sheets with their row and record counts
    Sheets {
        /// Input file path
        input: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Show version information
    Version,
}

/// Flags controlling record extraction.
#[derive(Args)]
struct ExtractArgs {
    /// Sheet to process (repeatable, default: all sheets)
    #[arg(short, long = "sheet", value_name = "NAME")]
    sheets: Vec<String>,

    /// Header to keep, case-insensitive (repeatable, default: all headers)
    #[arg(short, long = "filter", value_name = "HEADER")]
    filters: Vec<String>,

    /// Rename a header in the output (repeatable)
    #[arg(short, long = "map", value_name = "OLD=NEW", value_parser = parse_mapping)]
    maps: Vec<(String, String)>,

    /// Keep surrounding whitespace in headers and values
    #[arg(long)]
    no_trim: bool,

    /// Keep fields whose value is empty
    #[arg(long)]
    keep_empty: bool,

    /// Use the first row as the header instead of searching for it
    #[arg(long)]
    no_detect: bool,

    /// Rows scanned when searching for the header [default: 50]
    #[arg(long, value_name = "N")]
    scan_limit: Option<usize>,

    /// JSON options file; flags given here add to or override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl ExtractArgs {
    /// Build parse options from the config file (or CLI defaults) and flags.
    fn to_options(&self) -> Result<ParseOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => ParseOptions::from_path(path)?,
            None => ParseOptions::new()
                .with_trim_space(true)
                .with_skip_empty(true)
                .with_header_detection(true)
                .with_scan_limit(50)
                .with_max_concurrent_sheets(5),
        };

        options.sheet_names.extend(self.sheets.iter().cloned());
        options.header_filter.extend(self.filters.iter().cloned());
        for (from, to) in &self.maps {
            options = options.with_header_rename(from, to);
        }

        if self.no_trim {
            options.trim_space = false;
        }
        if self.keep_empty {
            options.skip_empty = false;
        }
        if self.no_detect {
            options.header_row_auto_detect = false;
        }
        if let Some(limit) = self.scan_limit {
            options.header_row_scan_limit = limit;
        }

        Ok(options)
    }
}

/// Sheets to list: the requested ones in the given order, or every sheet.
fn selected_sheets(workbook_sheets: Vec<&str>, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        workbook_sheets.into_iter().map(String::from).collect()
    } else {
        requested.to_vec()
    }
}

fn parse_mapping(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((from, to)) if !from.is_empty() => Ok((from.to_string(), to.to_string())),
        _ => Err(format!("expected OLD=NEW, got '{}'", s)),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Json {
            input,
            output,
            compact,
            max_concurrent,
            extract,
        } => {
            let mut options = extract.to_options()?;
            if let Some(max) = max_concurrent {
                options.max_concurrent_sheets = max;
            }
            log::debug!("extracting {} with {:?}", input.display(), options);

            let pb = create_spinner("Extracting records...");

            let records = unsheet::parse_file(&input, &options)?;
            pb.set_message("Rendering to JSON...");

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = unsheet::render::to_json(&records, format)?;

            pb.finish_and_clear();
            report_skipped(&records);
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Extracted {} records from {} sheets: {}",
                    "✓".green().bold(),
                    records.total_records(),
                    records.sheets.len(),
                    path.display()
                );
            }
        }

        Commands::Sheets { input, extract } => {
            let options = extract.to_options()?;
            let pb = create_spinner("Reading workbook...");

            let reader = XlsxReader::open(&input)?;

            pb.finish_and_clear();

            println!("{}", "Sheets".cyan().bold());
            println!("{}", "─".repeat(40));
            for name in selected_sheets(reader.sheet_names(), &options.sheet_names) {
                let name = name.as_str();
                match reader.read_sheet(name) {
                    Ok(rows) => {
                        let count = extract_sheet(name, &rows, &options)
                            .map_or(0, |result| result.record_count);
                        println!(
                            "{}: {} rows, {} records",
                            name.bold(),
                            rows.len(),
                            count
                        );
                    }
                    Err(e) => {
                        println!("{}: {}", name.bold(), format!("unreadable ({})", e).yellow());
                    }
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Warn on stderr about every sheet left out of the output.
fn report_skipped(records: &WorkbookRecords) {
    for (sheet, reason) in &records.skipped {
        match reason {
            SkipReason::Empty => {
                eprintln!("{} Sheet '{}' is empty", "!".yellow().bold(), sheet);
            }
            _ => {
                eprintln!(
                    "{} Sheet '{}' skipped: {}",
                    "!".yellow().bold(),
                    sheet,
                    reason
                );
            }
        }
    }
}

fn print_version() {
    println!("{} {}", "unsheet".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Concurrent extraction of header-keyed records from Excel workbooks");
    println!();
    println!("Supported formats: XLSX, XLSM");
    println!("Repository: https://github.com/iyulab/unsheet");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mapping() {
        assert_eq!(
            parse_mapping("Amount=amt").unwrap(),
            ("Amount".to_string(), "amt".to_string())
        );
        assert_eq!(
            parse_mapping("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_mapping("Amount").is_err());
        assert!(parse_mapping("=amt").is_err());
    }

    #[test]
    fn test_default_options() {
        let cli = Cli::parse_from(["unsheet", "json", "book.xlsx"]);
        let Commands::Json { extract, .. } = cli.command else {
            panic!("expected json command");
        };
        let options = extract.to_options().unwrap();

        assert!(options.trim_space);
        assert!(options.skip_empty);
        assert!(options.header_row_auto_detect);
        assert_eq!(options.header_row_scan_limit, 50);
        assert_eq!(options.max_concurrent_sheets, 5);
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::parse_from([
            "unsheet", "records", "book.xlsx", "-s", "Sales", "-s", "Costs", "-f", "name",
            "-m", "Amount=amt", "--no-trim", "--keep-empty", "--no-detect", "-j", "0",
        ]);
        let Commands::Json {
            extract,
            max_concurrent,
            ..
        } = cli.command
        else {
            panic!("expected json command");
        };
        let options = extract.to_options().unwrap();
        assert_eq!(max_concurrent, Some(0));

        assert_eq!(options.sheet_names, vec!["Sales", "Costs"]);
        assert_eq!(options.header_filter, vec!["name"]);
        assert_eq!(options.header_map["Amount"], "amt");
        assert!(!options.trim_space);
        assert!(!options.skip_empty);
        assert!(!options.header_row_auto_detect);
    }

    #[test]
    fn test_sheets_honours_sheet_flag() {
        let cli = Cli::parse_from(["unsheet", "sheets", "book.xlsx", "-s", "Costs", "-s", "Nope"]);
        let Commands::Sheets { extract, .. } = cli.command else {
            panic!("expected sheets command");
        };
        let options = extract.to_options().unwrap();

        assert_eq!(
            selected_sheets(vec!["Sales", "Costs"], &options.sheet_names),
            vec!["Costs", "Nope"]
        );
        assert_eq!(
            selected_sheets(vec!["Sales", "Costs"], &[]),
            vec!["Sales", "Costs"]
        );
    }

    #[test]
    fn test_sheets_rejects_concurrency_flag() {
        assert!(Cli::try_parse_from(["unsheet", "sheets", "book.xlsx", "-j", "2"]).is_err());
    }
}
