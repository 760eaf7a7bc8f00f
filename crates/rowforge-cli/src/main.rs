//! Rowforge CLI - batch workbook generation tool

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use rowforge::prelude::*;
use rowforge::{default_target_sheet, record_key, JsonWriteOptions};

#[derive(Parser)]
#[command(name = "rowforge")]
#[command(
    author,
    version,
    about = "Fill a template workbook once per mapping row"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a template workbook
    Info {
        /// Input template file (json)
        input: PathBuf,
    },

    /// List all sheets in a template workbook
    Sheets {
        /// Input template file
        input: PathBuf,
    },

    /// List the headers and row count of a mapping sheet
    Headers {
        /// Input template file
        input: PathBuf,

        /// Mapping sheet name (default: first sheet)
        #[arg(short, long)]
        mapping_sheet: Option<String>,
    },

    /// Preview the output file name of every row
    Preview {
        /// Input template file
        input: PathBuf,

        /// Mapping sheet name (default: first sheet)
        #[arg(short, long)]
        mapping_sheet: Option<String>,

        /// File name pattern with {Header} placeholders
        #[arg(short, long)]
        pattern: Option<String>,

        /// File name prefix, combined with --name-column
        #[arg(long)]
        prefix: Option<String>,

        /// Header whose value follows the prefix
        #[arg(long)]
        name_column: Option<String>,
    },

    /// Generate one output workbook per mapping row
    Generate {
        /// Input template file
        input: PathBuf,

        /// Mapping sheet name (default: first sheet)
        #[arg(short, long)]
        mapping_sheet: Option<String>,

        /// Target assignment HEADER=SHEET!CELL (repeatable)
        #[arg(short, long = "target", value_name = "SPEC")]
        targets: Vec<String>,

        /// JSON file of target assignments, header to target list
        #[arg(long)]
        targets_file: Option<PathBuf>,

        /// File name pattern with {Header} placeholders
        #[arg(short, long)]
        pattern: Option<String>,

        /// File name prefix, combined with --name-column
        #[arg(long)]
        prefix: Option<String>,

        /// Header whose value follows the prefix
        #[arg(long)]
        name_column: Option<String>,

        /// Directory outputs are written to
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Fallback directory when every other sink fails
        #[arg(long, default_value = ".")]
        downloads_dir: PathBuf,

        /// How empty row values treat destination cells
        #[arg(long, value_enum, default_value_t = Mode::Conditional)]
        mode: Mode,

        /// Generate even when headers have no targets
        #[arg(long)]
        allow_unmapped: bool,

        /// Pause between rows in milliseconds
        #[arg(long, default_value = "80")]
        pacing_ms: u64,

        /// Pretty-print the generated documents
        #[arg(long)]
        pretty: bool,
    },
}

/// Write mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Leave destinations untouched for empty values
    Conditional,
    /// Clear destinations for empty values
    Overwrite,
}

impl From<Mode> for WriteMode {
    fn from(mode: Mode) -> WriteMode {
        match mode {
            Mode::Conditional => WriteMode::Conditional,
            Mode::Overwrite => WriteMode::Overwrite,
        }
    }
}

/// One target entry in a --targets-file document
#[derive(Debug, Deserialize)]
struct TargetEntry {
    sheet: Option<String>,
    #[serde(alias = "addr")]
    address: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    match cli.command {
        Commands::Info { input } => show_info(&input),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Headers {
            input,
            mapping_sheet,
        } => list_headers(&input, mapping_sheet.as_deref()),
        Commands::Preview {
            input,
            mapping_sheet,
            pattern,
            prefix,
            name_column,
        } => preview(
            &input,
            mapping_sheet.as_deref(),
            naming_from_args(pattern, prefix, name_column),
        ),
        Commands::Generate {
            input,
            mapping_sheet,
            targets,
            targets_file,
            pattern,
            prefix,
            name_column,
            out_dir,
            downloads_dir,
            mode,
            allow_unmapped,
            pacing_ms,
            pretty,
        } => generate(GenerateArgs {
            input,
            mapping_sheet,
            targets,
            targets_file,
            naming: naming_from_args(pattern, prefix, name_column),
            out_dir,
            downloads_dir,
            mode,
            allow_unmapped,
            pacing_ms,
            pretty,
        }),
    }
}

fn show_info(input: &Path) -> Result<()> {
    let workbook =
        Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());

    for (i, sheet) in workbook.sheets().enumerate() {
        let formula_count = sheet.cells().filter(|(_, c)| c.formula.is_some()).count();

        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());

        match sheet.used_bounds() {
            Some(range) => println!(
                "    Used range: {} rows x {} columns",
                range.rows(),
                range.cols()
            ),
            None => println!("    Used range: empty"),
        }
        println!("    Cells: {}", sheet.cell_count());
        println!("    Formulas: {}", formula_count);
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook =
        Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, sheet) in workbook.sheets().enumerate() {
        println!("{}\t{}", i, sheet.name());
    }

    Ok(())
}

fn list_headers(input: &Path, mapping_sheet: Option<&str>) -> Result<()> {
    let session = load_session(input, mapping_sheet)?;
    let mapping = session.mapping().context("Mapping state missing")?;

    println!("Mapping sheet: \"{}\"", mapping.sheet_name());
    println!("Data rows: {}", mapping.table().row_count());
    println!();

    for (i, header) in mapping.table().headers().iter().enumerate() {
        println!("{}\t{}", i, record_key(header, i));
    }

    Ok(())
}

fn preview(input: &Path, mapping_sheet: Option<&str>, naming: NamingRule) -> Result<()> {
    let mut session = load_session(input, mapping_sheet)?;
    session.set_naming(naming);

    for name in session.preview_filenames()? {
        println!("{}", name);
    }

    Ok(())
}

struct GenerateArgs {
    input: PathBuf,
    mapping_sheet: Option<String>,
    targets: Vec<String>,
    targets_file: Option<PathBuf>,
    naming: NamingRule,
    out_dir: Option<PathBuf>,
    downloads_dir: PathBuf,
    mode: Mode,
    allow_unmapped: bool,
    pacing_ms: u64,
    pretty: bool,
}

fn generate(args: GenerateArgs) -> Result<()> {
    let mut session = load_session(&args.input, args.mapping_sheet.as_deref())?;
    session.set_naming(args.naming);
    if let Some(dir) = args.out_dir {
        session.set_output_dir(dir);
    }

    if let Some(path) = &args.targets_file {
        apply_targets_file(&mut session, path)?;
    }
    for spec in &args.targets {
        apply_target_spec(&mut session, spec)?;
    }

    let options = BatchOptions {
        mode: args.mode.into(),
        allow_unmapped: args.allow_unmapped,
        pacing: Duration::from_millis(args.pacing_ms),
    };
    let serializer = JsonSerializer::new(JsonWriteOptions {
        pretty: args.pretty,
    });
    let host = FsHost::new(args.downloads_dir);

    let outcome = run_batch(&session, &serializer, &host, &options)?;
    println!(
        "Generated {} of {} outputs",
        outcome.generated,
        outcome.generated + outcome.failed
    );
    if outcome.failed > 0 {
        bail!("{} outputs failed to save", outcome.failed);
    }

    Ok(())
}

fn naming_from_args(
    pattern: Option<String>,
    prefix: Option<String>,
    name_column: Option<String>,
) -> NamingRule {
    NamingRule {
        pattern: pattern.unwrap_or_default(),
        prefix: prefix.unwrap_or_default(),
        name_column,
    }
}

/// Open the template and load the mapping sheet into a session
fn load_session(input: &Path, mapping_sheet: Option<&str>) -> Result<Session> {
    let template =
        Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    let mapping = match mapping_sheet {
        Some(name) => name.to_string(),
        None => template
            .sheet_names()
            .next()
            .context("Template has no sheets")?
            .to_string(),
    };

    let mut session = Session::with_source(template, input);
    session
        .load_mapping(&mapping)
        .with_context(|| format!("Failed to load mapping sheet '{}'", mapping))?;
    Ok(session)
}

/// Parse a HEADER=SHEET!CELL spec; the sheet part may be omitted
fn parse_target_spec(spec: &str) -> Result<(String, Option<String>, String)> {
    let (header, rest) = spec
        .split_once('=')
        .with_context(|| format!("Invalid target '{}': expected HEADER=SHEET!CELL", spec))?;

    let (sheet, address) = match rest.split_once('!') {
        Some((sheet, address)) => (Some(sheet.to_string()), address.to_string()),
        None => (None, rest.to_string()),
    };
    Ok((header.to_string(), sheet, address))
}

fn apply_target_spec(session: &mut Session, spec: &str) -> Result<()> {
    let (header, sheet, address) = parse_target_spec(spec)?;
    let sheet = resolve_target_sheet(session, sheet);
    session
        .add_target(&header, Target::new(sheet, address))
        .with_context(|| format!("Cannot apply target '{}'", spec))?;
    Ok(())
}

fn apply_targets_file(session: &mut Session, path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let entries: BTreeMap<String, Vec<TargetEntry>> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid targets file '{}'", path.display()))?;

    for (header, targets) in entries {
        for entry in targets {
            let sheet = resolve_target_sheet(session, entry.sheet);
            session
                .add_target(&header, Target::new(sheet, entry.address))
                .with_context(|| format!("Cannot apply target for header '{}'", header))?;
        }
    }
    Ok(())
}

/// An omitted sheet falls back to the first non-mapping sheet
fn resolve_target_sheet(session: &Session, sheet: Option<String>) -> String {
    match sheet {
        Some(sheet) => sheet,
        None => {
            let mapping = session
                .mapping()
                .map(|m| m.sheet_name().to_string())
                .unwrap_or_default();
            default_target_sheet(session.template(), &mapping)
                .unwrap_or_default()
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_spec() {
        assert_eq!(
            parse_target_spec("Amount=Invoice!B2").unwrap(),
            (
                "Amount".to_string(),
                Some("Invoice".to_string()),
                "B2".to_string()
            )
        );
        assert_eq!(
            parse_target_spec("Amount=B2").unwrap(),
            ("Amount".to_string(), None, "B2".to_string())
        );
        assert!(parse_target_spec("Amount").is_err());
    }

    #[test]
    fn test_target_entry_accepts_addr_alias() {
        let entry: TargetEntry = serde_json::from_str(r#"{"sheet": "Invoice", "addr": "B2"}"#)
            .unwrap();
        assert_eq!(entry.sheet.as_deref(), Some("Invoice"));
        assert_eq!(entry.address, "B2");
    }
}
