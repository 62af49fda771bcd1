//! csvfile CLI - Read CSV files with headers, renaming and column skipping
//!
//! # Commands
//!
//! ```bash
//! csvfile read input.csv --header                      # Rows as JSON objects
//! csvfile read input.csv --column "Last Name=lname"    # Rename / narrow columns
//! csvfile read input.csv --skip-to-column 1 -o out.json
//! csvfile count input.csv --skip-to-row 3              # Number of data rows
//! csvfile detect input.csv                             # Guess encoding and delimiter
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use csvfile::{detect_delimiter, detect_encoding, CsvFile, CsvSource, ReaderOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "csvfile")]
#[command(about = "Read CSV files with header, column renaming and column skipping", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a CSV file and output its rows as JSON
    Read {
        #[command(flatten)]
        read: ReadArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count the data rows of a CSV file
    Count {
        #[command(flatten)]
        read: ReadArgs,
    },

    /// Detect the encoding and delimiter of a CSV file
    Detect {
        /// Input CSV file
        input: PathBuf,
    },
}

#[derive(Args)]
struct ReadArgs {
    /// Input CSV file
    input: PathBuf,

    /// Options JSON file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field delimiter, or "auto" to detect it from the first line
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Quote character
    #[arg(long)]
    enclosure: Option<char>,

    /// Escape character
    #[arg(long)]
    escape: Option<char>,

    /// Source encoding label, or "auto" to detect it
    #[arg(short, long)]
    encoding: Option<String>,

    /// Use the first data row as header
    #[arg(long)]
    header: bool,

    /// Column rename as KEY=NAME (KEY is a position or a header name); repeatable
    #[arg(short, long = "column")]
    columns: Vec<String>,

    /// Row at which data (or the header) starts
    #[arg(long)]
    skip_to_row: Option<usize>,

    /// Column at which data starts
    #[arg(long, allow_negative_numbers = true)]
    skip_to_column: Option<i64>,

    /// Columns to drop, by position (comma separated)
    #[arg(long, value_delimiter = ',')]
    skip_columns: Vec<usize>,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Read { read, output } => cmd_read(&read, output.as_deref()),
        Commands::Count { read } => cmd_count(&read),
        Commands::Detect { input } => cmd_detect(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_read(args: &ReadArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading CSV: {}", args.input.display());

    let mut csv = open(args)?;
    let rows = csv.to_array()?;

    if let Some(headers) = csv.headers() {
        eprintln!("   Columns: {}", headers.names().collect::<Vec<_>>().join(", "));
    }
    eprintln!("✅ Read {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_count(args: &ReadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut csv = open(args)?;
    println!("{}", csv.count()?);
    Ok(())
}

fn cmd_detect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔍 Detecting: {}", input.display());

    let bytes = fs::read(input)?;
    let encoding = detect_encoding(&bytes);
    let first_line = first_line(input)?;

    println!("Encoding: {}", encoding);
    println!("Delimiter: '{}'", format_delimiter(detect_delimiter(&first_line)));
    Ok(())
}

/// Merge the options file with command-line flags and open the reader.
fn open(args: &ReadArgs) -> Result<CsvFile<CsvSource<fs::File>>, Box<dyn std::error::Error>> {
    let mut options = match &args.config {
        Some(path) => ReaderOptions::from_json_file(path)?,
        None => ReaderOptions::default(),
    };

    match args.delimiter.as_deref() {
        Some("auto") => {
            let delimiter = detect_delimiter(&first_line(&args.input)?);
            eprintln!("   Delimiter: '{}' (auto-detected)", format_delimiter(delimiter));
            options.delimiter = delimiter;
        }
        Some(value) => options.delimiter = parse_delimiter(value)?,
        None => {}
    }
    if let Some(enclosure) = args.enclosure {
        options.enclosure = enclosure;
    }
    if let Some(escape) = args.escape {
        options.escape = escape;
    }

    match args.encoding.as_deref() {
        Some("auto") => {
            let encoding = detect_encoding(&fs::read(&args.input)?);
            eprintln!("   Encoding: {} (auto-detected)", encoding);
            options.encoding = Some(encoding);
        }
        Some(label) => options.encoding = Some(label.to_string()),
        None => {}
    }

    options.header |= args.header;
    if let Some(row) = args.skip_to_row {
        options.skip_to_row = Some(row);
    }
    if let Some(column) = args.skip_to_column {
        options.skip_to_column = Some(column);
    }
    options.skip_columns.extend(args.skip_columns.iter().copied());

    for column in &args.columns {
        let (key, name) = column
            .split_once('=')
            .ok_or_else(|| format!("Invalid column mapping '{}', expected KEY=NAME", column))?;
        options.columns.insert(key.to_string(), name.to_string());
    }

    Ok(options.open(&args.input)?)
}

fn first_line(path: &Path) -> Result<String, std::io::Error> {
    let mut line = Vec::new();
    BufReader::new(fs::File::open(path)?).read_until(b'\n', &mut line)?;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "\\t" | "tab" => Ok('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("Delimiter must be a single character, got '{}'", value)),
            }
        }
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
