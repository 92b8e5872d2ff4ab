//! Segkit CLI - contact spreadsheets to CRM segmentation documents
//!
//! # Main Commands
//!
//! ```bash
//! segkit segment contacts.xlsx -o out   # Write one document per brand/category/chunk
//! segkit brands                         # Print the effective brand table
//! ```
//!
//! # Utility Commands
//!
//! ```bash
//! segkit convert input.csv              # Generic CSV to JSON
//! segkit parse input.csv                # Minimal parser with derived FIELD5
//! segkit validate out/amf_retail_part_1.json
//! ```

use clap::{Parser, Subcommand};
use segkit::parser::fields::{self, CsvOptions};
use segkit::{
    convert_regular_csv, format_violations, parse_csv_file_auto, validate, validate_segmentation,
    InvalidRowPolicy, SegmentationConfig, SegmentationResult, Segmenter, SplitPolicy,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "segkit")]
#[command(about = "Turn contact spreadsheets into CRM segmentation documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a .csv or .xlsx contact file
    Segment {
        /// Input file (.csv or .xlsx)
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "SEGKIT_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Configuration file (brands, centers, chunking)
        #[arg(short, long, env = "SEGKIT_CONFIG")]
        config: Option<PathBuf>,

        /// Split policy for oversized segments: halve or bounded
        #[arg(long)]
        split: Option<SplitPolicy>,

        /// Drop rows with a missing or non-integer id instead of failing
        #[arg(long)]
        skip_invalid_rows: bool,

        /// Write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Convert a CSV file to a JSON array (encoding and delimiter auto-detected)
    Convert {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a CSV file line by line and add the derived FIELD5 column
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Quote character
        #[arg(short, long, default_value = "\"")]
        quote: char,

        /// The first line is data, not headers
        #[arg(long)]
        no_headers: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate segmentation documents (one object or an array)
    Validate {
        /// Input JSON file
        input: PathBuf,

        /// Custom JSON schema (default: embedded segmentation schema)
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },

    /// Print the effective brand table as JSON
    Brands {
        /// Configuration file
        #[arg(short, long, env = "SEGKIT_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Segment {
            input,
            output_dir,
            config,
            split,
            skip_invalid_rows,
            report,
        } => cmd_segment(
            &input,
            &output_dir,
            config.as_deref(),
            split,
            skip_invalid_rows,
            report.as_deref(),
        ),

        Commands::Convert { input, output } => cmd_convert(&input, output.as_deref()),

        Commands::Parse {
            input,
            delimiter,
            quote,
            no_headers,
            output,
        } => {
            let options = CsvOptions {
                delimiter,
                headers: !no_headers,
                quote,
            };
            cmd_parse(&input, &options, output.as_deref())
        }

        Commands::Validate { input, schema } => cmd_validate(&input, schema.as_deref()),

        Commands::Brands { config } => cmd_brands(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> SegmentationResult<SegmentationConfig> {
    if let Some(p) = path {
        info!(path = %p.display(), "Loading configuration");
    }
    SegmentationConfig::load(path)
}

fn cmd_segment(
    input: &Path,
    output_dir: &Path,
    config_path: Option<&Path>,
    split: Option<SplitPolicy>,
    skip_invalid_rows: bool,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(policy) = split {
        config.split_policy = policy;
    }
    if skip_invalid_rows {
        config.invalid_rows = InvalidRowPolicy::Skip;
    }

    let report = Segmenter::new(config).run(input, output_dir)?;

    for table in &report.tables {
        eprintln!(
            "📄 {}: {} rows, {} segments",
            table.segment_name,
            table.row_count,
            table.artifacts.len()
        );
        for artifact in table.artifacts.iter().filter(|a| !a.is_current()) {
            eprintln!(
                "   ⚠️  {} overwritten by '{}'",
                artifact.path.display(),
                artifact.overwritten_by.as_deref().unwrap_or_default()
            );
        }
        for skipped in &table.skipped {
            eprintln!("   ⚠️  Skipped '{}' ({} rows): {}", skipped.center, skipped.rows, skipped.reason);
        }
        for failure in &table.failures {
            eprintln!("   ❌ {}: {}", failure.path.display(), failure.message);
        }
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)?;
        eprintln!("💾 Report written to: {}", path.display());
    }

    if !report.is_success() {
        return Err(format!("{} segment file(s) could not be written", report.failure_count()).into());
    }

    eprintln!(
        "✨ Done! {} segment file(s) in {}",
        report.artifact_count(),
        output_dir.display()
    );
    if report.overwritten_count() > 0 {
        eprintln!(
            "   ⚠️  {} file(s) were replaced by a later sheet with the same brand",
            report.overwritten_count()
        );
    }
    Ok(())
}

fn cmd_convert(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Converting CSV: {}", input.display());

    let result = match output {
        Some(p) => convert_regular_csv(input, p)?,
        None => parse_csv_file_auto(input)?,
    };
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.records.len());

    match output {
        Some(p) => eprintln!("💾 Output written to: {}", p.display()),
        None => println!("{}", serde_json::to_string_pretty(&result.records)?),
    }
    Ok(())
}

fn cmd_parse(
    input: &Path,
    options: &CsvOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let rows = fields::parse_csv_file(input, options, fields::default_derive)?;
    eprintln!("✅ Parsed {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_validate(input: &Path, schema_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let documents = match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => items,
        single => vec![single],
    };

    let schema: Option<Value> = match schema_path {
        Some(p) => Some(serde_json::from_str(&fs::read_to_string(p)?)?),
        None => None,
    };

    let mut valid = 0;
    let mut invalid = 0;

    for (i, document) in documents.iter().enumerate() {
        let result = match &schema {
            Some(schema) => validate(schema, document),
            None => validate_segmentation(document),
        };
        match result {
            Ok(()) => valid += 1,
            Err(violations) => {
                invalid += 1;
                eprintln!("\n❌ Document {} invalid:", i);
                eprintln!("{}", format_violations(&violations));
            }
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_brands(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config.brands)?);
    Ok(())
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
