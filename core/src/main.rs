//! IFC Load CLI - Check CSV attachments before an IFC upload
//!
//! # Commands
//!
//! ```bash
//! ifcload validate rooms.csv doors.csv --schema CSVSchema.json --lod LOD300
//! ifcload validate doors.csv --schema https://cdn.example.com/CSVSchema.json --lod LOD300 --option Internal
//! ifcload schemas --schema CSVSchema.json --lod LOD300
//! ifcload header rooms.csv
//! ifcload links --status status.json --building-id CEN047
//! ```
//!
//! `IFCLOAD_SCHEMA_URL` and `IFCLOAD_ACCESS_TOKEN` (from the environment or a
//! `.env` file) stand in for `--schema` and `--token`.

use clap::{Parser, Subcommand};
use ifcload::{
    area_map_url, bim_url, load_library_source, read_csv_file, JobStatus, SchemaLibrary,
    SchemaMatcher, ValidationVerdict,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_ENV: &str = "IFCLOAD_SCHEMA_URL";
const TOKEN_ENV: &str = "IFCLOAD_ACCESS_TOKEN";

#[derive(Parser)]
#[command(name = "ifcload")]
#[command(about = "Validate CSV attachments of IFC uploads against a schema library", long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate CSV files against the schema library
    Validate {
        /// CSV files to check
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Schema library file or URL (default: $IFCLOAD_SCHEMA_URL)
        #[arg(short, long)]
        schema: Option<String>,

        /// Query string appended to the library URL (signed access)
        #[arg(long)]
        access_query: Option<String>,

        /// Level of detail of the upload
        #[arg(short, long)]
        lod: String,

        /// Schema option, for schemas that require one
        #[arg(short, long)]
        option: Option<String>,

        /// Print verdicts as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the schemas of a library
    Schemas {
        /// Schema library file or URL (default: $IFCLOAD_SCHEMA_URL)
        #[arg(short, long)]
        schema: Option<String>,

        /// Query string appended to the library URL (signed access)
        #[arg(long)]
        access_query: Option<String>,

        /// Only show this LOD
        #[arg(short, long)]
        lod: Option<String>,
    },

    /// Show the header row of a CSV file
    Header {
        /// Input CSV file
        input: PathBuf,
    },

    /// Print viewer links for a completed job
    Links {
        /// Job status JSON, as returned by the status endpoint
        #[arg(short, long)]
        status: PathBuf,

        /// Building the model belongs to
        #[arg(short, long)]
        building_id: String,

        /// Access token (default: $IFCLOAD_ACCESS_TOKEN)
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            inputs,
            schema,
            access_query,
            lod,
            option,
            json,
        } => {
            cmd_validate(
                &inputs,
                schema,
                access_query.as_deref(),
                &lod,
                option.as_deref(),
                json,
            )
            .await
        }

        Commands::Schemas {
            schema,
            access_query,
            lod,
        } => cmd_schemas(schema, access_query.as_deref(), lod.as_deref()).await,

        Commands::Header { input } => cmd_header(&input),

        Commands::Links {
            status,
            building_id,
            token,
        } => cmd_links(&status, &building_id, token),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn env_default(value: Option<String>, var: &str) -> Option<String> {
    value.or_else(|| std::env::var(var).ok()).filter(|v| !v.is_empty())
}

async fn load_library(
    schema: Option<String>,
    access_query: Option<&str>,
) -> Result<SchemaLibrary, Box<dyn std::error::Error>> {
    let source = env_default(schema, SCHEMA_ENV)
        .ok_or_else(|| format!("No schema library given (use --schema or set {})", SCHEMA_ENV))?;

    eprintln!("📚 Loading schema library: {}", source);
    let library = load_library_source(&source, access_query).await?;
    eprintln!("   {} schemas, LODs: {}", library.len(), library.lods().join(", "));
    Ok(library)
}

#[derive(Serialize)]
struct FileVerdict<'a> {
    file: String,
    #[serde(flatten)]
    verdict: &'a ValidationVerdict,
}

async fn cmd_validate(
    inputs: &[PathBuf],
    schema: Option<String>,
    access_query: Option<&str>,
    lod: &str,
    option: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let library = load_library(schema, access_query).await?;
    let matcher = SchemaMatcher::new(&library);

    let verdicts: Vec<ValidationVerdict> = inputs
        .iter()
        .map(|input| match read_csv_file(input) {
            Ok(decoded) => {
                warn_delimiter(input, decoded.delimiter);
                matcher.validate_text(&decoded.content, lod, option)
            }
            Err(e) => {
                log::warn!("cannot read {}: {}", input.display(), e);
                ValidationVerdict::read_error()
            }
        })
        .collect();

    if json {
        let report: Vec<FileVerdict> = inputs
            .iter()
            .zip(&verdicts)
            .map(|(input, verdict)| FileVerdict {
                file: input.display().to_string(),
                verdict,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (input, verdict) in inputs.iter().zip(&verdicts) {
            print_verdict(input, verdict);
        }
    }

    let invalid = verdicts.iter().filter(|v| !v.is_valid).count();
    eprintln!("\n📊 Results: {} valid, {} invalid", verdicts.len() - invalid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_verdict(input: &Path, verdict: &ValidationVerdict) {
    let name = input.display();

    if !verdict.is_valid {
        println!("❌ {}: {}", name, verdict.error_message);
        if verdict.requires_selection {
            println!("   Options: {}", verdict.selection_options.join(", "));
        }
        return;
    }

    if verdict.warning {
        println!("⚠️  {}: {}", name, verdict.error_message);
        return;
    }

    match &verdict.selected_option {
        Some(option) => println!("✅ {}: {} ({})", name, verdict.matched_schema_name, option),
        None => println!("✅ {}: {}", name, verdict.matched_schema_name),
    }
    if !verdict.extra_columns.is_empty() {
        println!("   Extra columns: {}", verdict.extra_columns.join(", "));
    }
}

async fn cmd_schemas(
    schema: Option<String>,
    access_query: Option<&str>,
    lod: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let library = load_library(schema, access_query).await?;

    let lods: Vec<&str> = match lod {
        Some(lod) => vec![lod],
        None => library.lods(),
    };

    for lod in lods {
        println!("\n📋 {}", lod);
        let mut any = false;
        for schema in library.candidates(lod) {
            any = true;
            println!("  📄 {}", schema.name);
            println!("     Columns: {}", schema.columns.join(", "));
            if schema.requires_selection() {
                println!("     Options: {}", schema.selection_options.join(", "));
            }
        }
        if !any {
            println!("  (no schemas; files are accepted without validation)");
        }
    }

    Ok(())
}

fn cmd_header(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading CSV: {}", input.display());

    let decoded = read_csv_file(input)?;
    eprintln!("   Encoding: {}", decoded.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(decoded.delimiter));
    warn_delimiter(input, decoded.delimiter);

    let header = ifcload::header_row(&decoded.content).ok_or("File is empty")?;
    for column in header.columns() {
        println!("{}", column);
    }
    eprintln!("✅ {} columns", header.len());

    Ok(())
}

/// Headers are always split on commas.
fn warn_delimiter(input: &Path, delimiter: char) {
    if delimiter != ',' {
        eprintln!(
            "⚠️  {} looks '{}'-separated; headers are matched on ',' only",
            input.display(),
            format_delimiter(delimiter)
        );
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_links(status_path: &Path, building_id: &str, token: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(status_path)?;
    let status: JobStatus = serde_json::from_str(&content)?;
    let token = env_default(token, TOKEN_ENV);

    eprintln!("🏗️  Job {}: {} ({}%)", status.processing_id, status.display_label(), status.progress_percent());
    if !status.is_completed() {
        return Err(format!("Job is not completed (status: {})", status.status).into());
    }

    let metadata = status.metadata.unwrap_or_default();
    match area_map_url(&metadata, token.as_deref()) {
        Ok(url) => println!("Area map: {}", url),
        Err(e) => eprintln!("⚠️  {}", e),
    }
    match bim_url(&metadata, building_id, token.as_deref()) {
        Ok(url) => println!("BIM:      {}", url),
        Err(e) => eprintln!("⚠️  {}", e),
    }

    Ok(())
}
