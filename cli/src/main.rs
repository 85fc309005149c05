use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use config_schema_core::{ErrorReport, NodeSet, PatternRegistry, Validator};
use config_schema_load::{CheckConfig, check_document, load_document, load_schema};
use serde::Serialize;
use tracing::{debug, info};

/// Exit status when every document validated.
const EXIT_VALID: i32 = 0;
/// Exit status when at least one document failed validation.
const EXIT_INVALID: i32 = 1;
/// Exit status for load failures and malformed schemas.
const EXIT_ERROR: i32 = 2;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "config-validate")]
#[command(about = "Validate configuration files against declarative schemas")]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate documents against one schema file.
    Check(CheckArgs),
    /// Validate every target listed in a check config file.
    Run(RunArgs),
    /// Print the nesting depth of a document or one of its fields.
    Depth(DepthArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file (YAML or JSON).
    #[arg(long)]
    schema: PathBuf,
    /// Document files to validate.
    #[arg(required = true)]
    documents: Vec<PathBuf>,
    /// Extra named pattern as NAME=REGEX (repeatable).
    #[arg(long = "pattern", value_parser = parse_pattern)]
    patterns: Vec<(String, String)>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to the check config YAML.
    #[arg(long, default_value = ".config-schema.yml")]
    config: PathBuf,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct DepthArgs {
    /// Document file.
    document: PathBuf,
    /// Dotted path of the field to measure (default: whole document).
    #[arg(long)]
    path: Option<String>,
}

/// Result of validating one document, as rendered to the user.
#[derive(Debug, Serialize)]
struct DocumentReport {
    document: PathBuf,
    schema: PathBuf,
    valid: bool,
    errors: ErrorReport,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Run(args) => run_batch(args),
        Command::Depth(args) => run_depth(args).map(|()| true),
    };

    match result {
        Ok(true) => std::process::exit(EXIT_VALID),
        Ok(false) => std::process::exit(EXIT_INVALID),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_pattern(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, regex)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), regex.to_string()))
        }
        _ => Err(format!("expected NAME=REGEX, got '{raw}'")),
    }
}

// ---------------------------------------------------------------------------
// check command
// ---------------------------------------------------------------------------

fn run_check(args: CheckArgs) -> Result<bool, String> {
    let mut patterns = PatternRegistry::builtin();
    for (name, regex) in &args.patterns {
        patterns
            .insert_regex(name.as_str(), regex)
            .map_err(|err| format!("Invalid pattern '{name}': {err}"))?;
    }

    let schema = read_schema(&args.schema)?;
    let reports = validate_documents(&schema, &args.schema, &patterns, &args.documents)?;
    emit(&reports, args.format)
}

// ---------------------------------------------------------------------------
// run command
// ---------------------------------------------------------------------------

fn run_batch(args: RunArgs) -> Result<bool, String> {
    use rayon::prelude::*;

    let config = CheckConfig::load(&args.config)
        .map_err(|e| format!("Failed to load check config '{}': {e}", args.config.display()))?;
    let patterns = config.registry().map_err(|e| e.to_string())?;
    info!(
        targets = config.targets.len(),
        documents = config.document_count(),
        "running check config"
    );

    let per_target: Vec<Result<Vec<DocumentReport>, String>> = config
        .targets
        .par_iter()
        .map(|target| {
            let schema = read_schema(&target.schema)?;
            validate_documents(&schema, &target.schema, &patterns, &target.documents)
        })
        .collect();

    let mut reports = Vec::with_capacity(config.document_count());
    for result in per_target {
        reports.extend(result?);
    }
    emit(&reports, args.format)
}

// ---------------------------------------------------------------------------
// depth command
// ---------------------------------------------------------------------------

fn run_depth(args: DepthArgs) -> Result<(), String> {
    let document = load_document(&args.document)
        .map_err(|e| format!("Failed to read '{}': {e}", args.document.display()))?;
    let path = args.path.as_deref().unwrap_or("");
    let value = document
        .lookup(path)
        .ok_or_else(|| format!("No field at path '{path}'"))?;
    println!("{}", value.depth());
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn read_schema(path: &Path) -> Result<NodeSet, String> {
    load_schema(path).map_err(|e| format!("Failed to load schema '{}': {e}", path.display()))
}

fn validate_documents(
    schema: &NodeSet,
    schema_path: &Path,
    patterns: &PatternRegistry,
    documents: &[PathBuf],
) -> Result<Vec<DocumentReport>, String> {
    use rayon::prelude::*;

    let validator = Validator::new(schema).with_patterns(patterns.clone());
    documents
        .par_iter()
        .map(|path| {
            debug!(document = %path.display(), "validating");
            let outcome = check_document(&validator, path)
                .map_err(|e| format!("Failed to check '{}': {e}", path.display()))?;
            Ok(DocumentReport {
                document: path.clone(),
                schema: schema_path.to_path_buf(),
                valid: outcome.is_valid(),
                errors: outcome.into_errors(),
            })
        })
        .collect()
}

/// Prints the reports and returns `true` when every document is valid.
fn emit(reports: &[DocumentReport], format: CliOutputFormat) -> Result<bool, String> {
    match format {
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(reports)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        CliOutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(reports)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            print!("{yaml}");
        }
        CliOutputFormat::Text => print!("{}", reports_to_text(reports)),
    }

    Ok(reports.iter().all(|r| r.valid))
}

fn reports_to_text(reports: &[DocumentReport]) -> String {
    let mut out = String::new();
    for report in reports {
        if report.valid {
            out.push_str(&format!("{}: valid\n", report.document.display()));
            continue;
        }

        out.push_str(&format!(
            "{}: {} error(s)\n",
            report.document.display(),
            report.errors.message_count()
        ));
        for (path, messages) in report.errors.iter() {
            for message in messages {
                out.push_str(&format!("  {path}: {message}\n"));
            }
        }
    }

    let invalid = reports.iter().filter(|r| !r.valid).count();
    out.push_str(&format!(
        "Checked {} document(s), {} invalid.\n",
        reports.len(),
        invalid
    ));
    out
}
