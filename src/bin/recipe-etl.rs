//! recipe-etl CLI - normalize exported recipe documents into canonical tables
//! and validate them.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use recipe_etl::serialization::write_json_pretty;
use recipe_etl::{
    CsvDirSink, Pipeline, PipelineConfig, RawBatch, TableSink, ValidationReport, Validator,
};

#[derive(Parser)]
#[command(name = "recipe-etl")]
#[command(version, about = "Normalize and validate exported recipe documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Path to a YAML pipeline config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the exported JSON files
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the CSV tables and report are written to
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the canonical CSV tables from the exported documents
    Transform(PathArgs),

    /// Validate existing CSV tables and write the report
    Validate(PathArgs),

    /// Transform, then validate
    Run(PathArgs),
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform(args) => load_config(args).and_then(transform),
        Commands::Validate(args) => load_config(args).and_then(validate),
        Commands::Run(args) => load_config(args).and_then(run),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Config file, then environment, then flags.
fn load_config(args: PathArgs) -> Result<PipelineConfig, String> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)?,
        None => PipelineConfig::default(),
    };

    config.apply_env_overrides();

    if let Some(input) = args.input {
        config.input_dir = input;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }

    Ok(config)
}

fn transform(config: PipelineConfig) -> Result<(), String> {
    println!("🔧 Transforming documents from {}...", config.input_dir.display());

    let batch = RawBatch::load(&config);
    let mut sink = CsvDirSink::new(&config.output_dir);
    let tables = Pipeline::new(config).normalize(&batch);

    sink.write_tables(&tables)
        .map_err(|e| format!("Failed to write tables: {}", e))?;

    for table in tables.iter() {
        println!("  ✓ {}: {} rows", table.name, table.len());
    }
    println!("✅ Tables written to {}", sink.dir().display());
    Ok(())
}

fn validate(config: PipelineConfig) -> Result<(), String> {
    println!("🔍 Validating tables in {}...", config.output_dir.display());

    let sink = CsvDirSink::new(&config.output_dir);
    let report = Validator::new().validate_sink(&sink);

    write_report(&config, &report)
}

fn run(config: PipelineConfig) -> Result<(), String> {
    println!("🔧 Running pipeline on {}...", config.input_dir.display());

    let batch = RawBatch::load(&config);
    let mut sink = CsvDirSink::new(&config.output_dir);
    let report = Pipeline::new(config.clone())
        .run(&batch, &mut sink)
        .map_err(|e| format!("Pipeline failed: {}", e))?;

    write_report(&config, &report)
}

fn write_report(config: &PipelineConfig, report: &ValidationReport) -> Result<(), String> {
    let path = config.report_path();
    write_json_pretty(&path, report)
        .map_err(|e| format!("Failed to write report {}: {}", path.display(), e))?;

    for (name, entity) in &report.tables {
        println!(
            "  ✓ {}: {} valid, {} invalid",
            name,
            entity.valid.len(),
            entity.invalid.len()
        );
    }
    println!("✅ Report written to {}", path.display());
    Ok(())
}
