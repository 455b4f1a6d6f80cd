//! Schema Typegen CLI
//!
//! Reads saved schema and custom attribute responses, generates the
//! TypeScript declarations and writes them to disk.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use schema_typegen::{CatalogSource, FileCatalog, Generator, TypegenConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-typegen")]
#[command(about = "Generate TypeScript entity types from a schema catalog")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,

    /// Saved `query_schemas` response
    #[arg(short, long)]
    schemas: Option<PathBuf>,

    /// Saved custom attribute configuration response
    #[arg(short = 'a', long)]
    custom_attributes: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output file name
    #[arg(short, long)]
    filename: Option<String>,

    /// Server URL for the header
    #[arg(long)]
    server_url: Option<String>,

    /// Server version for the header
    #[arg(long)]
    server_version: Option<String>,

    /// Leave the generation time out of the header
    #[arg(long)]
    no_timestamp: bool,

    /// Print to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `false` when nothing could be generated
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = TypegenConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    let mut source = FileCatalog::new(&config.input.schemas);
    if let Some(ref path) = config.input.custom_attributes {
        source = source.with_custom_attributes(path);
    }
    let catalog = source.fetch().context("failed to load catalogs")?;

    let generator = Generator::new(config.generate_options(chrono::Utc::now()));
    let output = generator
        .generate(&catalog.schemas, &catalog.custom_attributes)
        .context("generation aborted")?;

    if output.diagnostics.has_errors() {
        for error in &output.errors {
            eprintln!("❌ {}", error);
        }
        return Ok(false);
    }

    if cli.stdout {
        print!("{}", output.artifact);
    } else {
        let target = config.output_file();
        fs::create_dir_all(&config.output.path)
            .with_context(|| format!("failed to create {}", config.output.path.display()))?;
        fs::write(&target, &output.artifact)
            .with_context(|| format!("failed to write {}", target.display()))?;
        eprintln!("📝 Wrote {}", target.display());
    }

    eprintln!("✅ Generated {} schemas", output.schema_count);
    if !output.errors.is_empty() {
        eprintln!("⚠️  {} error(s):", output.errors.len());
        for error in &output.errors {
            eprintln!("   - {}", error);
        }
    }

    Ok(true)
}

fn apply_overrides(config: &mut TypegenConfig, cli: &Cli) {
    if let Some(ref schemas) = cli.schemas {
        config.input.schemas = schemas.clone();
    }
    if let Some(ref path) = cli.custom_attributes {
        config.input.custom_attributes = Some(path.clone());
    }
    if let Some(ref output) = cli.output {
        config.output.path = output.clone();
    }
    if let Some(ref filename) = cli.filename {
        config.output.filename = filename.clone();
    }
    if let Some(ref url) = cli.server_url {
        config.server.url = Some(url.clone());
    }
    if let Some(ref version) = cli.server_version {
        config.server.version = Some(version.clone());
    }
    if cli.no_timestamp {
        config.generation.timestamp = false;
    }
}
