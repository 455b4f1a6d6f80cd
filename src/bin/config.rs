//! Typegen Config CLI
//!
//! Inspects the layered generator configuration and checks that the
//! catalogs it points at can be read.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use schema_typegen::{CatalogSource, FileCatalog, TypegenConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "typegen-config")]
#[command(about = "Inspect schema typegen configuration")]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Show {
        #[arg(short, long, value_enum, default_value_t = Format::Summary)]
        format: Format,
    },

    /// Write a config file with the defaults
    Init {
        #[arg(default_value = "typegen.toml")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load the configured catalogs and report what was found
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Summary,
    Toml,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { path, force } => init(&path, force),
        Commands::Show { format } => {
            let config = load(cli.config.as_deref())?;
            match format {
                Format::Summary => print_summary(&config),
                Format::Toml => print!("{}", toml::to_string_pretty(&config)?),
                Format::Json => println!("{}", serde_json::to_string_pretty(&config)?),
            }
            Ok(())
        }
        Commands::Check => check(&load(cli.config.as_deref())?),
    }
}

fn load(path: Option<&str>) -> anyhow::Result<TypegenConfig> {
    TypegenConfig::load_from(path).context("failed to load configuration")
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    let target = path.to_string_lossy();
    TypegenConfig::default()
        .save(&target)
        .with_context(|| format!("failed to write {}", target))?;
    eprintln!("✅ Wrote {}", target);
    Ok(())
}

fn print_summary(config: &TypegenConfig) {
    let unset = || "-".to_string();

    println!("server.url                {}", config.server.url.clone().unwrap_or_else(unset));
    println!("server.version            {}", config.server.version.clone().unwrap_or_else(unset));
    println!("input.schemas             {}", config.input.schemas.display());
    println!(
        "input.custom_attributes   {}",
        config
            .input
            .custom_attributes
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(unset)
    );
    println!("output                    {}", config.output_file().display());
    println!("generation.timestamp      {}", config.generation.timestamp);
    println!("generation.legacy_schemas {}", config.generation.legacy_schemas.join(", "));
}

fn check(config: &TypegenConfig) -> anyhow::Result<()> {
    let mut source = FileCatalog::new(&config.input.schemas);
    if let Some(ref path) = config.input.custom_attributes {
        source = source.with_custom_attributes(path);
    }
    let catalog = source.fetch().context("failed to load catalogs")?;

    if catalog.schemas.is_empty() {
        bail!("{} contains no schemas", config.input.schemas.display());
    }

    let skipped = catalog
        .schemas
        .iter()
        .filter_map(|s| s.id())
        .filter(|id| config.generation.legacy_schemas.iter().any(|l| l.as_str() == *id))
        .count();

    println!(
        "✅ {} schemas ({} skipped), {} custom attributes",
        catalog.schemas.len(),
        skipped,
        catalog.custom_attributes.len()
    );
    Ok(())
}
