mod cli;
mod config;
mod output;

use std::process;

use anyhow::{bail, Context, Result};
use ufoq_core::ops::head;
use ufoq_core::{Query, Table};
use ufoq_io::{read_csv, render};

use crate::cli::{parse_args, Commands, ConfigCommands};
use crate::config::{create_default_config_file, validate_config, Config};
use crate::output::OutputWriter;

fn main() {
    if std::env::args().any(|arg| arg == "--version" || arg == "-V") {
        print_version();
        return;
    }

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_version() {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_date = option_env!("BUILD_DATE").unwrap_or("unknown");
    let rustc_version = option_env!("RUSTC_VERSION").unwrap_or("unknown");

    println!("ufoq {}", version);
    println!("Commit: {}", git_hash);
    println!("Built: {}", build_date);
    println!("Rustc: {}", rustc_version);
}

fn run() -> Result<()> {
    let args = parse_args();

    let mut config = Config::load()?;
    if let Some(config_path) = &args.config {
        config.merge_file(config_path)?;
    }
    config.apply_cli(&args);

    setup_logging(&config);
    validate_config(&config)?;

    handle_command(args.command, &config)
}

fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Disk { .. } => run_query(Query::DiskSightings, config),
        Commands::Long { .. } => run_query(Query::LongEncounters, config),
        Commands::Countries => run_query(Query::SightingsByCountry, config),
        Commands::Shapes { .. } => run_query(Query::ShapeStatistics, config),
        Commands::TopCities { .. } => run_query(Query::TopCitiesByState, config),
        Commands::All => {
            if config.io.output.is_some() {
                bail!("--output names a single file; use --output-dir with `all`");
            }
            let table = load_input(config)?;
            for query in Query::ALL {
                execute_query(query, table.clone(), config)?;
            }
            Ok(())
        }
        Commands::Inspect { sample } => inspect(sample, config),
        Commands::Config { command } => handle_config_command(command, config),
    }
}

fn load_input(config: &Config) -> Result<Table> {
    let input = &config.io.input;
    read_csv(input, &config.to_read_options())
        .with_context(|| format!("Failed to read sightings from {}", input.display()))
}

fn run_query(query: Query, config: &Config) -> Result<()> {
    let table = load_input(config)?;
    execute_query(query, table, config)
}

fn execute_query(query: Query, table: Table, config: &Config) -> Result<()> {
    let pipeline = query.pipeline(&config.query_params());
    log::info!("running {} ({} stages)", query.title(), pipeline.len());
    for (i, stage) in pipeline.describe().iter().enumerate() {
        log::info!("  {}: {}", i + 1, stage);
    }

    let mut result = pipeline
        .execute(table)
        .with_context(|| format!("{} failed", query.title()))?;
    if let Some(limit) = config.io.limit {
        result = head(&result, limit);
    }

    OutputWriter::new(config).emit(&result, Some(query))
}

fn inspect(sample: usize, config: &Config) -> Result<()> {
    let table = load_input(config)?;

    println!("File: {}", config.io.input.display());
    println!("Rows: {}", table.row_count());
    println!("Columns: {}", table.schema().len());
    for name in table.schema().names() {
        println!("  {}", name);
    }

    if sample > 0 {
        println!("\nSample ({} rows):", sample.min(table.row_count()));
        println!("{}", render(&head(&table, sample))?);
    }

    Ok(())
}

fn handle_config_command(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", text);
            Ok(())
        }
        ConfigCommands::Init { path } => {
            if path.exists() {
                bail!("Config file {} already exists", path.display());
            }
            create_default_config_file(&path)?;
            println!("Created default configuration at {}", path.display());
            Ok(())
        }
    }
}

fn setup_logging(config: &Config) {
    let log_level = match config.debug.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new().filter_level(log_level).init();
}
