//! Configuration management for ufoq
//!
//! Settings come from, in increasing priority: built-in defaults, a TOML
//! configuration file, `UFOQ_*` environment variables and command-line flags.

use crate::cli::Cli;
use ufoq_core::{Error, QueryParams, Result};
use ufoq_io::ReadOptions;

use serde::{Deserialize, Serialize};

use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for the ufoq binary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input/output configuration
    pub io: IoConfig,
    /// CSV parsing configuration
    pub csv: CsvConfig,
    /// Query thresholds and limits
    pub queries: QueryConfig,
    /// Debug and diagnostic configuration
    pub debug: DebugConfig,
}

/// Input/output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Sightings CSV file
    pub input: PathBuf,
    /// File a single query result is written to
    pub output: Option<PathBuf>,
    /// Directory query results are written to, one file per query
    pub output_dir: Option<PathBuf>,
    /// Maximum number of rows to output
    pub limit: Option<usize>,
}

/// CSV parsing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Field separator
    pub separator: String,
    /// Whether the first line is a header
    pub has_header: bool,
}

/// Query thresholds, mirroring [`QueryParams`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub country: String,
    pub shape: String,
    pub disk_limit: usize,
    pub long_limit: usize,
    pub long_min_seconds: f64,
    pub country_limit: usize,
    pub shape_min_count: i64,
    pub shape_limit: usize,
    pub top_k: usize,
    pub top_cities_limit: usize,
}

/// Debug and diagnostic configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Verbosity level (0-3)
    pub verbosity: u8,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("ufo_sighting_data.csv"),
            output: None,
            output_dir: None,
            limit: None,
        }
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            has_header: true,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        let params = QueryParams::default();
        Self {
            country: params.country,
            shape: params.shape,
            disk_limit: params.disk_limit,
            long_limit: params.long_limit,
            long_min_seconds: params.long_min_seconds,
            country_limit: params.country_limit,
            shape_min_count: params.shape_min_count,
            shape_limit: params.shape_limit,
            top_k: params.top_k,
            top_cities_limit: params.top_cities_limit,
        }
    }
}

impl Config {
    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    /// Load configuration from the default file locations and the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file(None) {
            log::debug!("using config file {}", config_path.display());
            config.merge_file(&config_path)?;
        }

        config.merge_env()?;

        Ok(config)
    }

    /// Find configuration file in standard locations
    pub(crate) fn find_config_file(current_dir: Option<&Path>) -> Option<PathBuf> {
        let current_dir = match current_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        for name in ["ufoq.toml", ".ufoq.toml"] {
            let path = current_dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            let path = Path::new(&home)
                .join(".config")
                .join("ufoq")
                .join("ufoq.toml");
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Merge configuration from a TOML file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file_config: Config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid TOML config: {}", e)))?;
        self.merge(file_config);

        Ok(())
    }

    fn merge_env(&mut self) -> Result<()> {
        self.merge_env_with_reader(|key| std::env::var(key).ok())
    }

    /// Merge configuration from environment variables with a custom reader
    fn merge_env_with_reader<F>(&mut self, env_reader: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = env_reader("UFOQ_INPUT") {
            self.io.input = PathBuf::from(val);
        }

        if let Some(val) = env_reader("UFOQ_OUTPUT_DIR") {
            self.io.output_dir = Some(PathBuf::from(val));
        }

        if let Some(val) = env_reader("UFOQ_VERBOSITY") {
            match val.parse() {
                Ok(level) => self.debug.verbosity = level,
                Err(_) => log::warn!("ignoring UFOQ_VERBOSITY={val}: not a number"),
            }
        }

        if let Some(val) = env_reader("UFOQ_TOP_K") {
            self.queries.top_k = val
                .parse()
                .map_err(|_| Error::config(format!("UFOQ_TOP_K must be a count, got '{val}'")))?;
        }

        Ok(())
    }

    /// Merge another config into this one, taking its non-default fields
    fn merge(&mut self, other: Config) {
        let io_default = IoConfig::default();
        if other.io.input != io_default.input {
            self.io.input = other.io.input;
        }
        if other.io.output.is_some() {
            self.io.output = other.io.output;
        }
        if other.io.output_dir.is_some() {
            self.io.output_dir = other.io.output_dir;
        }
        if other.io.limit.is_some() {
            self.io.limit = other.io.limit;
        }

        let csv_default = CsvConfig::default();
        if other.csv.separator != csv_default.separator {
            self.csv.separator = other.csv.separator;
        }
        if other.csv.has_header != csv_default.has_header {
            self.csv.has_header = other.csv.has_header;
        }

        if other.queries != QueryConfig::default() {
            self.merge_queries(other.queries);
        }

        if other.debug.verbosity != DebugConfig::default().verbosity {
            self.debug.verbosity = other.debug.verbosity;
        }
    }

    fn merge_queries(&mut self, other: QueryConfig) {
        let default = QueryConfig::default();
        if other.country != default.country {
            self.queries.country = other.country;
        }
        if other.shape != default.shape {
            self.queries.shape = other.shape;
        }
        if other.disk_limit != default.disk_limit {
            self.queries.disk_limit = other.disk_limit;
        }
        if other.long_limit != default.long_limit {
            self.queries.long_limit = other.long_limit;
        }
        if other.long_min_seconds != default.long_min_seconds {
            self.queries.long_min_seconds = other.long_min_seconds;
        }
        if other.country_limit != default.country_limit {
            self.queries.country_limit = other.country_limit;
        }
        if other.shape_min_count != default.shape_min_count {
            self.queries.shape_min_count = other.shape_min_count;
        }
        if other.shape_limit != default.shape_limit {
            self.queries.shape_limit = other.shape_limit;
        }
        if other.top_k != default.top_k {
            self.queries.top_k = other.top_k;
        }
        if other.top_cities_limit != default.top_cities_limit {
            self.queries.top_cities_limit = other.top_cities_limit;
        }
    }

    /// Apply command-line flags, including subcommand options
    pub fn apply_cli(&mut self, cli: &Cli) {
        use crate::cli::Commands;

        if let Some(input) = &cli.input {
            self.io.input = input.clone();
        }
        if let Some(output) = &cli.output {
            self.io.output = Some(output.clone());
        }
        if let Some(dir) = &cli.output_dir {
            self.io.output_dir = Some(dir.clone());
        }
        if cli.limit.is_some() {
            self.io.limit = cli.limit;
        }
        if let Some(sep) = &cli.csv_separator {
            self.csv.separator = sep.clone();
        }
        if cli.verbose > 0 {
            self.debug.verbosity = cli.verbose;
        }

        match &cli.command {
            Commands::Disk { country, shape } => {
                if let Some(country) = country {
                    self.queries.country = country.clone();
                }
                if let Some(shape) = shape {
                    self.queries.shape = shape.clone();
                }
            }
            Commands::Long { min_seconds } => {
                if let Some(secs) = min_seconds {
                    self.queries.long_min_seconds = *secs;
                }
            }
            Commands::Shapes { min_count } => {
                if let Some(count) = min_count {
                    self.queries.shape_min_count = *count;
                }
            }
            Commands::TopCities { top_k } => {
                if let Some(k) = top_k {
                    self.queries.top_k = *k;
                }
            }
            Commands::Countries | Commands::All | Commands::Inspect { .. } => {}
            Commands::Config { .. } => {}
        }
    }

    /// Reader options for the input file
    pub fn to_read_options(&self) -> ReadOptions {
        ReadOptions {
            separator: self.csv.separator.bytes().next().unwrap_or(b','),
            has_header: self.csv.has_header,
            max_rows: None,
        }
    }

    /// Query parameters for the analyses
    pub fn query_params(&self) -> QueryParams {
        let q = &self.queries;
        QueryParams {
            country: q.country.clone(),
            shape: q.shape.clone(),
            disk_limit: q.disk_limit,
            long_limit: q.long_limit,
            long_min_seconds: q.long_min_seconds,
            country_limit: q.country_limit,
            shape_min_count: q.shape_min_count,
            shape_limit: q.shape_limit,
            top_k: q.top_k,
            top_cities_limit: q.top_cities_limit,
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Create a default config file template
pub fn create_default_config_file(path: &Path) -> Result<()> {
    Config::default().save(path)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.io.input.as_os_str().is_empty() {
        return Err(Error::config("Input path must not be empty"));
    }

    if config.queries.top_k == 0 {
        return Err(Error::config("top_k must be greater than 0"));
    }

    if config.csv.separator.len() != 1 {
        return Err(Error::config(
            "CSV separator must be a single-byte character",
        ));
    }

    if config.debug.verbosity > 3 {
        log::warn!("verbosity {} is treated as 3", config.debug.verbosity);
    }

    Ok(())
}
