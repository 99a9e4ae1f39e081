//! Command-line interface for ufoq
//!
//! Argument parsing with clap. Global flags apply to every subcommand and are
//! layered over the configuration file and environment by
//! [`Config::apply_cli`](crate::config::Config::apply_cli).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ufoq - grouped ranking queries over UFO sighting data
///
/// ufoq reads the sightings CSV, runs one of the built-in analyses and prints
/// the result or writes it as CSV.
#[derive(Parser, Debug)]
#[command(name = "ufoq")]
#[command(author, version, about)]
#[command(after_help = "EXAMPLES:\n  \
    # Top 5 cities per state, written as CSV\n  \
    ufoq top-cities -o query_results/top_cities.csv\n\n  \
    # Shapes seen at least 500 times\n  \
    ufoq shapes --min-count 500\n\n  \
    # Run every analysis against another file\n  \
    ufoq --input sightings.csv all\n\n  \
    # Look at the raw data\n  \
    ufoq inspect --sample 10")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Sightings CSV file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub input: Option<PathBuf>,

    /// Write the result to this CSV file instead of printing it
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Write results as CSV files into this directory, one per query
    #[arg(long, value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of rows to output
    #[arg(long, value_name = "N", global = true)]
    pub limit: Option<usize>,

    /// CSV field separator
    #[arg(long = "csv-separator", value_name = "SEP", global = true)]
    pub csv_separator: Option<String>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file to use
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Sightings of one shape in one country, most recent first
    Disk {
        /// Country code to keep
        #[arg(long)]
        country: Option<String>,

        /// Shape to keep
        #[arg(long)]
        shape: Option<String>,
    },

    /// Encounters lasting at least a given number of seconds, longest first
    Long {
        /// Minimum encounter length in seconds
        #[arg(long, value_name = "SECONDS")]
        min_seconds: Option<f64>,
    },

    /// Number of sightings per country
    Countries,

    /// Duration statistics per shape
    Shapes {
        /// Minimum number of sightings for a shape to be listed
        #[arg(long, value_name = "N")]
        min_count: Option<i64>,
    },

    /// The most sighted cities of every state
    #[command(after_help = "EXAMPLES:\n  \
        ufoq top-cities -k 3\n  \
        ufoq top-cities --output-dir query_results")]
    TopCities {
        /// Cities to keep per state (ties can add more)
        #[arg(short = 'k', long, value_name = "K")]
        top_k: Option<usize>,
    },

    /// Run every analysis in turn
    All,

    /// Show row count, columns and the first rows of the input
    Inspect {
        /// Rows to show
        #[arg(long, value_name = "N", default_value_t = 5)]
        sample: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Where to write the file
        path: PathBuf,
    },
}

/// Parse command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Parse command-line arguments from a vector (for testing)
#[cfg(test)]
pub fn parse_args_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
