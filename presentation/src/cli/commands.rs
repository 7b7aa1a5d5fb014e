//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the end-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON summary
    Json,
}

/// Edit model selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Faster, cheaper generation model
    Fast,
    /// Higher-fidelity generation model
    Quality,
}

impl PolicyArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyArg::Fast => "fast",
            PolicyArg::Quality => "quality",
        }
    }
}

/// CLI arguments for refract
#[derive(Parser, Debug)]
#[command(name = "refract")]
#[command(author, version, about = "Critique, edit, re-review and publish photographs")]
#[command(long_about = r#"
Refract processes every photograph in the inbox:

1. Critique: all configured vision backends score the photo in parallel
2. Edit: an image-generation model applies the combined improvements
3. Re-review: the edited photo is scored again by the same backends
4. Publish: original, edit and metadata are archived and the site index rebuilt

Configuration files are loaded from (in priority order):
1. REFRACT_<SECTION>__<KEY>   Environment variables
2. --config <path>            Explicit config file
3. ./refract.toml             Project-level config
4. ~/.config/refract/config.toml   Global config

Example:
  refract
  refract --inbox ~/Pictures/new --workers 2
  refract --dry-run -v
"#)]
pub struct Cli {
    /// Directory to read photographs from
    #[arg(long, value_name = "DIR")]
    pub inbox: Option<PathBuf>,

    /// Critique only: no edits, no archive, no site rebuild
    #[arg(long)]
    pub dry_run: bool,

    /// Number of generation passes per image
    #[arg(long, value_name = "N")]
    pub passes: Option<usize>,

    /// Generation model (overrides the policy)
    #[arg(long, value_name = "MODEL")]
    pub edit_model: Option<String>,

    /// Edit model policy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Maximum images processed concurrently
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Summary output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Default tracing filter for the verbosity flags
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
