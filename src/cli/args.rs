//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::config::TransformerKind;

/// Resize, convert and optimize image sets described in one config file
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: config.json)
    #[arg(short = 'C', long, default_value = "config.json", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Local override config, merged over the main config when present
    #[arg(short = 'L', long, default_value = "config-local.json", value_hint = clap::ValueHint::FilePath)]
    pub config_local: PathBuf,

    /// Only build images carrying one of these tags (comma separated)
    #[arg(short, long, value_delimiter = ',', default_value = "all")]
    pub tags: Vec<String>,

    /// Image transform backend (overrides `transformer` in the config)
    #[arg(long, value_enum)]
    pub transformer: Option<TransformerKind>,

    /// Print the resolved jobs without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short = 'V', long)]
    pub verbose: bool,
}
