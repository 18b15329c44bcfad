//! imgforge - A declarative image build pipeline.
//!
//! Reads a config of image specs, selects them by tag, expands aliases and
//! globs into concrete jobs, then resizes, converts and optimizes each one.

mod cli;
mod config;
mod image;
mod logger;
mod pipeline;
mod resolve;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, build::build_images};
use config::PipelineConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = PipelineConfig::load(&cli)?;
    build_images(&config, &cli)?;
    Ok(())
}
