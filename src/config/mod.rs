//! Pipeline configuration (`config.json`, optionally `config-local.json`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/         # Configuration section definitions
//! │   ├── image        # images[]
//! │   ├── optimize     # optimize { optipng, jpgtran }
//! │   └── transformer  # transformer
//! ├── types/           # Utility types
//! │   ├── error        # ConfigError, ConfigDiagnostics
//! │   └── field        # FieldPath
//! ├── util.rs          # Document reading and merging
//! └── mod.rs           # PipelineConfig (this file)
//! ```
//!
//! # Keys
//!
//! | Key           | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `basePath`    | Root for relative source/target patterns         |
//! | `aliases`     | Ordered `{name, path}` text substitutions        |
//! | `images`      | Image transform specifications                   |
//! | `options`     | Transform operations applied to every image      |
//! | `optimize`    | Lossless optimizer settings                      |
//! | `transformer` | `magick` (default) or `builtin`                  |
//!
//! The document may be JSON or TOML (chosen by file extension). Entries of
//! `images` and `aliases` that are not objects are treated as comments.

pub mod section;
pub mod types;
mod util;

use util::{drop_comment_entries, merge_documents, read_document, resolve_base_path};

// Re-export from section/
pub use section::{
    ImageEntry, ImageSpec, OptimizeSettings, OptimizerSetting, OptionMap, Resolution,
    TransformerKind,
};

// Re-export from types/
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::Cli,
    debug, log,
    resolve::{Alias, AliasTable},
    utils::path::anchor,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

// ============================================================================
// document shape
// ============================================================================

/// The config document as written, before checking.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    base_path: Option<String>,
    #[serde(default)]
    aliases: Vec<Alias>,
    #[serde(default)]
    images: Vec<ImageEntry>,
    #[serde(default)]
    options: OptionMap,
    #[serde(default)]
    optimize: OptimizeSettings,
    #[serde(default)]
    transformer: TransformerKind,
}

// ============================================================================
// root configuration
// ============================================================================

/// Checked pipeline configuration. Built once, then passed by reference.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Absolute path to the main config file.
    pub config_path: PathBuf,
    /// Root against which relative patterns are resolved.
    pub base_path: PathBuf,
    /// Prepared alias table (aliases substituted into each other).
    pub aliases: AliasTable,
    pub images: Vec<ImageSpec>,
    /// Operations applied to every image before per-image options.
    pub options: OptionMap,
    pub optimize: OptimizeSettings,
    pub transformer: TransformerKind,
}

impl PipelineConfig {
    /// Load the main config, merge the local one over it, and check the result.
    ///
    /// Both paths are taken relative to the current directory. A missing main
    /// config is fatal; a missing local config is only reported.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let config_path = anchor(&cwd, &cli.config);
        if !config_path.is_file() {
            return Err(ConfigError::NotFound(cli.config.clone(), cwd).into());
        }
        log!("ok"; "{} exists", cli.config.display());

        let mut doc = read_document(&config_path)?;
        log!("ok"; "parsing {} succeeded", cli.config.display());

        let local_path = anchor(&cwd, &cli.config_local);
        if local_path.is_file() {
            let local = read_document(&local_path)?;
            log!("ok"; "parsing {} succeeded", cli.config_local.display());
            merge_documents(&mut doc, local);
        } else {
            log!(
                "info";
                "{} does not exist in `{}`",
                cli.config_local.display(),
                cwd.display()
            );
        }

        let mut config = Self::from_value(doc, &config_path)?;
        if let Some(kind) = cli.transformer {
            config.transformer = kind;
        }

        debug!("config"; "base dir for paths is {}", config.base_path.display());
        debug!(
            "config";
            "{} alias(es), {} image spec(s)",
            config.aliases.len(),
            config.images.len()
        );
        Ok(config)
    }

    /// Build a config from an already merged document.
    ///
    /// `config_path` anchors a relative `basePath` and names the document in
    /// errors. Warnings are printed; errors are returned together.
    pub fn from_value(doc: Value, config_path: &Path) -> Result<Self, ConfigError> {
        let (config, diag) = Self::parse(doc, config_path)?;
        diag.print_warnings();
        Ok(config)
    }

    fn parse(mut doc: Value, config_path: &Path) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        if !doc.is_object() {
            return Err(ConfigError::Validation(format!(
                "`{}` must contain an object at the top level",
                config_path.display()
            )));
        }

        let image_index = drop_comment_entries(&mut doc, "images");
        let alias_index = drop_comment_entries(&mut doc, "aliases");

        let mut ignored = Vec::new();
        let raw: RawConfig = serde_ignored::deserialize(doc, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(|err| ConfigError::Json(config_path.to_path_buf(), err))?;

        let mut diag = ConfigDiagnostics::new();
        for field in ignored {
            diag.warn(FieldPath::from(field), "unknown field, ignored");
        }

        for (alias, &index) in raw.aliases.iter().zip(&alias_index) {
            if alias.name.is_empty() {
                diag.error_with_hint(
                    FieldPath::entry("aliases", index, "name"),
                    "must not be empty",
                    "an alias name is the text replaced in paths, e.g. \"%res%\"",
                );
            }
        }

        if raw.images.is_empty() {
            diag.warn(FieldPath::new("images"), "no images configured");
        }

        let images: Vec<ImageSpec> = raw
            .images
            .iter()
            .zip(&image_index)
            .filter_map(|(entry, &index)| entry.to_spec(index, &mut diag))
            .collect();

        if diag.has_errors() {
            return Err(ConfigError::Diagnostics(diag));
        }

        let config_dir = config_path.parent().unwrap_or(Path::new(""));
        let config = Self {
            config_path: config_path.to_path_buf(),
            base_path: resolve_base_path(raw.base_path.as_deref(), config_dir),
            aliases: AliasTable::prepare(raw.aliases),
            images,
            options: raw.options,
            optimize: raw.optimize,
            transformer: raw.transformer,
        };

        Ok((config, diag))
    }
}

/// Parse a JSON config located at `/project/config.json` (test helper).
#[cfg(test)]
pub fn test_parse_config(json: &str) -> PipelineConfig {
    let doc: Value = serde_json::from_str(json).unwrap();
    let (config, diag) =
        PipelineConfig::parse(doc, Path::new("/project/config.json")).unwrap();
    assert!(
        diag.warnings().is_empty(),
        "test config has warnings: {:?}",
        diag.warnings()
    );
    config
}

// ============================================================================
// tests
// ============================================================================
