//! `optimize` section.
//!
//! Lossless post-processing of written images.
//!
//! ```json
//! "optimize": {
//!   "optipng": "-o2",
//!   "jpgtran": false
//! }
//! ```
//!
//! An absent key runs the tool with no extra arguments, `false` disables
//! it, and a string is split on whitespace into extra arguments.

use serde::{Deserialize, Deserializer};

/// Per-tool optimizer settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptimizeSettings {
    /// Settings for `optipng` (PNG targets).
    pub optipng: OptimizerSetting,
    /// Settings for `jpegtran` (JPEG targets).
    #[serde(alias = "jpegtran")]
    pub jpgtran: OptimizerSetting,
}

/// How one optimizer tool is invoked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OptimizerSetting {
    /// Key absent (or `true`): run with no extra arguments.
    #[default]
    Default,
    /// `false`: never run.
    Disabled,
    /// Extra arguments placed before the output flags.
    Args(String),
}

impl OptimizerSetting {
    /// Extra arguments, or `None` when the tool is disabled.
    pub fn args(&self) -> Option<Vec<String>> {
        match self {
            Self::Default => Some(Vec::new()),
            Self::Disabled => None,
            Self::Args(args) => Some(args.split_whitespace().map(str::to_string).collect()),
        }
    }
}

impl<'de> Deserialize<'de> for OptimizerSetting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Args(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Flag(true)) => Self::Default,
            Some(Raw::Flag(false)) => Self::Disabled,
            Some(Raw::Args(args)) => Self::Args(args),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> OptimizeSettings {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_absent_means_default() {
        let settings = parse("{}");
        assert_eq!(settings.optipng, OptimizerSetting::Default);
        assert_eq!(settings.optipng.args(), Some(vec![]));
    }

    #[test]
    fn test_false_disables() {
        let settings = parse(r#"{"optipng": false, "jpgtran": "-copy none  -optimize"}"#);
        assert_eq!(settings.optipng.args(), None);
        assert_eq!(
            settings.jpgtran.args(),
            Some(vec!["-copy".into(), "none".into(), "-optimize".into()])
        );
    }

    #[test]
    fn test_jpegtran_alias() {
        let settings = parse(r#"{"jpegtran": false}"#);
        assert_eq!(settings.jpgtran, OptimizerSetting::Disabled);
    }
}
