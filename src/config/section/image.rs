//! `images` entries.
//!
//! Each entry describes one desired transform:
//!
//! ```json
//! {
//!   "sourcePath": "%res%/icons/*.svg",
//!   "targetPath": "build/icons/*.png",
//!   "tags": "icon,web",
//!   "resolution": "64x64",
//!   "proportional": true,
//!   "quality": 90,
//!   "optimize": false,
//!   "options": { "background": ["none"] }
//! }
//! ```
//!
//! Entries are deserialized leniently into [`ImageEntry`] and then checked
//! into an [`ImageSpec`], so every broken entry is reported in one pass.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, de};

use super::OptionMap;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::resolve::split_tags;

/// Upper bound accepted for `quality`.
const MAX_QUALITY: u32 = 100;

// ============================================================================
// raw entry
// ============================================================================

/// An `images` entry as written in the config document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub source_path: Option<String>,
    pub target_path: Option<String>,
    pub tags: Option<String>,
    pub resolution: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub proportional: Option<bool>,
    #[serde(default, deserialize_with = "lenient_quality")]
    pub quality: Option<u32>,
    #[serde(default)]
    pub options: OptionMap,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub optimize: Option<bool>,
}

impl ImageEntry {
    /// Check the entry, recording every problem under `images[index]`.
    ///
    /// Returns `None` when at least one required field is missing or invalid.
    pub fn to_spec(&self, index: usize, diag: &mut ConfigDiagnostics) -> Option<ImageSpec> {
        let field = |name: &str| FieldPath::entry("images", index, name);

        let source_path = required(&self.source_path, field("sourcePath"), diag);
        let target_path = required(&self.target_path, field("targetPath"), diag);

        let resolution = match self.resolution.as_deref() {
            Some(text) => match text.parse::<Resolution>() {
                Ok(resolution) => Some(resolution),
                Err(err) => {
                    diag.error_with_hint(
                        field("resolution"),
                        err.to_string(),
                        "use `<width>x<height>`, e.g. \"64x64\"",
                    );
                    None
                }
            },
            None => {
                diag.error(field("resolution"), "missing required field");
                None
            }
        };

        let quality = match self.quality {
            Some(q) if q > MAX_QUALITY => {
                diag.error(
                    field("quality"),
                    format!("{q} is out of range, expected 0..={MAX_QUALITY}"),
                );
                Err(())
            }
            Some(q) => Ok(u8::try_from(q).ok()),
            None => Ok(None),
        };

        let tags = self.tags.as_deref().map(split_tags).unwrap_or_default();
        if tags.is_empty() {
            diag.warn(field("tags"), "no tags, this entry is never selected");
        }

        Some(ImageSpec {
            source_path: source_path?,
            target_path: target_path?,
            tags,
            resolution: resolution?,
            proportional: self.proportional.unwrap_or(false),
            quality: quality.ok()?,
            options: self.options.clone(),
            optimize: self.optimize.unwrap_or(true),
        })
    }
}

fn required(
    value: &Option<String>,
    field: FieldPath,
    diag: &mut ConfigDiagnostics,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some("") => {
            diag.error(field, "must not be empty");
            None
        }
        Some(_) => value.clone(),
        None => {
            diag.error(field, "missing required field");
            None
        }
    }
}

/// Accept `true`/`false` as booleans or as strings.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Text(text)) => match text.trim() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other),
                &"a boolean or \"true\"/\"false\"",
            )),
        },
    }
}

/// Accept a whole number written as an integer, a float (`85.0`), or a
/// numeric string (`"85"`).
fn lenient_quality<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quality {
        Int(u32),
        Float(f64),
        Text(String),
    }

    let expected = &"a whole number between 0 and 100";
    let float = |value: f64| -> Result<u32, D::Error> {
        if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
            Ok(value as u32)
        } else {
            Err(de::Error::invalid_value(de::Unexpected::Float(value), expected))
        }
    };

    match Option::<Quality>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Quality::Int(value)) => Ok(Some(value)),
        Some(Quality::Float(value)) => float(value).map(Some),
        Some(Quality::Text(text)) => {
            let text = text.trim();
            match text.parse::<f64>() {
                Ok(value) => float(value).map(Some),
                Err(_) => Err(de::Error::invalid_value(de::Unexpected::Str(text), expected)),
            }
        }
    }
}

// ============================================================================
// checked spec
// ============================================================================

/// A checked image transform specification. Immutable for the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpec {
    /// Source pattern: may contain alias tokens and glob metacharacters.
    pub source_path: String,
    /// Target pattern: may contain alias tokens and a trailing `*.<ext>`.
    pub target_path: String,
    pub tags: Vec<String>,
    pub resolution: Resolution,
    pub proportional: bool,
    pub quality: Option<u8>,
    pub options: OptionMap,
    pub optimize: bool,
}

/// Target geometry, written `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resolution `{0}`")]
pub struct ResolutionError(String);

impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ResolutionError(s.to_string());
        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> ImageEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!(
            "64x32".parse::<Resolution>(),
            Ok(Resolution {
                width: 64,
                height: 32
            })
        );
        assert_eq!("2048X1536".parse::<Resolution>().unwrap().width, 2048);
        assert!("64".parse::<Resolution>().is_err());
        assert!("0x10".parse::<Resolution>().is_err());
        assert!("ax10".parse::<Resolution>().is_err());
        assert_eq!(
            Resolution {
                width: 8,
                height: 9
            }
            .to_string(),
            "8x9"
        );
    }

    #[test]
    fn test_string_booleans() {
        let e = entry(r#"{"proportional": "true", "optimize": "false"}"#);
        assert_eq!(e.proportional, Some(true));
        assert_eq!(e.optimize, Some(false));

        let e = entry(r#"{"proportional": false}"#);
        assert_eq!(e.proportional, Some(false));
        assert_eq!(e.optimize, None);

        assert!(serde_json::from_str::<ImageEntry>(r#"{"optimize": "yes"}"#).is_err());
    }

    #[test]
    fn test_lenient_quality() {
        assert_eq!(entry(r#"{"quality": 85}"#).quality, Some(85));
        assert_eq!(entry(r#"{"quality": 85.0}"#).quality, Some(85));
        assert_eq!(entry(r#"{"quality": " 70 "}"#).quality, Some(70));
        assert_eq!(entry(r#"{"quality": null}"#).quality, None);
        assert_eq!(entry("{}").quality, None);

        for bad in [r#"{"quality": 85.5}"#, r#"{"quality": -1}"#, r#"{"quality": "high"}"#] {
            assert!(serde_json::from_str::<ImageEntry>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_to_spec_defaults() {
        let e = entry(
            r#"{"sourcePath": "a.png", "targetPath": "b.png", "tags": " icon , ,web", "resolution": "16x16"}"#,
        );
        let mut diag = ConfigDiagnostics::new();
        let spec = e.to_spec(0, &mut diag).unwrap();

        assert_eq!(spec.tags, vec!["icon", "web"]);
        assert!(!spec.proportional);
        assert!(spec.optimize);
        assert_eq!(spec.quality, None);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_to_spec_reports_every_problem() {
        let e = entry(r#"{"targetPath": "", "resolution": "big", "quality": 140}"#);
        let mut diag = ConfigDiagnostics::new();
        assert!(e.to_spec(3, &mut diag).is_none());

        let fields: Vec<_> = diag.errors().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "images[3].sourcePath",
                "images[3].targetPath",
                "images[3].resolution",
                "images[3].quality",
            ]
        );
        // Missing tags only warns.
        assert_eq!(diag.warnings().len(), 1);
    }
}
