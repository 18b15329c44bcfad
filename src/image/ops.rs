//! Transform operations configured under `options`.
//!
//! ```json
//! "options": {
//!   "background": ["none"],
//!   "rotate": ["white", 90],
//!   "crop": [100, 100, 10, 10]
//! }
//! ```
//!
//! Each key names an operation and maps to a positional argument list.
//! Numbers may be given as JSON numbers or numeric strings. A scalar is
//! treated as a one-element list, `null` as an empty one.
//!
//! | Key          | Arguments                          |
//! |--------------|------------------------------------|
//! | `background` | color                              |
//! | `blur`       | radius, sigma?                     |
//! | `sharpen`    | radius, sigma?                     |
//! | `rotate`     | background color, degrees          |
//! | `flip`       | (vertical mirror)                  |
//! | `flop`       | (horizontal mirror)                |
//! | `strip`      | (drop profiles and comments)       |
//! | `negative`   |                                    |
//! | `monochrome` |                                    |
//! | `crop`       | width, height, x?, y?              |
//! | `extent`     | width, height                      |
//! | `gravity`    | direction                          |
//! | `colorspace` | name                               |
//! | `interlace`  | type                               |
//! | `density`    | x, y?                              |
//! | `trim`       |                                    |

use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::config::OptionMap;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("unknown option `{0}`, skipped")]
    Unknown(String),

    #[error("option `{name}` expects {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("option `{name}`: argument {index} {reason}")]
    Argument {
        name: &'static str,
        index: usize,
        reason: String,
    },
}

/// A checked transform operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOp {
    Background(String),
    Blur { radius: f32, sigma: Option<f32> },
    Sharpen { radius: f32, sigma: Option<f32> },
    Rotate { background: String, degrees: f32 },
    Flip,
    Flop,
    Strip,
    Negative,
    Monochrome,
    Crop { width: u32, height: u32, x: i64, y: i64 },
    Extent { width: u32, height: u32 },
    Gravity(String),
    Colorspace(String),
    Interlace(String),
    Density { x: u32, y: Option<u32> },
    Trim,
}

impl TransformOp {
    /// Parse one `options` entry.
    pub fn parse(key: &str, value: &Value) -> Result<Self, OpError> {
        let values: &[Value] = match value {
            Value::Array(items) => items.as_slice(),
            Value::Null => &[],
            other => std::slice::from_ref(other),
        };

        let op = match key {
            "background" => {
                let mut args = Args::new("background", values, "1")?;
                Self::Background(args.text()?)
            }
            "blur" | "sharpen" => {
                let name = if key == "blur" { "blur" } else { "sharpen" };
                let mut args = Args::new(name, values, "1 or 2")?;
                let radius = args.number()?;
                let sigma = args.optional_number()?;
                args.finish()?;
                if key == "blur" {
                    Self::Blur { radius, sigma }
                } else {
                    Self::Sharpen { radius, sigma }
                }
            }
            "rotate" => {
                let mut args = Args::new("rotate", values, "2")?;
                let background = args.text()?;
                let degrees = args.number()?;
                args.finish()?;
                Self::Rotate {
                    background,
                    degrees,
                }
            }
            "flip" => Args::flag("flip", values, Self::Flip)?,
            "flop" => Args::flag("flop", values, Self::Flop)?,
            "strip" => Args::flag("strip", values, Self::Strip)?,
            "negative" => Args::flag("negative", values, Self::Negative)?,
            "monochrome" => Args::flag("monochrome", values, Self::Monochrome)?,
            "trim" => Args::flag("trim", values, Self::Trim)?,
            "crop" => {
                let mut args = Args::new("crop", values, "2 to 4")?;
                let width = args.number()?;
                let height = args.number()?;
                let x = args.optional_number()?.unwrap_or(0);
                let y = args.optional_number()?.unwrap_or(0);
                args.finish()?;
                Self::Crop {
                    width,
                    height,
                    x,
                    y,
                }
            }
            "extent" => {
                let mut args = Args::new("extent", values, "2")?;
                let width = args.number()?;
                let height = args.number()?;
                args.finish()?;
                Self::Extent { width, height }
            }
            "gravity" => Self::Gravity(Args::new("gravity", values, "1")?.single_text()?),
            "colorspace" => Self::Colorspace(Args::new("colorspace", values, "1")?.single_text()?),
            "interlace" => Self::Interlace(Args::new("interlace", values, "1")?.single_text()?),
            "density" => {
                let mut args = Args::new("density", values, "1 or 2")?;
                let x = args.number()?;
                let y = args.optional_number()?;
                args.finish()?;
                Self::Density { x, y }
            }
            other => return Err(OpError::Unknown(other.to_string())),
        };
        Ok(op)
    }

    /// The `options` key this operation is configured with.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background(_) => "background",
            Self::Blur { .. } => "blur",
            Self::Sharpen { .. } => "sharpen",
            Self::Rotate { .. } => "rotate",
            Self::Flip => "flip",
            Self::Flop => "flop",
            Self::Strip => "strip",
            Self::Negative => "negative",
            Self::Monochrome => "monochrome",
            Self::Crop { .. } => "crop",
            Self::Extent { .. } => "extent",
            Self::Gravity(_) => "gravity",
            Self::Colorspace(_) => "colorspace",
            Self::Interlace(_) => "interlace",
            Self::Density { .. } => "density",
            Self::Trim => "trim",
        }
    }

    /// Settings that must precede the input file (they affect decoding).
    pub fn is_read_setting(&self) -> bool {
        matches!(self, Self::Background(_) | Self::Density { .. })
    }

    /// ImageMagick command-line form.
    pub fn magick_args(&self) -> Vec<String> {
        let flag = |f: &str| vec![f.to_string()];
        let pair = |f: &str, v: String| vec![f.to_string(), v];

        match self {
            Self::Background(color) => pair("-background", color.clone()),
            Self::Blur { radius, sigma } => pair("-blur", geometry_f(*radius, *sigma)),
            Self::Sharpen { radius, sigma } => pair("-sharpen", geometry_f(*radius, *sigma)),
            Self::Rotate {
                background,
                degrees,
            } => vec![
                "-background".into(),
                background.clone(),
                "-rotate".into(),
                degrees.to_string(),
            ],
            Self::Flip => flag("-flip"),
            Self::Flop => flag("-flop"),
            Self::Strip => flag("-strip"),
            Self::Negative => flag("-negate"),
            Self::Monochrome => flag("-monochrome"),
            Self::Crop {
                width,
                height,
                x,
                y,
            } => pair("-crop", format!("{width}x{height}{x:+}{y:+}")),
            Self::Extent { width, height } => pair("-extent", format!("{width}x{height}")),
            Self::Gravity(direction) => pair("-gravity", direction.clone()),
            Self::Colorspace(name) => pair("-colorspace", name.clone()),
            Self::Interlace(kind) => pair("-interlace", kind.clone()),
            Self::Density { x, y: Some(y) } => pair("-density", format!("{x}x{y}")),
            Self::Density { x, y: None } => pair("-density", x.to_string()),
            Self::Trim => flag("-trim"),
        }
    }
}

fn geometry_f(radius: f32, sigma: Option<f32>) -> String {
    match sigma {
        Some(sigma) => format!("{radius}x{sigma}"),
        None => radius.to_string(),
    }
}

// ============================================================================
// argument cursor
// ============================================================================

/// Positional argument reader for one option.
struct Args<'a> {
    name: &'static str,
    values: &'a [Value],
    expected: &'static str,
    pos: usize,
}

impl<'a> Args<'a> {
    fn new(name: &'static str, values: &'a [Value], expected: &'static str) -> Result<Self, OpError> {
        if values.is_empty() {
            return Err(OpError::Arity {
                name,
                expected,
                got: 0,
            });
        }
        Ok(Self {
            name,
            values,
            expected,
            pos: 0,
        })
    }

    fn flag(name: &'static str, values: &[Value], op: TransformOp) -> Result<TransformOp, OpError> {
        if values.is_empty() {
            Ok(op)
        } else {
            Err(OpError::Arity {
                name,
                expected: "no",
                got: values.len(),
            })
        }
    }

    fn next(&mut self) -> Result<&'a Value, OpError> {
        let value = self.values.get(self.pos).ok_or(OpError::Arity {
            name: self.name,
            expected: self.expected,
            got: self.values.len(),
        })?;
        self.pos += 1;
        Ok(value)
    }

    fn invalid(&self, reason: impl Into<String>) -> OpError {
        OpError::Argument {
            name: self.name,
            index: self.pos,
            reason: reason.into(),
        }
    }

    fn text(&mut self) -> Result<String, OpError> {
        match self.next()? {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(self.invalid(format!("must be a string, got `{other}`"))),
        }
    }

    fn single_text(mut self) -> Result<String, OpError> {
        let text = self.text()?;
        self.finish()?;
        Ok(text)
    }

    fn number<T: FromStr>(&mut self) -> Result<T, OpError> {
        let value = self.next()?;
        let text = match value {
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.trim().to_string(),
            other => return Err(self.invalid(format!("must be a number, got `{other}`"))),
        };
        text.parse()
            .map_err(|_| self.invalid(format!("`{text}` is not a valid number")))
    }

    fn optional_number<T: FromStr>(&mut self) -> Result<Option<T>, OpError> {
        if self.pos < self.values.len() {
            self.number().map(Some)
        } else {
            Ok(None)
        }
    }

    fn finish(&self) -> Result<(), OpError> {
        if self.pos == self.values.len() {
            Ok(())
        } else {
            Err(OpError::Arity {
                name: self.name,
                expected: self.expected,
                got: self.values.len(),
            })
        }
    }
}

// ============================================================================
// planning
// ============================================================================

/// Operations for one job, plus a warning per skipped option.
#[derive(Debug, Default)]
pub struct OpPlan {
    pub ops: Vec<TransformOp>,
    pub warnings: Vec<String>,
}

/// Layer per-image options over global ones and parse the result.
///
/// Global options keep their order; a per-image entry replaces the global
/// entry of the same key in place, new keys are appended. A broken entry
/// is skipped with a warning and never affects the others.
pub fn plan_ops(global: &OptionMap, local: &OptionMap) -> OpPlan {
    let mut merged = global.clone();
    for (key, value) in local {
        merged.insert(key.clone(), value.clone());
    }

    let mut plan = OpPlan::default();
    for (key, value) in &merged {
        match TransformOp::parse(key, value) {
            Ok(op) => plan.ops.push(op),
            Err(err) => plan.warnings.push(err.to_string()),
        }
    }
    plan
}
