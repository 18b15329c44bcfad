//! Configuration section definitions.
//!
//! | Module        | Config key     | Purpose                              |
//! |---------------|----------------|--------------------------------------|
//! | `image`       | `images`       | Image transform specifications       |
//! | `optimize`    | `optimize`     | Lossless optimizer settings          |
//! | `transformer` | `transformer`  | Image transform backend              |

mod image;
mod optimize;
mod transformer;

pub use self::image::{ImageEntry, ImageSpec, Resolution};
pub use optimize::{OptimizeSettings, OptimizerSetting};
pub use transformer::TransformerKind;

/// Operation name to positional argument list, in declaration order.
pub type OptionMap = serde_json::Map<String, serde_json::Value>;
