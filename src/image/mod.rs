//! Image processing: transform backends and lossless optimizers.
//!
//! # Modules
//!
//! - [`ops`]: typed transform operations parsed from `options`
//! - [`transform`]: `Transformer` trait and the per-job driver
//! - [`magick`]: ImageMagick backend
//! - [`builtin`]: pure-Rust backend
//! - [`optimize`]: `optipng` / `jpegtran` post-processing

pub mod builtin;
pub mod magick;
pub mod ops;
pub mod optimize;
pub mod transform;

pub use optimize::{OptimizeError, OptimizeOutcome, Optimizer};
pub use transform::{TransformError, Transformer, create_transformer, transform};
