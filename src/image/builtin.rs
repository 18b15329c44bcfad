//! Pure-Rust backend built on the `image` crate.
//!
//! Covers the common path (decode, a subset of operations, resize, encode)
//! without any external program. Operations it cannot express are skipped
//! with a warning; SVG sources are not supported.

use std::{fs::File, io::BufWriter};

use image::{
    DynamicImage, ImageError, ImageFormat, codecs::jpeg::JpegEncoder, imageops::FilterType,
};

use super::{
    ops::TransformOp,
    transform::{TransformError, Transformer},
};
use crate::resolve::ResolvedJob;

/// JPEG quality used when the job sets none.
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Luma threshold for `monochrome`.
const MONOCHROME_THRESHOLD: u8 = 128;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTransformer;

impl Transformer for BuiltinTransformer {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn render(&self, job: &ResolvedJob, ops: &[TransformOp]) -> Result<Vec<String>, TransformError> {
        let mut img = image::open(&job.source_path).map_err(|source| TransformError::Decode {
            path: job.source_path.clone(),
            source,
        })?;

        let mut warnings = Vec::new();
        for op in ops {
            match apply(img, op) {
                Ok(next) => img = next,
                Err((unchanged, reason)) => {
                    img = unchanged;
                    let warning = format!("option `{}` skipped: {reason}", op.name());
                    crate::log!("warning"; "{warning}");
                    warnings.push(warning);
                }
            }
        }

        let res = job.resolution;
        let img = if job.proportional {
            img.resize(res.width, res.height, FilterType::Lanczos3)
        } else {
            img.resize_exact(res.width, res.height, FilterType::Lanczos3)
        };

        let encode_err = |source: ImageError| TransformError::Encode {
            path: job.target_path.clone(),
            source,
        };
        let format = ImageFormat::from_path(&job.target_path).map_err(encode_err)?;

        if format == ImageFormat::Jpeg {
            let quality = job.quality.unwrap_or(DEFAULT_JPEG_QUALITY).clamp(1, 100);
            let file = File::create(&job.target_path)
                .map_err(|err| encode_err(ImageError::IoError(err)))?;
            let mut writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        } else {
            if job.quality.is_some() {
                warnings.push(format!(
                    "quality is ignored for {format:?} output by the builtin transformer"
                ));
            }
            img.save_with_format(&job.target_path, format)
                .map_err(encode_err)?;
        }

        Ok(warnings)
    }
}

/// Apply one operation. On failure the image is handed back with a reason.
fn apply(img: DynamicImage, op: &TransformOp) -> Result<DynamicImage, (DynamicImage, String)> {
    match op {
        TransformOp::Blur { radius, sigma } => {
            let sigma = sigma.unwrap_or(*radius);
            if sigma > 0.0 {
                Ok(img.blur(sigma))
            } else {
                Ok(img)
            }
        }
        TransformOp::Sharpen { radius, sigma } => Ok(img.unsharpen(sigma.unwrap_or(*radius), 0)),
        TransformOp::Rotate { degrees, .. } => match degrees.rem_euclid(360.0) {
            d if d == 0.0 => Ok(img),
            d if d == 90.0 => Ok(img.rotate90()),
            d if d == 180.0 => Ok(img.rotate180()),
            d if d == 270.0 => Ok(img.rotate270()),
            _ => Err((img, "only multiples of 90 degrees are supported".into())),
        },
        TransformOp::Flip => Ok(img.flipv()),
        TransformOp::Flop => Ok(img.fliph()),
        // Encoders here never write metadata.
        TransformOp::Strip => Ok(img),
        TransformOp::Negative => {
            let mut img = img;
            img.invert();
            Ok(img)
        }
        TransformOp::Monochrome => {
            let mut luma = img.to_luma8();
            for pixel in luma.pixels_mut() {
                pixel.0[0] = if pixel.0[0] >= MONOCHROME_THRESHOLD { 255 } else { 0 };
            }
            Ok(DynamicImage::ImageLuma8(luma))
        }
        TransformOp::Crop {
            width,
            height,
            x,
            y,
        } => {
            let x = u32::try_from((*x).max(0)).unwrap_or(u32::MAX);
            let y = u32::try_from((*y).max(0)).unwrap_or(u32::MAX);
            if x >= img.width() || y >= img.height() {
                return Err((img, "crop origin lies outside the image".into()));
            }
            Ok(img.crop_imm(x, y, *width, *height))
        }
        TransformOp::Background(_)
        | TransformOp::Extent { .. }
        | TransformOp::Gravity(_)
        | TransformOp::Colorspace(_)
        | TransformOp::Interlace(_)
        | TransformOp::Density { .. }
        | TransformOp::Trim => Err((img, "not supported by the builtin transformer".into())),
    }
}
