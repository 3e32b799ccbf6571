//! Resize and center-crop pixel buffers.
//!
//! Geometry comes from [`plan_resize`](super::calculations::plan_resize);
//! this module only moves pixels. Resampling is Lanczos3 throughout.

use super::calculations::plan_resize;
use super::codec::{ImagingError, PixelBuffer};
use super::params::SizeSpec;
use image::imageops::FilterType;

/// Apply `spec` to `image`, returning a new buffer.
///
/// `SizeSpec` is validated on construction, so every spec describes a
/// non-empty output. Plans larger than
/// [`MAX_PIXELS`](super::calculations::MAX_PIXELS) are refused with
/// [`ImagingError::InvalidSize`] before any pixels are allocated.
pub fn resize(image: &PixelBuffer, spec: &SizeSpec) -> Result<PixelBuffer, ImagingError> {
    let source = (image.width(), image.height());
    let plan = plan_resize(source, spec)?;

    let resized = if (plan.width, plan.height) == source {
        image.clone()
    } else {
        image.resize_exact(plan.width, plan.height, FilterType::Lanczos3)
    };

    Ok(match plan.crop {
        Some(crop) => resized.crop_imm(crop.x, crop.y, crop.width, crop.height),
        None => resized,
    })
}
