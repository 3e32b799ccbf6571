//! Pure calculation functions for resize and crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Derived pixel counts truncate toward zero; a side that would truncate to
//! zero is kept at one pixel.

use super::codec::ImagingError;
use super::params::{ScaleFactor, SizeSpec, TargetBox};

/// Largest intermediate image a plan may allocate (16384 x 16384 pixels).
pub const MAX_PIXELS: u64 = 1 << 28;

/// Rectangle to keep after resizing, in resized-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Geometry of one transform: resize to `width × height`, then optionally crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropRect>,
}

impl ResizePlan {
    /// Final output dimensions after the optional crop.
    pub fn output_dimensions(&self) -> (u32, u32) {
        match self.crop {
            Some(crop) => (crop.width, crop.height),
            None => (self.width, self.height),
        }
    }
}

/// `floor(value * numerator / denominator)` in integer arithmetic, at least 1.
fn proportional(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = value as u64 * numerator as u64 / denominator.max(1) as u64;
    scaled.clamp(1, u32::MAX as u64) as u32
}

/// Scale both sides by `factor`, truncating.
///
/// # Examples
/// ```
/// # use thumbgen::imaging::{ScaleFactor, calculate_scaled_dimensions};
/// let half = ScaleFactor::new(0.5).unwrap();
/// assert_eq!(calculate_scaled_dimensions((801, 600), half), (400, 300));
/// ```
pub fn calculate_scaled_dimensions(source: (u32, u32), factor: ScaleFactor) -> (u32, u32) {
    let (w, h) = source;
    let scale = |side: u32| {
        let scaled = (side as f64 * factor.value()).floor();
        scaled.clamp(1.0, u32::MAX as f64) as u32
    };
    (scale(w), scale(h))
}

/// Dimensions with height fixed to `target_h`, width derived from the aspect ratio.
pub fn calculate_height_fit(source: (u32, u32), target_h: u32) -> (u32, u32) {
    let (w, h) = source;
    (proportional(target_h, w, h), target_h)
}

/// Dimensions with width fixed to `target_w`, height derived from the aspect ratio.
pub fn calculate_width_fit(source: (u32, u32), target_w: u32) -> (u32, u32) {
    let (w, h) = source;
    (target_w, proportional(target_w, h, w))
}

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while keeping
/// the source aspect ratio. One side matches the target exactly; the other
/// is at least as large as its target.
///
/// A source at least as wide as the target (relative to height) is fitted by
/// height; a taller source is fitted by width.
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    // Compare aspect ratios without floating point: src_w/src_h >= tgt_w/tgt_h
    if src_w as u64 * tgt_h as u64 >= src_h as u64 * tgt_w as u64 {
        calculate_height_fit(source, tgt_h)
    } else {
        calculate_width_fit(source, tgt_w)
    }
}

/// Offset that centers `target` inside `extent`, truncating odd remainders.
pub fn center_offset(extent: u32, target: u32) -> u32 {
    extent.saturating_sub(target) / 2
}

/// Crop `target` out of the center of an image of size `resized`.
pub fn calculate_center_crop(resized: (u32, u32), target: (u32, u32)) -> CropRect {
    let (w, h) = resized;
    let (tgt_w, tgt_h) = target;
    CropRect {
        x: center_offset(w, tgt_w),
        y: center_offset(h, tgt_h),
        width: tgt_w.min(w),
        height: tgt_h.min(h),
    }
}

fn plan_target_box(source: (u32, u32), target: TargetBox) -> ResizePlan {
    let (tgt_w, tgt_h) = (target.width(), target.height());
    let (width, height, crop) = if tgt_w == 0 {
        let (w, h) = calculate_height_fit(source, tgt_h);
        (w, h, None)
    } else if tgt_h == 0 {
        let (w, h) = calculate_width_fit(source, tgt_w);
        (w, h, None)
    } else {
        let (w, h) = calculate_fill_dimensions(source, (tgt_w, tgt_h));
        (w, h, Some(calculate_center_crop((w, h), (tgt_w, tgt_h))))
    };
    ResizePlan {
        width,
        height,
        crop,
    }
}

/// Plan the resize (and crop) that turns an image of size `source` into the
/// output requested by `spec`.
///
/// Fails with [`ImagingError::InvalidSize`] when the resized image (before
/// any crop) would exceed [`MAX_PIXELS`].
pub fn plan_resize(source: (u32, u32), spec: &SizeSpec) -> Result<ResizePlan, ImagingError> {
    let plan = match spec {
        SizeSpec::Original => ResizePlan {
            width: source.0,
            height: source.1,
            crop: None,
        },
        SizeSpec::Scale(factor) => {
            let (width, height) = calculate_scaled_dimensions(source, *factor);
            ResizePlan {
                width,
                height,
                crop: None,
            }
        }
        SizeSpec::Dimensions(target) => plan_target_box(source, *target),
    };

    let pixels = plan.width as u64 * plan.height as u64;
    if pixels > MAX_PIXELS {
        return Err(ImagingError::InvalidSize(format!(
            "resizing {}x{} to {}x{} needs {pixels} pixels, limit is {MAX_PIXELS}",
            source.0, source.1, plan.width, plan.height
        )));
    }
    Ok(plan)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions.
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=4000, 1u32..=4000)
    }

    /// Photo-like dimensions: no side below 100px, so covering a box stays
    /// within the pixel limit.
    fn photo_dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (100u32..=4000, 100u32..=4000)
    }

    proptest! {
        /// Property: a target box with both sides set is always hit exactly.
        #[test]
        fn prop_box_output_is_exact(
            source in photo_dimensions_strategy(),
            (tw, th) in (1u32..=2000, 1u32..=2000),
        ) {
            let plan = plan_resize(source, &SizeSpec::dimensions(tw, th).unwrap()).unwrap();
            prop_assert_eq!(plan.output_dimensions(), (tw, th));
        }

        /// Property: the crop rectangle always lies inside the resized image.
        #[test]
        fn prop_crop_within_resized(
            source in photo_dimensions_strategy(),
            (tw, th) in (1u32..=2000, 1u32..=2000),
        ) {
            let plan = plan_resize(source, &SizeSpec::dimensions(tw, th).unwrap()).unwrap();
            let crop = plan.crop.unwrap();
            prop_assert!(crop.x + crop.width <= plan.width);
            prop_assert!(crop.y + crop.height <= plan.height);
        }

        /// Property: scaling yields floor(side * factor).
        #[test]
        fn prop_scale_is_floor(
            (w, h) in dimensions_strategy(),
            factor in 0.05f64..4.0,
        ) {
            let (ow, oh) = calculate_scaled_dimensions((w, h), ScaleFactor::new(factor).unwrap());
            prop_assert_eq!(ow, ((w as f64 * factor).floor() as u32).max(1));
            prop_assert_eq!(oh, ((h as f64 * factor).floor() as u32).max(1));
        }

        /// Property: any target either fits the pixel limit or is rejected.
        #[test]
        fn prop_plan_respects_pixel_limit(
            source in dimensions_strategy(),
            (tw, th) in (0u32..=u32::MAX, 1u32..=u32::MAX),
        ) {
            if let Ok(plan) = plan_resize(source, &SizeSpec::dimensions(tw, th).unwrap()) {
                prop_assert!(plan.width as u64 * plan.height as u64 <= MAX_PIXELS);
            }
        }

        /// Property: width-only targets keep the aspect ratio within one pixel.
        #[test]
        fn prop_width_fit_preserves_aspect(
            (w, h) in dimensions_strategy(),
            tw in 1u32..=2000,
        ) {
            let (ow, oh) = calculate_width_fit((w, h), tw);
            prop_assert_eq!(ow, tw);
            let exact = tw as f64 * h as f64 / w as f64;
            prop_assert!((oh as f64 - exact).abs() <= 1.0);
        }
    }
}
