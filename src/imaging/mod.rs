//! Image processing in pure Rust, built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format guessed from magic bytes) |
//! | **Encode** | `JpegEncoder` with quality; lossless PNG and WebP |
//! | **Resize** | `DynamicImage::resize_exact` with `Lanczos3` |
//! | **Crop** | `DynamicImage::crop_imm` around the center |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for resize and crop geometry (unit testable)
//! - **Parameters**: Validated request types ([`Quality`], [`SizeSpec`], [`OutputFormat`])
//! - **Codec**: [`Codec`] trait + [`RustCodec`]
//! - **Transform**: [`resize`] applies a [`SizeSpec`] to a [`PixelBuffer`]
//! - **Operations**: [`compress`] and the per-spec [`process`] pipeline

mod calculations;
pub mod codec;
pub mod operations;
mod params;
pub mod rust_codec;
mod transform;

pub use calculations::{
    CropRect, MAX_PIXELS, ResizePlan, calculate_fill_dimensions, calculate_scaled_dimensions,
    plan_resize,
};
pub use codec::{Codec, ImagingError, PixelBuffer};
pub use operations::{Artifact, compress, process};
pub use params::{OutputFormat, Quality, ScaleFactor, SizeSpec, TargetBox};
pub use rust_codec::RustCodec;
pub use transform::resize;
