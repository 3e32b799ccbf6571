//! Codec trait and shared imaging types.
//!
//! The [`Codec`] trait covers the two byte-level operations the pipeline
//! needs: decode raw bytes into a [`PixelBuffer`], and encode a buffer back
//! into bytes in an [`OutputFormat`] at a [`Quality`].
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec), built on the `image` crate.
//! Tests swap in a recording codec so pipeline logic can be checked without
//! caring about encoder output.

use super::params::{OutputFormat, Quality};
use image::DynamicImage;
use thiserror::Error;

/// A decoded in-memory raster image.
///
/// Every pipeline stage takes a buffer by reference and hands back a new one.
pub type PixelBuffer = DynamicImage;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u32),
    #[error("Invalid size: {0}")]
    InvalidSize(String),
}

/// Byte-level image codec.
pub trait Codec {
    /// Decode raw bytes into a pixel buffer.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, ImagingError>;

    /// Encode a pixel buffer in `format` at `quality`.
    fn encode(
        &self,
        image: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ImagingError>;
}
