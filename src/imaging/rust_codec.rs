//! Pure Rust codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with guessed format |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode → PNG | `image::DynamicImage::write_to` (lossless) |
//! | Encode → WebP | `image::DynamicImage::write_to` (lossless, RGBA8) |
//!
//! Quality only affects JPEG. PNG and WebP encoders in `image` are lossless,
//! so a "compressed" PNG or WebP round-trip returns the same pixels.

use super::codec::{Codec, ImagingError, PixelBuffer};
use super::params::{OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;

/// Codec using the `image` crate's pure Rust decoders and encoders.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// JPEG has no alpha channel and only 8-bit samples.
fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
        ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8()))
        }
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

/// PNG cannot store floating point samples.
fn png_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => {
            Cow::Owned(DynamicImage::ImageRgba16(image.to_rgba16()))
        }
        _ => Cow::Borrowed(image),
    }
}

fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    let mut bytes = Vec::new();
    // Quality is validated to 1..=100, so it always fits in a u8.
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value() as u8);
    jpeg_compatible(image)
        .write_with_encoder(encoder)
        .map_err(|e| ImagingError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(bytes)
}

fn encode_with_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ImagingError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, format)
        .map_err(|e| ImagingError::Encode(format!("{format:?} encode failed: {e}")))?;
    Ok(cursor.into_inner())
}

impl Codec for RustCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, ImagingError> {
        if bytes.is_empty() {
            return Err(ImagingError::Decode("input is empty".into()));
        }
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImagingError::Decode(e.to_string()))?;
        if reader.format().is_none() {
            return Err(ImagingError::Decode("unrecognized image format".into()));
        }
        reader
            .decode()
            .map_err(|e| ImagingError::Decode(e.to_string()))
    }

    fn encode(
        &self,
        image: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, ImagingError> {
        match format {
            OutputFormat::Jpeg => encode_jpeg(image, quality),
            OutputFormat::Png => encode_with_format(&png_compatible(image), ImageFormat::Png),
            OutputFormat::WebP => encode_with_format(
                &DynamicImage::ImageRgba8(image.to_rgba8()),
                ImageFormat::WebP,
            ),
        }
    }
}
