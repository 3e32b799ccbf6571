//! High-level image operations.
//!
//! These functions combine the codec with the transform engine: the lossy
//! compression round-trip, and the per-spec pipeline that turns one decoded
//! image into a list of named, encoded artifacts.

use super::codec::{Codec, ImagingError, PixelBuffer};
use super::params::{OutputFormat, Quality, SizeSpec};
use super::transform::resize;
use crate::naming::artifact_name;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// One encoded output image.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Derived file name (prefix + base name).
    pub name: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Encode `image` at `quality` and decode it straight back.
///
/// Simulates the loss of a real save/load cycle before further transforms.
/// This stage never skips work, even at quality 100; [`process`] is the one
/// that leaves it out for uncompressed requests.
pub fn compress(
    codec: &impl Codec,
    image: &PixelBuffer,
    quality: Quality,
    format: OutputFormat,
) -> Result<PixelBuffer> {
    let encoded = codec.encode(image, format, quality)?;
    log::debug!(
        "compressed {}x{} to {} bytes of {format} at quality {quality}",
        image.width(),
        image.height(),
        encoded.len()
    );
    codec.decode(&encoded)
}

/// Run the pipeline once per size spec, in order.
///
/// For each spec: compress (only when `quality < 100`, and freshly for every
/// spec), resize, encode in `format`, and name the result after `base_name`.
/// The first error aborts the whole call.
pub fn process(
    codec: &impl Codec,
    image: &PixelBuffer,
    base_name: &str,
    specs: &[SizeSpec],
    quality: Quality,
    format: OutputFormat,
) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::with_capacity(specs.len());

    for spec in specs {
        let resized = if quality.is_lossy() {
            let compressed = compress(codec, image, quality, format)?;
            resize(&compressed, spec)?
        } else {
            resize(image, spec)?
        };

        let bytes = codec.encode(&resized, format, quality)?;
        let name = artifact_name(spec, quality, base_name);
        log::debug!(
            "{name}: {}x{} → {}x{}, {} bytes",
            image.width(),
            image.height(),
            resized.width(),
            resized.height(),
            bytes.len()
        );

        artifacts.push(Artifact {
            name,
            format,
            width: resized.width(),
            height: resized.height(),
            bytes,
        });
    }

    Ok(artifacts)
}
