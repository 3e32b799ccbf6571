//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how*. Each one validates on
//! construction, so the transform and codec code never sees an impossible
//! request.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). `100` skips the lossy round-trip.
//! - [`ScaleFactor`]: A finite, positive uniform scale factor.
//! - [`TargetBox`]: A `(width, height)` target where at most one side is zero.
//! - [`SizeSpec`]: One resize instruction: original size, scale, or target box.
//! - [`OutputFormat`]: Encoded output format (JPEG, PNG, WebP).

use super::codec::ImagingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    /// Highest quality; the pipeline skips the compression round-trip.
    pub const MAX: Quality = Quality(100);

    pub fn new(value: u32) -> Result<Self, ImagingError> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ImagingError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Whether this quality requests a lossy re-encode before resizing.
    pub fn is_lossy(self) -> bool {
        self.0 < 100
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uniform scale factor, finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> Result<Self, ImagingError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ImagingError::InvalidSize(format!(
                "scale factor must be a positive number, got {value}"
            )))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Renders whole numbers with one fractional digit (`2.0`, not `2`), so
/// derived filenames read the same whether the factor was typed as `2` or `2.0`.
impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0 < 1e16 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Target box for a resize. A zero side is derived from the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetBox {
    width: u32,
    height: u32,
}

impl TargetBox {
    pub fn new(width: u32, height: u32) -> Result<Self, ImagingError> {
        if width == 0 && height == 0 {
            return Err(ImagingError::InvalidSize(
                "width and height cannot both be zero".into(),
            ));
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }
}

/// One resize instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeSpec {
    /// No size requested; keep the source dimensions.
    Original,
    /// Scale both sides by the same factor, no crop.
    Scale(ScaleFactor),
    /// Fit a target box, cropping around the center when both sides are set.
    Dimensions(TargetBox),
}

impl SizeSpec {
    pub fn scale(factor: f64) -> Result<Self, ImagingError> {
        ScaleFactor::new(factor).map(SizeSpec::Scale)
    }

    pub fn dimensions(width: u32, height: u32) -> Result<Self, ImagingError> {
        TargetBox::new(width, height).map(SizeSpec::Dimensions)
    }
}

/// Parses `WxH` (or `W,H`) as a target box and a bare number as a scale factor.
impl FromStr for SizeSpec {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((w, h)) = s.split_once(['x', 'X', ',']) {
            let parse = |v: &str| {
                v.trim().parse::<u32>().map_err(|_| {
                    ImagingError::InvalidSize(format!("'{s}' is not a WIDTHxHEIGHT pair"))
                })
            };
            return SizeSpec::dimensions(parse(w)?, parse(h)?);
        }
        let factor = s
            .parse::<f64>()
            .map_err(|_| ImagingError::InvalidSize(format!("'{s}' is not a scale factor")))?;
        SizeSpec::scale(factor)
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    #[serde(rename = "webp")]
    WebP,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            other => Err(ImagingError::Encode(format!(
                "unsupported output format: {other}"
            ))),
        }
    }
}
