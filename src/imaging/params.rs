//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! and the PDF compositor (which decide what files to produce) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`FitPolicy`]: How page images are shrunk to fit the page.
//! - [`ColorReduction`]: Grayscale or thresholded black-and-white.
//! - [`ConvertParams`]: Source, output path and color reduction for a conversion.
//! - [`ResizeParams`]: Source, output path and exact target dimensions for a stretch resize.
//! - [`PageImageParams`]: Source and pixel size of an image to embed in a PDF page.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `u8` the JPEG encoder takes.
    pub fn as_jpeg(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// How an image larger than the page is shrunk before it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitPolicy {
    /// Scale by the tighter axis so the whole image lands on the page.
    #[default]
    Contain,
    /// Scale landscape images by width and portrait images by height only.
    /// The other axis is not checked and may overflow the page.
    SingleAxis,
}

/// Color-space reduction applied by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorReduction {
    /// Single-channel luminance.
    Grayscale,
    /// Luminance, then `v > threshold` → white, else black.
    Threshold(u8),
}

/// Parameters for a color conversion written next to its source.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub reduction: ColorReduction,
    pub quality: Quality,
}

/// Parameters for a stretch resize to exact dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

/// Parameters for an image destined for a PDF page.
///
/// The backend decodes `source`, flattens it to RGB, resamples to
/// `width`x`height` pixels if needed, and returns it JPEG-encoded in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImageParams {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
