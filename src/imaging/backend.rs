//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, convert, resize, and encode_page_image.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so batch and compositor logic can be
//! exercised without decoding real files.

use super::params::{ConvertParams, PageImageParams, ResizeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A page image, JPEG-encoded in memory and ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
    /// Baseline JPEG bytes, three components (RGB).
    pub data: Vec<u8>,
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the batch runners and
/// the PDF compositor stay backend-agnostic. `Sync` because batches fan out
/// over rayon.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Execute a color conversion (grayscale or threshold).
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError>;

    /// Execute a stretch resize to exact dimensions.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Decode, flatten to RGB, resample and JPEG-encode an image for a PDF page.
    fn encode_page_image(&self, params: &PageImageParams) -> Result<EncodedImage, BackendError>;
}
