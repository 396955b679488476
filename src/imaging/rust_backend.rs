//! Pure Rust image processing backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, BMP, GIF) | `image::ImageReader`, format sniffed from content |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Grayscale | `DynamicImage::to_luma8` |
//! | Black-and-white | `to_luma8` + per-pixel threshold |
//! | Stretch resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Page image | `to_rgb8` + `imageops::resize` + in-memory `JpegEncoder` |
//! | Encode | format inferred from the output extension |

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use super::params::{ColorReduction, ConvertParams, PageImageParams, Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open an image for reading, detecting the format from its leading bytes.
///
/// A PNG saved as `photo.jpg` still decodes; the extension is only a fallback.
fn open_image(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(BackendError::Io)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_image(path)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Save a DynamicImage to the given path, inferring format from extension.
///
/// JPEG output honours `quality`; JPEG has no alpha channel, so images with
/// alpha are flattened to RGB first.
fn save_image(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!("Unsupported output format {}: {}", path.display(), e))
    })?;

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path).map_err(BackendError::Io)?;
            let writer = std::io::BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(writer, quality.as_jpeg());
            let result = if img.color().has_alpha() {
                DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
            } else {
                img.write_with_encoder(encoder)
            };
            result.map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
        }
        other => img.save_with_format(path, other).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to write {}: {}", path.display(), e))
        }),
    }
}

/// Map every pixel to pure black or white: `v > threshold` → 255, else 0.
pub(crate) fn apply_threshold(mut gray: GrayImage, threshold: u8) -> GrayImage {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
    gray
}

/// JPEG-encode an RGB image into memory.
fn encode_jpeg(rgb: &image::RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, quality.as_jpeg())
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(data)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_image(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let gray = img.to_luma8();
        let reduced = match params.reduction {
            ColorReduction::Grayscale => gray,
            ColorReduction::Threshold(threshold) => apply_threshold(gray, threshold),
        };
        save_image(
            &DynamicImage::ImageLuma8(reduced),
            &params.output,
            params.quality,
        )
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, &params.output, params.quality)
    }

    fn encode_page_image(&self, params: &PageImageParams) -> Result<EncodedImage, BackendError> {
        // Grayscale, paletted and alpha sources are all flattened to RGB
        let rgb = load_image(&params.source)?.to_rgb8();
        let rgb = if rgb.dimensions() == (params.width, params.height) {
            rgb
        } else {
            image::imageops::resize(&rgb, params.width, params.height, FilterType::Lanczos3)
        };
        let data = encode_jpeg(&rgb, params.quality)?;
        Ok(EncodedImage {
            width: rgb.width(),
            height: rgb.height(),
            data,
        })
    }
}
