//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_preset_dimensions;
use super::params::{ColorReduction, ConvertParams, Quality, ResizeParams};
use super::presets::AspectPreset;
use crate::naming::derived_path;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Plan a conversion without executing it.
pub fn plan_conversion(
    source: &Path,
    reduction: ColorReduction,
    suffix: &str,
    quality: Quality,
) -> ConvertParams {
    ConvertParams {
        source: source.to_path_buf(),
        output: derived_path(source, suffix),
        reduction,
        quality,
    }
}

/// Convert one image and write it next to its source.
///
/// Returns the path of the written file.
pub fn convert_image(
    backend: &impl ImageBackend,
    source: &Path,
    reduction: ColorReduction,
    suffix: &str,
    quality: Quality,
) -> Result<PathBuf> {
    let params = plan_conversion(source, reduction, suffix, quality);
    backend.convert(&params)?;
    Ok(params.output)
}

/// Plan a preset resize. The output path is the source path: the resize
/// overwrites the original.
pub fn plan_preset_resize(
    source: &Path,
    dimensions: (u32, u32),
    preset: AspectPreset,
    quality: Quality,
) -> ResizeParams {
    let (width, height) = calculate_preset_dimensions(dimensions, preset.ratio);
    ResizeParams {
        source: source.to_path_buf(),
        output: source.to_path_buf(),
        width,
        height,
        quality,
    }
}

/// Stretch one image in place to a preset aspect ratio.
///
/// Returns the new dimensions.
pub fn resize_to_preset(
    backend: &impl ImageBackend,
    source: &Path,
    preset: AspectPreset,
    quality: Quality,
) -> Result<(u32, u32)> {
    let dimensions = get_dimensions(backend, source)?;
    let params = plan_preset_resize(source, dimensions, preset, quality);
    backend.resize(&params)?;
    Ok((params.width, params.height))
}
