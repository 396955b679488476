//! Image processing on top of the pure-Rust `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Grayscale / B&W** | `to_luma8` (+ threshold) |
//! | **Preset resize** | `resize_exact`, Lanczos3 |
//! | **Page image** | `to_rgb8` + Lanczos3 + in-memory JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Presets**: The numbered aspect-ratio table
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod presets;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use calculations::{
    calculate_centered_offset, calculate_contain_dimensions, calculate_fit_dimensions,
    calculate_preset_dimensions,
};
pub use operations::{convert_image, get_dimensions, resize_to_preset};
pub use params::{ColorReduction, ConvertParams, FitPolicy, PageImageParams, Quality, ResizeParams};
pub use presets::{AspectPreset, PRESETS, PresetError};
pub use rust_backend::RustBackend;
