//! Configuration module.
//!
//! Handles loading, validating, and merging `imgbatch.toml` files.
//! Configuration is layered: stock defaults are overridden by a user config
//! file, which is in turn overridden by a config file inside the folder being
//! processed.
//!
//! ## Config File Location
//!
//! ```text
//! ./imgbatch.toml              # User config (or --config <PATH>)
//! photos/
//! ├── imgbatch.toml            # Folder config (overrides user config)
//! ├── 001.jpg
//! └── 002.png
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [scan]
//! sort_by_name = false      # Sort files by name instead of listing order
//!
//! [pdf]
//! page_size = "a4"          # a3 | a4 | a5 | letter | legal
//! fit = "contain"           # contain | single-axis
//! output_name = "output.pdf"
//! downsample = true         # Resample pixels to the placed size (1px = 1pt)
//! quality = 90              # JPEG quality of embedded page images (1-100)
//! # append_image = "img/stamped_signed.png"
//!
//! [images]
//! quality = 90              # JPEG quality of converted/resized files (1-100)
//!
//! [grayscale]
//! suffix = "_grayscale"
//!
//! [black_and_white]
//! suffix = "_bw"
//! threshold = 128           # Pixels brighter than this become white
//!
//! [resize]
//! confirm_overwrite = true  # Ask before overwriting originals
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{FitPolicy, Quality};
use crate::pdf::PaperSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory and in each input folder.
pub const CONFIG_FILE_NAME: &str = "imgbatch.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `imgbatch.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory listing settings.
    pub scan: ScanConfig,
    /// Images-to-PDF settings.
    pub pdf: PdfConfig,
    /// Encoding settings for files written next to their source.
    pub images: ImagesConfig,
    /// Grayscale conversion settings.
    pub grayscale: GrayscaleConfig,
    /// Black-and-white conversion settings.
    pub black_and_white: BlackAndWhiteConfig,
    /// Aspect-ratio resize settings.
    pub resize: ResizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.pdf.quality) {
            return Err(ConfigError::Validation("pdf.quality must be 1-100".into()));
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.pdf.output_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pdf.output_name must not be empty".into(),
            ));
        }
        if !self.pdf.output_name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(ConfigError::Validation(
                "pdf.output_name must end in .pdf".into(),
            ));
        }
        if self.grayscale.suffix.is_empty() || self.black_and_white.suffix.is_empty() {
            return Err(ConfigError::Validation(
                "conversion suffixes must not be empty".into(),
            ));
        }
        if self.grayscale.suffix == self.black_and_white.suffix {
            return Err(ConfigError::Validation(
                "grayscale.suffix and black_and_white.suffix must differ".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// All suffixes that mark a file as a conversion output.
    pub fn derived_suffixes(&self) -> [&str; 2] {
        [
            self.grayscale.suffix.as_str(),
            self.black_and_white.suffix.as_str(),
        ]
    }
}

/// Directory listing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Sort files by name. When false, files are processed in the order the
    /// filesystem lists them.
    pub sort_by_name: bool,
}

/// Images-to-PDF settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfConfig {
    /// Paper size of every page.
    pub page_size: PaperSize,
    /// How images larger than the page are shrunk.
    pub fit: FitPolicy,
    /// File name of the PDF written into the input folder.
    pub output_name: String,
    /// Resample pixels to the placed size instead of embedding full resolution.
    pub downsample: bool,
    /// JPEG quality of embedded page images.
    pub quality: u32,
    /// Extra image appended as the last page (e.g. a signature stamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_image: Option<PathBuf>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_size: PaperSize::A4,
            fit: FitPolicy::Contain,
            output_name: "output.pdf".to_string(),
            downsample: true,
            quality: 90,
            append_image: None,
        }
    }
}

impl PdfConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Encoding settings for converted and resized files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// JPEG quality (1 = worst, 100 = best). Lossless formats ignore it.
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

impl ImagesConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Grayscale conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrayscaleConfig {
    /// Appended to the file stem of each output.
    pub suffix: String,
}

impl Default for GrayscaleConfig {
    fn default() -> Self {
        Self {
            suffix: "_grayscale".to_string(),
        }
    }
}

/// Black-and-white conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlackAndWhiteConfig {
    /// Appended to the file stem of each output.
    pub suffix: String,
    /// Luminance values strictly above this become white, the rest black.
    pub threshold: u8,
}

impl Default for BlackAndWhiteConfig {
    fn default() -> Self {
        Self {
            suffix: "_bw".to_string(),
            threshold: 128,
        }
    }
}

/// Aspect-ratio resize settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Require explicit confirmation before originals are overwritten.
    pub confirm_overwrite: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            confirm_overwrite: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a TOML file as a raw value. The file must exist.
pub fn read_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load `imgbatch.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    read_raw_config(&config_path).map(Some)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Build the user layer: stock defaults merged with either an explicit config
/// file or `./imgbatch.toml` when present.
///
/// The result is validated once here so a broken user config is reported at
/// startup instead of on the first batch.
pub fn base_layer(explicit: Option<&Path>) -> Result<toml::Value, ConfigError> {
    let user = match explicit {
        Some(path) => Some(read_raw_config(path)?),
        None => load_raw_config(Path::new("."))?,
    };
    let base = match user {
        Some(user) => merge_toml(stock_defaults_value(), user),
        None => stock_defaults_value(),
    };
    resolve_config(base.clone(), None)?;
    Ok(base)
}

/// Resolve the config for one input folder on top of a user layer.
pub fn config_for_folder(base: &toml::Value, folder: &Path) -> Result<AppConfig, ConfigError> {
    let overlay = load_raw_config(folder)?;
    resolve_config(base.clone(), overlay)
}

/// Returns a fully-commented stock `imgbatch.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgbatch configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Config files are layered:
#   ./imgbatch.toml (or --config PATH)  -> user (overrides stock defaults)
#   <input folder>/imgbatch.toml        -> folder (overrides user)
#
# Each level only needs the keys it wants to override.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Directory scanning
# ---------------------------------------------------------------------------
[scan]
# Sort files by name. When false, files (and PDF pages) follow the order the
# filesystem lists them in, which is not necessarily alphabetical.
sort_by_name = false

# ---------------------------------------------------------------------------
# Images to PDF
# ---------------------------------------------------------------------------
[pdf]
# Paper size of every page: a3, a4, a5, letter, legal.
page_size = "a4"

# How images larger than the page are shrunk:
#   contain     - both axes fit on the page
#   single-axis - landscape scales by width, portrait by height; the other
#                 axis is not checked and may overflow the page
fit = "contain"

# Name of the PDF written into the input folder.
output_name = "output.pdf"

# Resample each image to its placed size (1 pixel = 1 point). Set to false to
# embed full-resolution images scaled by the page.
downsample = true

# JPEG quality of embedded page images (1 = worst, 100 = best).
quality = 90

# Extra image appended as the last page, e.g. a signature stamp.
# append_image = "img/stamped_signed.png"

# ---------------------------------------------------------------------------
# Converted and resized files
# ---------------------------------------------------------------------------
[images]
# JPEG quality of written files (1 = worst, 100 = best). PNG, BMP and GIF
# are lossless and ignore it.
quality = 90

[grayscale]
# photo.png -> photo_grayscale.png
suffix = "_grayscale"

[black_and_white]
# photo.png -> photo_bw.png
suffix = "_bw"

# Pixels brighter than this luminance become white, the rest black.
threshold = 128

# ---------------------------------------------------------------------------
# Aspect-ratio resize (overwrites the original files!)
# ---------------------------------------------------------------------------
[resize]
# Ask for confirmation before overwriting (interactive), or require --yes.
confirm_overwrite = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
