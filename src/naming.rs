//! Derived output names for converted images.
//!
//! Conversions never overwrite their source. They write a sibling file whose
//! stem carries a suffix, keeping the original extension:
//!
//! - `photo.png` + `_grayscale` → `photo_grayscale.png`
//! - `scan.final.jpg` + `_bw` → `scan.final_bw.jpg`
//! - `README` + `_bw` → `README_bw`

use std::path::{Path, PathBuf};

/// Insert `suffix` between the stem and the extension of a file name.
pub fn derived_file_name(file_name: &str, suffix: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    }
}

/// Sibling path of `source` carrying `suffix`.
pub fn derived_path(source: &Path, suffix: &str) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    source.with_file_name(derived_file_name(&name, suffix))
}

/// Whether `path` already looks like the output of a conversion.
pub fn is_derived(path: &Path, suffixes: &[&str]) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| suffixes.iter().any(|sfx| !sfx.is_empty() && stem.ends_with(sfx)))
}

/// Whether `path` has one of `extensions`, compared case-insensitively.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
}
