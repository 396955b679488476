//! The fixed table of target aspect ratios for the stretch resize.
//!
//! Presets are selected by number (`"1"`..`"10"`). Several numbers share a
//! ratio; the table is kept as-is so existing muscle memory keeps working.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("Invalid format choice '{0}'. Please enter a number between 1 and 10.")]
    InvalidPreset(String),
}

/// A numbered target aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectPreset {
    pub id: u8,
    /// Ratio as (width-units, height-units).
    pub ratio: (u32, u32),
}

pub const PRESETS: [AspectPreset; 10] = [
    AspectPreset { id: 1, ratio: (16, 9) },
    AspectPreset { id: 2, ratio: (16, 9) },
    AspectPreset { id: 3, ratio: (3, 1) },
    AspectPreset { id: 4, ratio: (3, 2) },
    AspectPreset { id: 5, ratio: (4, 1) },
    AspectPreset { id: 6, ratio: (1, 1) },
    AspectPreset { id: 7, ratio: (1, 1) },
    AspectPreset { id: 8, ratio: (1, 1) },
    AspectPreset { id: 9, ratio: (16, 9) },
    AspectPreset { id: 10, ratio: (1, 1) },
];

impl AspectPreset {
    /// Look up a preset by its number.
    pub fn by_id(id: u8) -> Result<Self, PresetError> {
        PRESETS
            .iter()
            .find(|p| p.id == id)
            .copied()
            .ok_or_else(|| PresetError::InvalidPreset(id.to_string()))
    }

    /// Ratio as a float, width over height.
    pub fn ratio_value(&self) -> f64 {
        self.ratio.0 as f64 / self.ratio.1 as f64
    }
}

impl FromStr for AspectPreset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .map_err(|_| PresetError::InvalidPreset(trimmed.to_string()))
            .and_then(Self::by_id)
            .map_err(|_| PresetError::InvalidPreset(trimmed.to_string()))
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ratio.0, self.ratio.1)
    }
}
