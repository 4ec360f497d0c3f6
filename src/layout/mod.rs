pub mod aspect;
pub mod geometry;

use std::{fmt::Display, num::ParseIntError};

pub use aspect::{height_for_width, limit_to_max, reconcile_to_ratio, width_for_height};
pub use geometry::{compute_placement, PixelRect, Placement, Rect};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    #[error("dimension must be greater than zero")]
    Zero,
    #[error("dimension {value} exceeds the maximum of {max}")]
    TooLarge { value: u32, max: u32 },
    #[error("'{0}' is not a valid dimension")]
    NotANumber(String),
}

/// Width and height of an image or canvas, both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Option<Self> {
        if width > 0 && height > 0 {
            Some(Self { width, height })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn square(size: u32) -> Option<Self> {
        Self::new(size, size)
    }

    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses user input such as `" 256 "` into a dimension value.
///
/// Negative numbers and zero are rejected along with anything non-numeric.
pub fn parse_dimension(input: &str) -> Result<u32, DimensionError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_: ParseIntError| DimensionError::NotANumber(trimmed.to_string()))?;
    if value <= 0 {
        return Err(DimensionError::Zero);
    }
    u32::try_from(value).map_err(|_| DimensionError::TooLarge {
        value: u32::MAX,
        max: u32::MAX,
    })
}

/// Checks that `value` lies in `1..=max`.
pub fn validate_dimension(value: u32, max: u32) -> Result<u32, DimensionError> {
    if value == 0 {
        Err(DimensionError::Zero)
    } else if value > max {
        Err(DimensionError::TooLarge { value, max })
    } else {
        Ok(value)
    }
}

/// How a source image is mapped onto the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FitMode {
    /// Whole image visible, letterboxed on the shorter axis.
    #[default]
    FitWithin,
    /// Each axis scaled independently to cover the canvas.
    Stretch,
    /// Centered crop with the canvas aspect ratio, scaled to cover the canvas.
    CropToFill,
}

impl FitMode {
    pub const ALL: [FitMode; 3] = [FitMode::FitWithin, FitMode::Stretch, FitMode::CropToFill];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FitMode::FitWithin => "Fit (letterbox)",
            FitMode::Stretch => "Stretch",
            FitMode::CropToFill => "Crop to fill",
        }
    }

    /// Short name used in exported file names.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            FitMode::FitWithin => "fit",
            FitMode::Stretch => "stretch",
            FitMode::CropToFill => "crop",
        }
    }
}

/// Rounds half away from zero for the non-negative values used here.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
