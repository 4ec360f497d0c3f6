pub mod fast_resizer;

use crate::image::Image;
use crate::layout::Rect;

#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    #[error("resize buffer error: {0}")]
    ResizeBufferError(String),
    #[error("resize failed: {0}")]
    ResizeError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    Hamming,
    CatmullRom,
    Mitchell,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    pub const ALL: [ResizeFilter; 7] = [
        ResizeFilter::Nearest,
        ResizeFilter::Bilinear,
        ResizeFilter::Hamming,
        ResizeFilter::CatmullRom,
        ResizeFilter::Mitchell,
        ResizeFilter::Gaussian,
        ResizeFilter::Lanczos3,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ResizeFilter::Nearest => "Nearest",
            ResizeFilter::Bilinear => "Bilinear",
            ResizeFilter::Hamming => "Hamming",
            ResizeFilter::CatmullRom => "CatmullRom",
            ResizeFilter::Mitchell => "Mitchell",
            ResizeFilter::Gaussian => "Gaussian",
            ResizeFilter::Lanczos3 => "Lanczos3",
        }
    }

    /// Case-insensitive lookup by [`name`](Self::name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|filter| filter.name().eq_ignore_ascii_case(name))
    }
}

pub trait Resizer {
    /// Scales `source` (or the `crop` box inside it) to exactly `target_size`.
    fn resize<T>(
        &mut self,
        source_image: &T,
        crop: Option<Rect>,
        target_size: (u32, u32),
        filter: ResizeFilter,
    ) -> Result<T, ResizeError>
    where
        T: Image;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_names_round_trip() {
        for filter in ResizeFilter::ALL {
            assert_eq!(ResizeFilter::from_name(filter.name()), Some(filter));
        }
        assert_eq!(ResizeFilter::from_name(" lanczos3 "), Some(ResizeFilter::Lanczos3));
        assert_eq!(ResizeFilter::from_name("bicubic"), None);
    }
}
