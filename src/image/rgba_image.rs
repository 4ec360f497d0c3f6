use image::RgbaImage;

use crate::color::Color;
use crate::image::Image;
use crate::image::PixelFormat;
use crate::layout::Dimensions;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRgbaImage {
    inner: image::RgbaImage,
}

impl LoadedRgbaImage {
    /// Canvas of `dimensions` where every pixel is `color`.
    #[must_use]
    pub fn filled(dimensions: Dimensions, color: Color) -> Self {
        Self {
            inner: RgbaImage::from_pixel(dimensions.width(), dimensions.height(), color.to_rgba()),
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        Dimensions::new(self.inner.width(), self.inner.height())
    }

    #[must_use]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.inner
    }

    pub fn as_rgba_mut(&mut self) -> &mut RgbaImage {
        &mut self.inner
    }

    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.inner.pixels().all(|pixel| pixel.0[3] == u8::MAX)
    }

    /// Drops the alpha channel, for buffers already known to be opaque.
    #[must_use]
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.inner
            .pixels()
            .flat_map(|pixel| [pixel.0[0], pixel.0[1], pixel.0[2]])
            .collect()
    }
}

impl From<RgbaImage> for LoadedRgbaImage {
    fn from(inner: RgbaImage) -> Self {
        Self { inner }
    }
}

impl Image for LoadedRgbaImage {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgba8
    }

    fn from_parts(
        width: u32,
        height: u32,
        data: Vec<u8>,
        pixel_format: PixelFormat,
    ) -> Option<Self> {
        if pixel_format != PixelFormat::Rgba8 {
            return None;
        }
        RgbaImage::from_raw(width, height, data).map(|inner| Self { inner })
    }
}
