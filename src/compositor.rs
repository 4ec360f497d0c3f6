//! Rendering a source image (or a flat color) onto a target canvas.

use image::RgbaImage;

use crate::color::Color;
use crate::image::Image;
use crate::image::image_crate::{DynImageWriter, OpaqueRgbImage};
use crate::image::rgba_image::LoadedRgbaImage;
use crate::image::{ImageWriter, PixelFormat, SaveError};
use crate::layout::{compute_placement, Dimensions, FitMode};
use crate::resize::fast_resizer::FastResizer;
use crate::resize::{ResizeError, ResizeFilter, Resizer};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Resize(#[from] ResizeError),
}

/// Where a rendered canvas came from; drives the export file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOrigin {
    Composited { stem: String, mode: FitMode },
    FlatFill { color: Color },
}

/// An opaque canvas of exactly the target size.
#[derive(Debug, Clone)]
pub struct RenderResult {
    image: LoadedRgbaImage,
    dimensions: Dimensions,
    origin: RenderOrigin,
}

impl RenderResult {
    #[must_use]
    pub fn image(&self) -> &LoadedRgbaImage {
        &self.image
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub fn origin(&self) -> &RenderOrigin {
        &self.origin
    }

    /// `{stem}_{mode}_{w}x{h}.png` or `{hex}_square_{w}x{h}.png`.
    #[must_use]
    pub fn file_name(&self) -> String {
        match &self.origin {
            RenderOrigin::Composited { stem, mode } => {
                format!("{stem}_{}_{}.png", mode.slug(), self.dimensions)
            }
            RenderOrigin::FlatFill { color } => {
                format!("{}_square_{}.png", color.hex(), self.dimensions)
            }
        }
    }

    /// Encodes the canvas as an RGB PNG.
    pub fn encode_png(&self, writer: &DynImageWriter) -> Result<Vec<u8>, SaveError> {
        let rgb = OpaqueRgbImage::from_parts(
            self.image.width(),
            self.image.height(),
            self.image.to_rgb_bytes(),
            PixelFormat::Rgb8,
        )
        .ok_or_else(|| SaveError::Encoding("canvas buffer has the wrong size".to_string()))?;
        writer.encode_png(&rgb)
    }
}

pub struct ImageCompositor<R = FastResizer> {
    resizer: R,
    filter: ResizeFilter,
}

impl<R: Resizer> ImageCompositor<R> {
    pub fn new(resizer: R, filter: ResizeFilter) -> Self {
        Self { resizer, filter }
    }

    #[must_use]
    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: ResizeFilter) {
        self.filter = filter;
    }

    /// Draws `source` onto a `background` canvas of `target` size.
    ///
    /// Transparent source pixels blend over the background, so the result is
    /// always fully opaque.
    pub fn composite(
        &mut self,
        source: &LoadedRgbaImage,
        source_dimensions: Dimensions,
        target: Dimensions,
        mode: FitMode,
        background: Color,
        stem: &str,
    ) -> Result<RenderResult, RenderError> {
        let placement = compute_placement(source_dimensions, target, mode);
        let dest = placement.dest_pixels(target);
        let crop = (!placement.uses_whole_source(source_dimensions)).then_some(placement.source);

        let scaled =
            self.resizer
                .resize(source, crop, (dest.width, dest.height), self.filter)?;

        let mut canvas = LoadedRgbaImage::filled(target, background);
        blend_over(canvas.as_rgba_mut(), scaled.as_rgba(), dest.x, dest.y);
        log::debug!(
            "composited {source_dimensions} onto {target} ({mode:?}) at {},{} size {}x{}",
            dest.x,
            dest.y,
            dest.width,
            dest.height
        );

        Ok(RenderResult {
            image: canvas,
            dimensions: target,
            origin: RenderOrigin::Composited {
                stem: stem.to_string(),
                mode,
            },
        })
    }
}

/// A canvas of `target` size where every pixel is `color`.
#[must_use]
pub fn flat_fill(target: Dimensions, color: Color) -> RenderResult {
    log::debug!("flat fill {target} with {color}");
    RenderResult {
        image: LoadedRgbaImage::filled(target, color),
        dimensions: target,
        origin: RenderOrigin::FlatFill { color },
    }
}

/// Source-over blend of straight-alpha `top` onto an opaque `canvas`.
///
/// Integer math keeps fully opaque and fully transparent pixels exact.
fn blend_over(canvas: &mut RgbaImage, top: &RgbaImage, x: u32, y: u32) {
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let Some(dst) = canvas.get_pixel_mut_checked(x + dx, y + dy) else {
            continue;
        };
        let alpha = u16::from(pixel.0[3]);
        for channel in 0..3 {
            let fg = u16::from(pixel.0[channel]);
            let bg = u16::from(dst.0[channel]);
            // at most 255 * 255 + 127, fits in u16
            dst.0[channel] = ((fg * alpha + bg * (255 - alpha) + 127) / 255) as u8;
        }
        dst.0[3] = u8::MAX;
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height).unwrap()
    }

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> LoadedRgbaImage {
        LoadedRgbaImage::from(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    fn compositor() -> ImageCompositor {
        ImageCompositor::new(FastResizer::default(), ResizeFilter::Nearest)
    }

    #[test]
    fn fit_within_letterboxes_with_background() {
        let source = solid(800, 600, [255, 0, 0, 255]);
        let result = compositor()
            .composite(
                &source,
                dims(800, 600),
                dims(400, 400),
                FitMode::FitWithin,
                Color::WHITE,
                "photo",
            )
            .unwrap();
        let canvas = result.image().as_rgba();
        assert_eq!(canvas.dimensions(), (400, 400));
        assert_eq!(canvas.get_pixel(200, 25).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(200, 49).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(200, 50).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(200, 349).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(200, 350).0, [255, 255, 255, 255]);
        assert!(result.image().is_opaque());
    }

    #[test]
    fn stretch_covers_whole_canvas() {
        let source = solid(10, 30, [0, 255, 0, 255]);
        let result = compositor()
            .composite(
                &source,
                dims(10, 30),
                dims(64, 16),
                FitMode::Stretch,
                Color::WHITE,
                "tall",
            )
            .unwrap();
        assert!(result.image().as_rgba().pixels().all(|p| p.0 == [0, 255, 0, 255]));
    }

    #[test]
    fn crop_to_fill_discards_sides() {
        // 300x100: red | green | blue thirds
        let source = LoadedRgbaImage::from(RgbaImage::from_fn(300, 100, |x, _| match x {
            0..100 => Rgba([255, 0, 0, 255]),
            100..200 => Rgba([0, 255, 0, 255]),
            _ => Rgba([0, 0, 255, 255]),
        }));
        let result = compositor()
            .composite(
                &source,
                dims(300, 100),
                dims(50, 50),
                FitMode::CropToFill,
                Color::WHITE,
                "bands",
            )
            .unwrap();
        assert!(result.image().as_rgba().pixels().all(|p| p.0 == [0, 255, 0, 255]));
    }

    #[test]
    fn transparent_source_blends_over_background() {
        let source = solid(4, 4, [0, 0, 0, 0]);
        let background = Color::rgb(12, 34, 56);
        let result = compositor()
            .composite(
                &source,
                dims(4, 4),
                dims(8, 8),
                FitMode::Stretch,
                background,
                "clear",
            )
            .unwrap();
        assert!(result.image().as_rgba().pixels().all(|p| p.0 == [12, 34, 56, 255]));
    }

    #[test]
    fn half_transparent_pixels_mix_with_background() {
        let mut canvas = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        let top = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]));
        blend_over(&mut canvas, &top, 1, 0);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(1, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn flat_fill_is_uniform() {
        let result = flat_fill(dims(7, 3), Color::rgb(1, 2, 3));
        assert_eq!(result.dimensions(), dims(7, 3));
        assert!(result.image().as_rgba().pixels().all(|p| p.0 == [1, 2, 3, 255]));
        assert_eq!(
            result.origin(),
            &RenderOrigin::FlatFill {
                color: Color::rgb(1, 2, 3)
            }
        );
        assert_eq!(result.file_name(), "010203_square_7x3.png");
    }

    #[test]
    fn composited_file_name_includes_mode_and_size() {
        let source = solid(2, 2, [0, 0, 0, 255]);
        let result = compositor()
            .composite(
                &source,
                dims(2, 2),
                dims(16, 32),
                FitMode::CropToFill,
                Color::WHITE,
                "logo",
            )
            .unwrap();
        assert_eq!(result.file_name(), "logo_crop_16x32.png");
    }
}
