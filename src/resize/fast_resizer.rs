use fast_image_resize::{FilterType, ImageBufferError, PixelType, ResizeOptions};

use crate::image::{Image, PixelFormat};
use crate::layout::Rect;

use super::{ResizeError, ResizeFilter, Resizer};

#[derive(Debug, Default)]
pub struct FastResizer {
    inner: fast_image_resize::Resizer,
}

impl From<ImageBufferError> for ResizeError {
    fn from(value: ImageBufferError) -> Self {
        ResizeError::ResizeBufferError(value.to_string())
    }
}

impl From<fast_image_resize::ResizeError> for ResizeError {
    fn from(value: fast_image_resize::ResizeError) -> Self {
        ResizeError::ResizeError(value.to_string())
    }
}

struct FastResizeFilterType(fast_image_resize::FilterType);

impl From<ResizeFilter> for FastResizeFilterType {
    fn from(value: ResizeFilter) -> Self {
        match value {
            ResizeFilter::Nearest => FastResizeFilterType(FilterType::Box),
            ResizeFilter::Bilinear => FastResizeFilterType(FilterType::Bilinear),
            ResizeFilter::Hamming => FastResizeFilterType(FilterType::Hamming),
            ResizeFilter::CatmullRom => FastResizeFilterType(FilterType::CatmullRom),
            ResizeFilter::Mitchell => FastResizeFilterType(FilterType::Mitchell),
            ResizeFilter::Gaussian => FastResizeFilterType(FilterType::Gaussian),
            ResizeFilter::Lanczos3 => FastResizeFilterType(FilterType::Lanczos3),
        }
    }
}

impl From<PixelFormat> for PixelType {
    fn from(value: PixelFormat) -> Self {
        match value {
            PixelFormat::Rgba8 => PixelType::U8x4,
            PixelFormat::Rgb8 => PixelType::U8x3,
        }
    }
}

impl TryFrom<PixelType> for PixelFormat {
    type Error = ResizeError;

    fn try_from(value: PixelType) -> Result<Self, Self::Error> {
        match value {
            PixelType::U8x3 => Ok(PixelFormat::Rgb8),
            PixelType::U8x4 => Ok(PixelFormat::Rgba8),
            other => Err(ResizeError::ResizeBufferError(format!(
                "unsupported pixel type {other:?}"
            ))),
        }
    }
}

impl Resizer for FastResizer {
    fn resize<T>(
        &mut self,
        source_image: &T,
        crop: Option<Rect>,
        target_size: (u32, u32),
        filter: ResizeFilter,
    ) -> Result<T, ResizeError>
    where
        T: Image,
    {
        let source_image_ref = fast_image_resize::images::ImageRef::new(
            source_image.width(),
            source_image.height(),
            source_image.as_bytes(),
            source_image.pixel_format().into(),
        )?;
        let mut resized_image_buffer = fast_image_resize::images::Image::new(
            target_size.0,
            target_size.1,
            source_image.pixel_format().into(),
        );
        let mut options = ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Convolution(FastResizeFilterType::from(filter).0),
        );
        if let Some(crop) = crop {
            options = options.crop(crop.x, crop.y, crop.width, crop.height);
        }
        self.inner
            .resize(&source_image_ref, &mut resized_image_buffer, &options)?;
        let pixel_format = PixelFormat::try_from(resized_image_buffer.pixel_type())?;

        T::from_parts(
            resized_image_buffer.width(),
            resized_image_buffer.height(),
            resized_image_buffer.into_vec(),
            pixel_format,
        )
        .ok_or_else(|| ResizeError::ResizeBufferError("resized buffer has the wrong size".into()))
    }
}
