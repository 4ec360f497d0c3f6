use std::io::Cursor;

use image::{ExtendedColorType, ImageError, ImageFormat, write_buffer_with_format};

use super::{
    Image, ImageReader, ImageWriter, LoadError, PixelFormat, SaveError, SourceFormat, svg,
};

impl From<ImageError> for LoadError {
    fn from(value: ImageError) -> Self {
        match value {
            ImageError::Decoding(decoding_error) => LoadError::Decode(decoding_error.to_string()),
            ImageError::Encoding(encoding_error) => LoadError::Decode(encoding_error.to_string()),
            ImageError::Parameter(parameter_error) => {
                LoadError::Decode(parameter_error.to_string())
            }
            ImageError::Limits(limit_error) => LoadError::Limits(limit_error.to_string()),
            ImageError::Unsupported(unsupported_error) => {
                LoadError::UnsupportedType(unsupported_error.to_string())
            }
            ImageError::IoError(error) => LoadError::Io(error),
        }
    }
}

impl From<ImageError> for SaveError {
    fn from(value: ImageError) -> Self {
        match value {
            ImageError::IoError(error) => SaveError::Io(error),
            other => SaveError::Encoding(other.to_string()),
        }
    }
}

struct RasterFormat(ImageFormat);

impl TryFrom<SourceFormat> for RasterFormat {
    type Error = SourceFormat;

    fn try_from(value: SourceFormat) -> Result<Self, Self::Error> {
        match value {
            SourceFormat::Png => Ok(RasterFormat(ImageFormat::Png)),
            SourceFormat::Jpeg => Ok(RasterFormat(ImageFormat::Jpeg)),
            SourceFormat::Svg => Err(value),
        }
    }
}

impl From<PixelFormat> for ExtendedColorType {
    fn from(value: PixelFormat) -> Self {
        match value {
            PixelFormat::Rgba8 => ExtendedColorType::Rgba8,
            PixelFormat::Rgb8 => ExtendedColorType::Rgb8,
        }
    }
}

/// Decodes PNG and JPEG with the `image` crate and rasterizes SVG.
#[derive(Default)]
pub struct DynImageReader {}

/// Writes PNG with the `image` crate.
#[derive(Default)]
pub struct DynImageWriter {}

impl ImageReader for DynImageReader {
    fn decode<T>(&self, bytes: &[u8], format: SourceFormat) -> Result<T, LoadError>
    where
        T: Image,
    {
        let rgba = match RasterFormat::try_from(format) {
            Ok(RasterFormat(raster)) => {
                image::load_from_memory_with_format(bytes, raster)?.into_rgba8()
            }
            Err(_) => svg::rasterize(bytes)?,
        };
        let width = rgba.width();
        let height = rgba.height();
        if width == 0 || height == 0 {
            return Err(LoadError::Empty);
        }
        T::from_parts(width, height, rgba.into_raw(), PixelFormat::Rgba8)
            .ok_or_else(|| LoadError::Decode("decoded buffer has the wrong size".to_string()))
    }
}

impl ImageWriter for DynImageWriter {
    fn encode_png<T>(&self, image: &T) -> Result<Vec<u8>, SaveError>
    where
        T: Image,
    {
        let mut buf = Cursor::new(Vec::new());
        write_buffer_with_format(
            &mut buf,
            image.as_bytes(),
            image.width(),
            image.height(),
            ExtendedColorType::from(image.pixel_format()),
            ImageFormat::Png,
        )?;
        Ok(buf.into_inner())
    }
}

/// Opaque RGB view over an RGBA canvas, so exports carry no alpha channel.
pub struct OpaqueRgbImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image for OpaqueRgbImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgb8
    }

    fn from_parts(
        width: u32,
        height: u32,
        data: Vec<u8>,
        pixel_format: PixelFormat,
    ) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(PixelFormat::Rgb8.bytes_per_pixel())?;
        (pixel_format == PixelFormat::Rgb8 && data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, RgbaImage};

    use super::*;
    use crate::color::Color;
    use crate::image::rgba_image::LoadedRgbaImage;
    use crate::layout::Dimensions;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn encode_with(format: ImageFormat, image: RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
            _ => DynamicImage::ImageRgba8(image),
        };
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_png_into_rgba() {
        let bytes = encode_with(ImageFormat::Png, RgbaImage::from_pixel(6, 4, image::Rgba([9, 8, 7, 255])));
        let decoded: LoadedRgbaImage = DynImageReader::default()
            .decode(&bytes, SourceFormat::Png)
            .unwrap();
        assert_eq!(decoded.width(), 6);
        assert_eq!(decoded.height(), 4);
        assert_eq!(decoded.as_rgba().get_pixel(0, 0).0, [9, 8, 7, 255]);
    }

    #[test]
    fn decodes_jpeg() {
        let bytes = encode_with(ImageFormat::Jpeg, RgbaImage::new(16, 8));
        let decoded: LoadedRgbaImage = DynImageReader::default()
            .decode(&bytes, SourceFormat::Jpeg)
            .unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result: Result<LoadedRgbaImage, _> =
            DynImageReader::default().decode(b"not an image", SourceFormat::Png);
        assert!(result.is_err());
    }

    #[test]
    fn encodes_png_with_magic_number() {
        let canvas = LoadedRgbaImage::filled(Dimensions::new(5, 5).unwrap(), Color::BLACK);
        let data = DynImageWriter::default().encode_png(&canvas).unwrap();
        assert_eq!(&data[0..8], &PNG_MAGIC);
    }

    #[test]
    fn opaque_rgb_round_trips_through_png() {
        let canvas = LoadedRgbaImage::filled(Dimensions::new(3, 3).unwrap(), Color::rgb(10, 20, 30));
        let rgb = OpaqueRgbImage::from_parts(3, 3, canvas.to_rgb_bytes(), PixelFormat::Rgb8).unwrap();
        let data = DynImageWriter::default().encode_png(&rgb).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!(decoded.to_rgb8().get_pixel(2, 2).0, [10, 20, 30]);
    }

    #[test]
    fn opaque_rgb_rejects_wrong_length() {
        assert!(OpaqueRgbImage::from_parts(2, 2, vec![0; 11], PixelFormat::Rgb8).is_none());
        assert!(OpaqueRgbImage::from_parts(2, 2, vec![0; 16], PixelFormat::Rgba8).is_none());
    }
}
