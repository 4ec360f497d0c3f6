use std::{io, path::Path};

pub mod image_crate;
pub mod rgba_image;
pub mod svg;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Please select a valid image file (PNG, JPEG, or SVG)")]
    UnsupportedType(String),
    #[error("could not read file: {0}")]
    Io(#[from] io::Error),
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("image is too large: {0}")]
    Limits(String),
    #[error("image has no pixels")]
    Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("nothing to export yet")]
    NothingToExport,
    #[error("could not write file: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode image: {0}")]
    Encoding(String),
    #[error(transparent)]
    Render(#[from] crate::compositor::RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    Rgb8,
}

impl PixelFormat {
    #[must_use]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// Input formats the tool accepts.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Svg,
}

impl SourceFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["png", "jpg", "jpeg", "svg"];

    /// Validates a declared MIME type.
    pub fn from_mime(mime: &str) -> Result<Self, LoadError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(SourceFormat::Png),
            "image/jpeg" | "image/jpg" => Ok(SourceFormat::Jpeg),
            "image/svg+xml" => Ok(SourceFormat::Svg),
            other => Err(LoadError::UnsupportedType(other.to_string())),
        }
    }

    #[must_use]
    pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "svg" => Some("image/svg+xml"),
            _ => None,
        }
    }

    /// Resolves the format of a file, preferring an explicit MIME type.
    ///
    /// Without one the MIME type is derived from the extension.
    pub fn detect(path: &Path, declared_mime: Option<&str>) -> Result<Self, LoadError> {
        match declared_mime.filter(|mime| !mime.trim().is_empty()) {
            Some(mime) => Self::from_mime(mime),
            None => {
                let extension = path
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_string())
                    .unwrap_or_default();
                let mime = Self::mime_for_extension(&extension)
                    .ok_or(LoadError::UnsupportedType(extension))?;
                Self::from_mime(mime)
            }
        }
    }
}

pub trait Image: Sized {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn as_bytes(&self) -> &[u8];
    fn pixel_format(&self) -> PixelFormat;
    /// Returns `None` when `data` does not match the dimensions and format.
    fn from_parts(width: u32, height: u32, data: Vec<u8>, pixel_format: PixelFormat)
    -> Option<Self>;
}

pub trait ImageReader {
    fn decode<T>(&self, bytes: &[u8], format: SourceFormat) -> Result<T, LoadError>
    where
        T: Image;
}

pub trait ImageWriter {
    fn encode_png<T>(&self, image: &T) -> Result<Vec<u8>, SaveError>
    where
        T: Image;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn accepts_only_png_jpeg_and_svg() {
        assert_eq!(SourceFormat::from_mime("image/png").unwrap(), SourceFormat::Png);
        assert_eq!(SourceFormat::from_mime("image/jpg").unwrap(), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_mime("IMAGE/JPEG").unwrap(), SourceFormat::Jpeg);
        assert_eq!(
            SourceFormat::from_mime("image/svg+xml").unwrap(),
            SourceFormat::Svg
        );
        assert!(matches!(
            SourceFormat::from_mime("image/gif"),
            Err(LoadError::UnsupportedType(_))
        ));
        assert!(matches!(
            SourceFormat::from_mime("text/plain"),
            Err(LoadError::UnsupportedType(_))
        ));
    }

    #[test]
    fn detect_prefers_declared_mime() {
        let path = PathBuf::from("photo.png");
        assert_eq!(
            SourceFormat::detect(&path, Some("image/jpeg")).unwrap(),
            SourceFormat::Jpeg
        );
        assert_eq!(SourceFormat::detect(&path, Some("")).unwrap(), SourceFormat::Png);
        assert_eq!(SourceFormat::detect(&path, None).unwrap(), SourceFormat::Png);
    }

    #[test]
    fn detect_falls_back_to_extension() {
        assert_eq!(
            SourceFormat::detect(Path::new("Logo.SVG"), None).unwrap(),
            SourceFormat::Svg
        );
        assert!(SourceFormat::detect(Path::new("anim.gif"), None).is_err());
        assert!(SourceFormat::detect(Path::new("README"), None).is_err());
    }

    #[test]
    fn unsupported_type_message_is_user_facing() {
        let err = SourceFormat::from_mime("image/webp").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please select a valid image file (PNG, JPEG, or SVG)"
        );
    }
}
