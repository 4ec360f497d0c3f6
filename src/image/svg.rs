use image::RgbaImage;
use resvg::{tiny_skia, usvg};

use super::LoadError;

/// Rasterizes an SVG document at its intrinsic size.
///
/// The size is rounded to whole pixels and is at least 1x1. Output is
/// straight (non-premultiplied) RGBA.
pub fn rasterize(bytes: &[u8]) -> Result<RgbaImage, LoadError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &options)
        .map_err(|e| LoadError::Decode(format!("failed to parse SVG: {e}")))?;

    let size = tree.size();
    let width = (size.width().round() as u32).max(1);
    let height = (size.height().round() as u32).max(1);
    enforce_alloc_limit(width, height)?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        LoadError::Limits(format!("cannot allocate {width}x{height} SVG canvas"))
    })?;

    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    log::debug!("rasterized SVG at {width}x{height}");

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let straight = pixel.demultiply();
            [
                straight.red(),
                straight.green(),
                straight.blue(),
                straight.alpha(),
            ]
        })
        .collect();
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| LoadError::Decode("SVG raster has the wrong size".to_string()))
}

/// Applies the same allocation cap the raster decoders get from `image`.
fn enforce_alloc_limit(width: u32, height: u32) -> Result<(), LoadError> {
    let bytes = u64::from(width) * u64::from(height) * 4;
    match image::Limits::default().max_alloc {
        Some(max_alloc) if bytes > max_alloc => Err(LoadError::Limits(format!(
            "SVG canvas {width}x{height} needs {bytes} bytes, limit is {max_alloc}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20">
        <rect x="0" y="0" width="40" height="20" fill="#ff0000"/>
    </svg>"##;

    #[test]
    fn rasterizes_at_intrinsic_size() {
        let image = rasterize(RED_SQUARE.as_bytes()).unwrap();
        assert_eq!(image.dimensions(), (40, 20));
        assert_eq!(image.get_pixel(20, 10).0, [255, 0, 0, 255]);
    }

    #[test]
    fn rejects_canvas_over_alloc_limit() {
        let huge = r#"<svg xmlns="http://www.w3.org/2000/svg" width="12000" height="12000"/>"#;
        assert!(matches!(
            rasterize(huge.as_bytes()),
            Err(LoadError::Limits(_))
        ));
    }

    #[test]
    fn alloc_limit_allows_ordinary_sizes() {
        assert!(enforce_alloc_limit(4096, 4096).is_ok());
        assert!(enforce_alloc_limit(100_000, 100_000).is_err());
    }

    #[test]
    fn rejects_non_svg() {
        assert!(matches!(
            rasterize(b"definitely not xml"),
            Err(LoadError::Decode(_))
        ));
    }
}
