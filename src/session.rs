//! Mutable state for one editing session.
//!
//! The app owns a single [`Session`]. Every user action maps to one method;
//! rendering is lazy and cached until something that affects the output
//! changes.

use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::compositor::{self, ImageCompositor, RenderError, RenderResult};
use crate::config::AppConfig;
use crate::image::image_crate::{DynImageReader, DynImageWriter};
use crate::image::rgba_image::LoadedRgbaImage;
use crate::image::{ImageReader, LoadError, SaveError, SourceFormat};
use crate::layout::{
    height_for_width, limit_to_max, reconcile_to_ratio, validate_dimension, width_for_height,
    DimensionError, Dimensions, FitMode,
};
use crate::resize::fast_resizer::FastResizer;
use crate::resize::ResizeFilter;

/// A decoded input image. Replaced wholesale on every load.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    dimensions: Dimensions,
    pixels: LoadedRgbaImage,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, pixels: LoadedRgbaImage) -> Result<Self, LoadError> {
        let dimensions = pixels.dimensions().ok_or(LoadError::Empty)?;
        Ok(Self {
            name: name.into(),
            dimensions,
            pixels,
        })
    }

    /// Decodes `bytes` of a known format.
    pub fn decode(
        name: impl Into<String>,
        bytes: &[u8],
        format: SourceFormat,
    ) -> Result<Self, LoadError> {
        let pixels: LoadedRgbaImage = DynImageReader::default().decode(bytes, format)?;
        Self::new(name, pixels)
    }

    /// Reads and decodes a file.
    pub fn open(path: &Path, format: SourceFormat) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::decode(name, &bytes, format)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name up to the first `.`, or `"image"` when that is empty.
    #[must_use]
    pub fn stem(&self) -> &str {
        match self.name.split('.').next() {
            Some(stem) if !stem.is_empty() => stem,
            _ => "image",
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub fn pixels(&self) -> &LoadedRgbaImage {
        &self.pixels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    pub dimensions: Dimensions,
    pub aspect_locked: bool,
}

/// Identifies one load request; completions with an old ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What the next render should draw.
#[derive(Debug, Clone)]
enum Content {
    Empty,
    Source(SourceImage),
    Fill(Color),
}

pub struct Session {
    compositor: ImageCompositor,
    writer: DynImageWriter,
    content: Content,
    target: TargetSpec,
    fit_mode: FitMode,
    background: Color,
    max_dimension: u32,
    target_from_user: bool,
    generation: u64,
    revision: u64,
    result: Option<RenderResult>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            compositor: ImageCompositor::new(FastResizer::default(), config.resize_filter),
            writer: DynImageWriter::default(),
            content: Content::Empty,
            target: TargetSpec {
                dimensions: config.default_target,
                aspect_locked: true,
            },
            fit_mode: FitMode::default(),
            background: config.background,
            max_dimension: config.max_dimension,
            target_from_user: false,
            generation: 0,
            revision: 0,
            result: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&SourceImage> {
        match &self.content {
            Content::Source(source) => Some(source),
            _ => None,
        }
    }

    #[must_use]
    pub fn fill_color(&self) -> Option<Color> {
        match self.content {
            Content::Fill(color) => Some(color),
            _ => None,
        }
    }

    #[must_use]
    pub fn target(&self) -> TargetSpec {
        self.target
    }

    #[must_use]
    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    #[must_use]
    pub fn resize_filter(&self) -> ResizeFilter {
        self.compositor.filter()
    }

    #[must_use]
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Bumped every time a new result is rendered.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        !matches!(self.content, Content::Empty)
    }

    /// Replaces the source image and adapts the target to it.
    ///
    /// The first source sets the target to its natural size. Later sources
    /// keep the current target, shrunk to their ratio when the lock is on.
    pub fn set_source(&mut self, source: SourceImage) {
        let natural = source.dimensions();
        if self.target_from_user {
            if self.target.aspect_locked {
                self.target.dimensions =
                    self.clamp(reconcile_to_ratio(self.target.dimensions, natural.aspect_ratio()));
            }
        } else {
            self.target.dimensions = self.clamp(natural);
            self.target_from_user = true;
        }
        log::info!(
            "loaded {} ({natural}), target {}",
            source.name(),
            self.target.dimensions
        );
        self.content = Content::Source(source);
        self.invalidate();
    }

    /// Sets both dimensions as given, without aspect correction.
    pub fn set_target_dimensions(&mut self, width: u32, height: u32) -> Result<(), DimensionError> {
        let width = validate_dimension(width, self.max_dimension)?;
        let height = validate_dimension(height, self.max_dimension)?;
        self.apply_target(width, height);
        Ok(())
    }

    /// Sets the width; with the lock on and a source loaded, the height follows.
    pub fn set_target_width(&mut self, width: u32) -> Result<(), DimensionError> {
        let width = self.validate_logged(width)?;
        match self.locked_ratio() {
            Some(ratio) => self.apply_locked(width, height_for_width(width, ratio)),
            None => self.apply_target(width, self.target.dimensions.height()),
        }
        Ok(())
    }

    /// Sets the height; with the lock on and a source loaded, the width follows.
    pub fn set_target_height(&mut self, height: u32) -> Result<(), DimensionError> {
        let height = self.validate_logged(height)?;
        match self.locked_ratio() {
            Some(ratio) => self.apply_locked(width_for_height(height, ratio), height),
            None => self.apply_target(self.target.dimensions.width(), height),
        }
        Ok(())
    }

    /// Turning the lock on snaps the target to the source ratio.
    pub fn set_aspect_locked(&mut self, locked: bool) {
        if self.target.aspect_locked == locked {
            return;
        }
        self.target.aspect_locked = locked;
        if let Some(ratio) = self.locked_ratio() {
            let reconciled = self.clamp(reconcile_to_ratio(self.target.dimensions, ratio));
            if reconciled != self.target.dimensions {
                self.target.dimensions = reconciled;
                self.invalidate();
            }
        }
    }

    pub fn set_fit_mode(&mut self, mode: FitMode) {
        if self.fit_mode != mode {
            self.fit_mode = mode;
            if self.source().is_some() {
                self.invalidate();
            }
        }
    }

    pub fn set_background(&mut self, color: Color) {
        if self.background != color {
            self.background = color;
            if self.source().is_some() {
                self.invalidate();
            }
        }
    }

    pub fn set_resize_filter(&mut self, filter: ResizeFilter) {
        if self.compositor.filter() != filter {
            self.compositor.set_filter(filter);
            if self.source().is_some() {
                self.invalidate();
            }
        }
    }

    /// Discards the source and renders a flat `color` canvas instead.
    ///
    /// Loads started before this call become stale.
    pub fn generate_flat_fill(&mut self, color: Color) {
        self.generation += 1;
        if let Content::Source(source) = &self.content {
            log::info!("discarding {} for flat fill", source.name());
        }
        log::info!("flat fill {color} at {}", self.target.dimensions);
        self.content = Content::Fill(color);
        self.invalidate();
    }

    /// Starts a load; only the latest ticket will be accepted.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    #[must_use]
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Applies a finished load.
    ///
    /// Returns `Ok(false)` when the ticket is stale; the result is dropped
    /// and nothing changes. A failed load also leaves the session untouched.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SourceImage, LoadError>,
    ) -> Result<bool, LoadError> {
        if !self.is_current(ticket) {
            log::warn!(
                "dropping stale load {} (current generation {})",
                ticket.0,
                self.generation
            );
            return Ok(false);
        }
        let source = result.inspect_err(|err| log::warn!("load failed: {err}"))?;
        self.set_source(source);
        Ok(true)
    }

    /// Renders if anything changed since the last call.
    ///
    /// `Ok(None)` means there is nothing to draw yet.
    pub fn render(&mut self) -> Result<Option<&RenderResult>, RenderError> {
        if self.result.is_none() {
            let target = self.target.dimensions;
            let rendered = match &self.content {
                Content::Empty => None,
                Content::Fill(color) => Some(compositor::flat_fill(target, *color)),
                Content::Source(source) => Some(self.compositor.composite(
                    source.pixels(),
                    source.dimensions(),
                    target,
                    self.fit_mode,
                    self.background,
                    source.stem(),
                )?),
            };
            if rendered.is_some() {
                self.revision += 1;
            }
            self.result = rendered;
        }
        Ok(self.result.as_ref())
    }

    /// Last rendered result, without re-rendering.
    #[must_use]
    pub fn current_result(&self) -> Option<&RenderResult> {
        self.result.as_ref()
    }

    /// PNG bytes of the current render.
    pub fn export(&mut self) -> Result<Vec<u8>, SaveError> {
        self.render()?;
        let result = self.result.as_ref().ok_or(SaveError::NothingToExport)?;
        let bytes = result.encode_png(&self.writer)?;
        log::info!("exported {} ({} bytes)", result.file_name(), bytes.len());
        Ok(bytes)
    }

    /// Suggested download name for the current render.
    pub fn file_name(&mut self) -> Result<Option<String>, RenderError> {
        Ok(self.render()?.map(RenderResult::file_name))
    }

    /// Writes the PNG to `path`, adding a `.png` extension when missing.
    pub fn save_png(&mut self, path: &Path) -> Result<PathBuf, SaveError> {
        let path = with_png_extension(path);
        let bytes = self.export()?;
        std::fs::write(&path, bytes)?;
        log::info!("saved {}", path.display());
        Ok(path)
    }

    fn apply_target(&mut self, width: u32, height: u32) {
        self.target_from_user = true;
        let Some(dimensions) = Dimensions::new(width, height) else {
            return;
        };
        if dimensions != self.target.dimensions {
            self.target.dimensions = dimensions;
            if self.has_content() {
                self.invalidate();
            }
        }
    }

    /// Applies a ratio-derived pair, shrinking both sides if one overflows.
    fn apply_locked(&mut self, width: u32, height: u32) {
        if let Some(dimensions) = Dimensions::new(width, height) {
            let limited = limit_to_max(dimensions, self.max_dimension);
            self.apply_target(limited.width(), limited.height());
        }
    }

    fn locked_ratio(&self) -> Option<f64> {
        self.target
            .aspect_locked
            .then(|| self.source().map(|source| source.dimensions().aspect_ratio()))
            .flatten()
    }

    fn validate_logged(&self, value: u32) -> Result<u32, DimensionError> {
        validate_dimension(value, self.max_dimension)
            .inspect_err(|err| log::warn!("ignoring dimension {value}: {err}"))
    }

    /// Keeps `dimensions` within the maximum; with the lock on the ratio is kept.
    fn clamp(&self, dimensions: Dimensions) -> Dimensions {
        if self.target.aspect_locked {
            return limit_to_max(dimensions, self.max_dimension);
        }
        Dimensions::new(
            dimensions.width().clamp(1, self.max_dimension),
            dimensions.height().clamp(1, self.max_dimension),
        )
        .unwrap_or(dimensions)
    }

    fn invalidate(&mut self) {
        self.result = None;
    }
}

#[must_use]
pub fn with_png_extension(path: &Path) -> PathBuf {
    let has_png = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if has_png {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".png");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn source(name: &str, width: u32, height: u32) -> SourceImage {
        let pixels = LoadedRgbaImage::from(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 100, 50, 255]),
        ));
        SourceImage::new(name, pixels).unwrap()
    }

    fn session() -> Session {
        Session::new(&AppConfig::default())
    }

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::new(width, height).unwrap()
    }

    #[test]
    fn first_load_uses_natural_size() {
        let mut session = session();
        session.set_source(source("photo.jpg", 800, 600));
        assert_eq!(session.target().dimensions, dims(800, 600));
    }

    #[test]
    fn later_load_keeps_target_and_corrects_ratio() {
        let mut session = session();
        session.set_source(source("a.png", 800, 600));
        session.set_target_dimensions(400, 400).unwrap();
        session.set_source(source("b.png", 100, 200));
        assert_eq!(session.target().dimensions, dims(200, 400));
    }

    #[test]
    fn later_load_without_lock_keeps_target() {
        let mut session = session();
        session.set_aspect_locked(false);
        session.set_target_dimensions(300, 300).unwrap();
        session.set_source(source("b.png", 100, 200));
        assert_eq!(session.target().dimensions, dims(300, 300));
    }

    #[test]
    fn locked_width_edit_recomputes_height() {
        let mut session = session();
        session.set_source(source("photo.jpg", 800, 600));
        session.set_target_width(400).unwrap();
        assert_eq!(session.target().dimensions, dims(400, 300));
        session.set_target_height(150).unwrap();
        assert_eq!(session.target().dimensions, dims(200, 150));
    }

    #[test]
    fn unlocked_edit_changes_one_side() {
        let mut session = session();
        session.set_source(source("photo.jpg", 800, 600));
        session.set_aspect_locked(false);
        session.set_target_width(100).unwrap();
        assert_eq!(session.target().dimensions, dims(100, 600));
    }

    #[test]
    fn invalid_dimension_keeps_previous_value() {
        let mut session = session();
        session.set_source(source("photo.jpg", 800, 600));
        assert_eq!(session.set_target_width(0), Err(DimensionError::Zero));
        assert!(matches!(
            session.set_target_height(20_000),
            Err(DimensionError::TooLarge { .. })
        ));
        assert_eq!(session.target().dimensions, dims(800, 600));
    }

    #[test]
    fn oversized_source_keeps_ratio_under_max() {
        let mut session = session();
        session.set_source(source("strip.png", 20_000, 2));
        assert!(session.target().aspect_locked);
        assert_eq!(session.target().dimensions, dims(10_000, 1));
    }

    #[test]
    fn oversized_source_without_lock_clamps_each_side() {
        let mut session = session();
        session.set_aspect_locked(false);
        session.set_source(source("strip.png", 20_000, 2));
        assert_eq!(session.target().dimensions, dims(10_000, 2));
    }

    #[test]
    fn locked_edit_that_overflows_scales_both_sides() {
        let mut session = session();
        session.set_source(source("tall.png", 100, 400));
        session.set_target_width(5000).unwrap();
        assert_eq!(session.target().dimensions, dims(2500, 10_000));
        session.set_source(source("wide.png", 400, 100));
        session.set_target_height(5000).unwrap();
        assert_eq!(session.target().dimensions, dims(10_000, 2500));
    }

    #[test]
    fn relocking_snaps_to_source_ratio() {
        let mut session = session();
        session.set_source(source("photo.jpg", 800, 600));
        session.set_aspect_locked(false);
        session.set_target_dimensions(400, 400).unwrap();
        session.set_aspect_locked(true);
        assert_eq!(session.target().dimensions, dims(400, 300));
    }

    #[test]
    fn render_is_cached_until_invalidated() {
        let mut session = session();
        assert!(session.render().unwrap().is_none());
        session.set_source(source("photo.jpg", 80, 60));
        session.render().unwrap();
        let first = session.revision();
        session.render().unwrap();
        assert_eq!(session.revision(), first);
        session.set_fit_mode(FitMode::CropToFill);
        session.render().unwrap();
        assert_eq!(session.revision(), first + 1);
    }

    #[test]
    fn flat_fill_discards_source() {
        let mut session = session();
        session.set_source(source("photo.jpg", 80, 60));
        session.generate_flat_fill(Color::BLACK);
        assert!(session.source().is_none());
        assert_eq!(session.fill_color(), Some(Color::BLACK));
        let result = session.render().unwrap().unwrap();
        assert_eq!(result.dimensions(), dims(80, 60));
        assert!(result.image().as_rgba().pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn flat_fill_follows_later_size_changes() {
        let mut session = session();
        session.generate_flat_fill(Color::WHITE);
        session.set_target_dimensions(16, 8).unwrap();
        assert_eq!(
            session.file_name().unwrap().as_deref(),
            Some("ffffff_square_16x8.png")
        );
    }

    #[test]
    fn stale_load_is_dropped() {
        let mut session = session();
        let first = session.begin_load();
        let second = session.begin_load();
        assert!(!session.finish_load(first, Ok(source("old.png", 10, 10))).unwrap());
        assert!(session.source().is_none());
        assert!(session.finish_load(second, Ok(source("new.png", 20, 10))).unwrap());
        assert_eq!(session.source().map(SourceImage::name), Some("new.png"));
    }

    #[test]
    fn flat_fill_makes_pending_load_stale() {
        let mut session = session();
        let ticket = session.begin_load();
        session.generate_flat_fill(Color::BLACK);
        assert!(!session.finish_load(ticket, Ok(source("late.png", 4, 4))).unwrap());
        assert_eq!(session.fill_color(), Some(Color::BLACK));
    }

    #[test]
    fn failed_load_keeps_prior_state() {
        let mut session = session();
        session.set_source(source("keep.png", 30, 20));
        let ticket = session.begin_load();
        let err = session
            .finish_load(ticket, Err(LoadError::Decode("broken".into())))
            .unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)));
        assert_eq!(session.source().map(SourceImage::name), Some("keep.png"));
        assert_eq!(session.target().dimensions, dims(30, 20));
    }

    #[test]
    fn export_without_content_fails() {
        let mut session = session();
        assert!(matches!(session.export(), Err(SaveError::NothingToExport)));
    }

    #[test]
    fn stem_stops_at_first_dot() {
        assert_eq!(source("my.photo.final.png", 1, 1).stem(), "my");
        assert_eq!(source(".hidden", 1, 1).stem(), "image");
    }

    #[test]
    fn png_extension_is_added_once() {
        assert_eq!(
            with_png_extension(Path::new("out/icon")),
            PathBuf::from("out/icon.png")
        );
        assert_eq!(
            with_png_extension(Path::new("out/icon.PNG")),
            PathBuf::from("out/icon.PNG")
        );
        assert_eq!(
            with_png_extension(Path::new("out/icon.jpg")),
            PathBuf::from("out/icon.jpg.png")
        );
    }
}
