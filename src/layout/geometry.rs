use super::{round_half_up, Dimensions, FitMode};

/// Rectangle in floating point pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn from_dimensions(dimensions: Dimensions) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: f64::from(dimensions.width()),
            height: f64::from(dimensions.height()),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Rectangle snapped to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Which part of the source is drawn, and where on the canvas it lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub source: Rect,
    pub dest: Rect,
}

impl Placement {
    /// Destination snapped to the pixel grid of `target`.
    ///
    /// Edges are rounded independently so adjacent bars never leave a seam,
    /// and the result is at least one pixel and never outside the canvas.
    #[must_use]
    pub fn dest_pixels(&self, target: Dimensions) -> PixelRect {
        let (x, width) = snap_span(self.dest.x, self.dest.width, target.width());
        let (y, height) = snap_span(self.dest.y, self.dest.height, target.height());
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the whole source is drawn, so no crop box is needed.
    #[must_use]
    pub fn uses_whole_source(&self, source: Dimensions) -> bool {
        self.source == Rect::from_dimensions(source)
    }
}

fn snap_span(start: f64, length: f64, limit: u32) -> (u32, u32) {
    let limit_f = f64::from(limit);
    let first = round_half_up(start).clamp(0.0, limit_f - 1.0);
    let last = round_half_up(start + length).clamp(first + 1.0, limit_f);
    // both bounds are whole numbers inside 0..=limit
    (first as u32, (last - first) as u32)
}

/// Maps `source` onto a `target` canvas according to `mode`.
#[must_use]
pub fn compute_placement(source: Dimensions, target: Dimensions, mode: FitMode) -> Placement {
    let sw = f64::from(source.width());
    let sh = f64::from(source.height());
    let tw = f64::from(target.width());
    let th = f64::from(target.height());
    let image_ratio = source.aspect_ratio();
    let target_ratio = target.aspect_ratio();
    let whole_source = Rect::from_dimensions(source);
    let whole_target = Rect::from_dimensions(target);

    let placement = match mode {
        FitMode::FitWithin => {
            let dest = if image_ratio > target_ratio {
                let draw_height = tw / image_ratio;
                Rect {
                    x: 0.0,
                    y: (th - draw_height) / 2.0,
                    width: tw,
                    height: draw_height,
                }
            } else {
                let draw_width = th * image_ratio;
                Rect {
                    x: (tw - draw_width) / 2.0,
                    y: 0.0,
                    width: draw_width,
                    height: th,
                }
            };
            Placement {
                source: whole_source,
                dest,
            }
        }
        FitMode::Stretch => Placement {
            source: whole_source,
            dest: whole_target,
        },
        FitMode::CropToFill => {
            let crop = if image_ratio > target_ratio {
                let crop_width = sh * target_ratio;
                Rect {
                    x: (sw - crop_width) / 2.0,
                    y: 0.0,
                    width: crop_width,
                    height: sh,
                }
            } else {
                let crop_height = sw / target_ratio;
                Rect {
                    x: 0.0,
                    y: (sh - crop_height) / 2.0,
                    width: sw,
                    height: crop_height,
                }
            };
            Placement {
                source: crop,
                dest: whole_target,
            }
        }
    };
    log::debug!(
        "placement {source} -> {target} ({mode:?}): source {:?}, dest {:?}",
        placement.source,
        placement.dest
    );
    placement
}
