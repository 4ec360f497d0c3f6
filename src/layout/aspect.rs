//! Keeping target dimensions in step with a source aspect ratio.
//!
//! `ratio` is always width / height of a [`Dimensions`](super::Dimensions),
//! so it is finite and positive. Results are at least one pixel.

use super::{round_half_up, Dimensions};

fn to_pixels(value: f64) -> u32 {
    // float to int casts saturate, so huge ratios cannot wrap
    (round_half_up(value) as u32).max(1)
}

#[must_use]
pub fn height_for_width(width: u32, ratio: f64) -> u32 {
    to_pixels(f64::from(width) / ratio)
}

#[must_use]
pub fn width_for_height(height: u32, ratio: f64) -> u32 {
    to_pixels(f64::from(height) * ratio)
}

/// Shrinks whichever side of `current` is too long for `ratio`.
///
/// Used when a new source arrives while the canvas size is kept.
#[must_use]
pub fn reconcile_to_ratio(current: Dimensions, ratio: f64) -> Dimensions {
    let (width, height) = if current.aspect_ratio() > ratio {
        (width_for_height(current.height(), ratio), current.height())
    } else {
        (current.width(), height_for_width(current.width(), ratio))
    };
    Dimensions::new(width, height).unwrap_or(current)
}

/// Scales both sides down by the same factor until neither exceeds `max`.
#[must_use]
pub fn limit_to_max(current: Dimensions, max: u32) -> Dimensions {
    let longest = current.width().max(current.height());
    if longest <= max {
        return current;
    }
    let scale = f64::from(max) / f64::from(longest);
    let width = to_pixels(f64::from(current.width()) * scale).min(max);
    let height = to_pixels(f64::from(current.height()) * scale).min(max);
    Dimensions::new(width, height).unwrap_or(current)
}
