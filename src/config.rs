//! Tunable defaults for the generator.
//!
//! `AppConfig::default()` is what the desktop app ships with. A few values
//! can be overridden through `ICON_GENERATOR_*` environment variables;
//! invalid overrides are logged and ignored.

use std::time::Duration;

use crate::color::Color;
use crate::layout::{parse_dimension, Dimensions};
use crate::resize::ResizeFilter;

pub const MAX_DIMENSION_VAR: &str = "ICON_GENERATOR_MAX_DIMENSION";
pub const DEFAULT_SIZE_VAR: &str = "ICON_GENERATOR_DEFAULT_SIZE";
pub const FILTER_VAR: &str = "ICON_GENERATOR_FILTER";
pub const BACKGROUND_VAR: &str = "ICON_GENERATOR_BACKGROUND";
pub const FILL_VAR: &str = "ICON_GENERATOR_FILL";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Canvas color behind letterboxed or transparent images.
    pub background: Color,
    /// Color used by "generate flat square".
    pub fill: Color,
    /// Target size before any image is loaded.
    pub default_target: Dimensions,
    /// Upper bound for either target dimension.
    pub max_dimension: u32,
    pub resize_filter: ResizeFilter,
    /// How long a status banner stays visible.
    pub message_lifetime: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            fill: Color::BLACK,
            default_target: DEFAULT_TARGET,
            max_dimension: 10_000,
            resize_filter: ResizeFilter::Lanczos3,
            message_lifetime: Duration::from_secs(5),
        }
    }
}

const DEFAULT_TARGET: Dimensions = match Dimensions::square(512) {
    Some(dims) => dims,
    None => unreachable!(),
};

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup` on top of the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_DIMENSION_VAR) {
            match parse_dimension(&raw) {
                Ok(max) => config.max_dimension = max,
                Err(err) => log::warn!("ignoring {MAX_DIMENSION_VAR}={raw:?}: {err}"),
            }
        }

        if let Some(raw) = lookup(DEFAULT_SIZE_VAR) {
            match parse_size(&raw) {
                Some(size) => config.default_target = size,
                None => log::warn!("ignoring {DEFAULT_SIZE_VAR}={raw:?}: expected WIDTHxHEIGHT"),
            }
        }

        if let Some(raw) = lookup(FILTER_VAR) {
            match ResizeFilter::from_name(&raw) {
                Some(filter) => config.resize_filter = filter,
                None => log::warn!("ignoring {FILTER_VAR}={raw:?}: unknown filter"),
            }
        }

        for (var, slot) in [
            (BACKGROUND_VAR, &mut config.background),
            (FILL_VAR, &mut config.fill),
        ] {
            if let Some(raw) = lookup(var) {
                match raw.parse::<Color>() {
                    Ok(color) => *slot = color,
                    Err(err) => log::warn!("ignoring {var}={raw:?}: {err}"),
                }
            }
        }

        if config.default_target.width() > config.max_dimension
            || config.default_target.height() > config.max_dimension
        {
            log::warn!(
                "default size {} exceeds max dimension {}, clamping",
                config.default_target,
                config.max_dimension
            );
            config.default_target = Dimensions::new(
                config.default_target.width().min(config.max_dimension),
                config.default_target.height().min(config.max_dimension),
            )
            .unwrap_or(config.default_target);
        }

        config
    }
}

/// Parses `"256x128"` (or a single number for a square).
fn parse_size(raw: &str) -> Option<Dimensions> {
    match raw.trim().split_once(['x', 'X']) {
        Some((width, height)) => {
            Dimensions::new(parse_dimension(width).ok()?, parse_dimension(height).ok()?)
        }
        None => Dimensions::square(parse_dimension(raw).ok()?),
    }
}
