pub mod app;
pub mod color;
pub mod compositor;
pub mod config;
pub mod image;
pub mod layout;
pub mod loader;
pub mod resize;
pub mod session;

pub use color::Color;
pub use compositor::{flat_fill, ImageCompositor, RenderError, RenderOrigin, RenderResult};
pub use config::AppConfig;
pub use image::{LoadError, SaveError, SourceFormat};
pub use layout::{compute_placement, DimensionError, Dimensions, FitMode, Placement, Rect};
pub use session::{LoadTicket, Session, SourceImage, TargetSpec};
