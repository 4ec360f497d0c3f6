#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
use std::error::Error;

use eframe::egui::{IconData, Vec2, ViewportBuilder};
use icon_generator::app::icon_generator::IconGenerator;
use icon_generator::image::Image;
use icon_generator::{flat_fill, AppConfig, Dimensions};

const ICON_SIZE: Dimensions = match Dimensions::square(64) {
    Some(dims) => dims,
    None => unreachable!(),
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    log::info!(
        "starting with default target {}, max dimension {}",
        config.default_target,
        config.max_dimension
    );

    let icon_image = flat_fill(ICON_SIZE, config.fill);
    let icon = IconData {
        rgba: icon_image.image().as_bytes().to_vec(),
        width: icon_image.image().width(),
        height: icon_image.image().height(),
    };
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Icon Generator")
            .with_min_inner_size(Vec2::new(1000.0, 800.0))
            .with_icon(icon),

        vsync: true,

        ..Default::default()
    };
    eframe::run_native(
        "Icon Generator",
        native_options,
        Box::new(|cc| Ok(Box::new(IconGenerator::new(cc, config)))),
    )?;

    Ok(())
}
