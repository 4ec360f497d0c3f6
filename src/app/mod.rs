pub mod icon_generator;
pub mod status;
