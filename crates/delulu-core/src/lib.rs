//! Error type, configuration, and image sources shared by every delulu crate.

pub mod config;
pub mod error;
pub mod image;

pub use config::{AnalyzerConfig, OutputMode};
pub use error::{Error, Result};
pub use image::ImageSource;
