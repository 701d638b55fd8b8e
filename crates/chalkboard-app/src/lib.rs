//! Chalkboard Application
//!
//! Headless participant built on the core drawing engine and the raster
//! renderer.

mod app;
pub mod commands;

pub use app::{App, AppConfig, AppError, apply_command};
