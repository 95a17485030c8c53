//! Configuration module.
//!
//! This module provides the settings model and the loader that reads it
//! from disk.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{Settings, SpeedTestServer, SpeedTestSettings};
