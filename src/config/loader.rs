//! Settings loader.
//!
//! Loads [`Settings`] from an explicit path or from the default location,
//! falling back to built-in defaults when no file exists.

use super::settings::Settings;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Name of the settings file inside the config directory.
const SETTINGS_FILE: &str = "config.json";

/// Settings loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settings = ConfigLoader::load_from_file("config.json")?;
    /// println!("interface: {}", settings.interface);
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist. The default location is optional: when
    /// `$CONFIG_DIR/netopt/config.json` is missing, defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be read or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        let default_path = Self::default_path();
        if default_path.exists() {
            tracing::debug!("Loading settings from {}", default_path.display());
            Self::load_from_file(&default_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// Write the built-in defaults to `path` as a starting point for editing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists or cannot be written.
    pub fn write_defaults<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            return Err(Error::config(format!(
                "{} already exists, refusing to overwrite",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&Settings::default())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("netopt")
    }

    /// Default settings file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::config_dir().join(SETTINGS_FILE)
    }

    /// Log file used while the interactive window owns the terminal.
    #[must_use]
    pub fn log_path() -> PathBuf {
        Self::config_dir().join("netopt.log")
    }
}
