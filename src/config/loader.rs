//! Settings loading functionality.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::PayrollSettings;

/// Loads and provides access to the payroll settings.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::SettingsLoader;
///
/// let loader = SettingsLoader::load("./config/payroll.yaml").unwrap();
/// println!("Currency: {}", loader.settings().currency);
/// ```
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    settings: PayrollSettings,
}

impl SettingsLoader {
    /// Loads settings from a YAML file.
    ///
    /// Returns [`EngineError::SettingsNotFound`] when the file is missing
    /// and [`EngineError::SettingsParseError`] when it is not valid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::SettingsNotFound {
            path: path_str.clone(),
        })?;

        let settings =
            serde_yaml::from_str(&content).map_err(|e| EngineError::SettingsParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        Ok(Self { settings })
    }

    /// Returns the loaded settings.
    pub fn settings(&self) -> &PayrollSettings {
        &self.settings
    }

    /// Consumes the loader, returning the settings.
    pub fn into_settings(self) -> PayrollSettings {
        self.settings
    }
}
