//! Session configuration, read once when a bus is built

use std::fs;
use std::path::Path;

use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cartridge::{CartridgeError, MappingScheme};
use crate::display::{DisplayGeometry, VideoStandard};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported display geometry: {0} lines")]
    InvalidGeometry(u16),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Declared banking scheme id; guessed from the ROM size when absent
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub video_standard: VideoStandard,
    /// Scan lines per frame before the first VSYNC is measured
    #[serde(default)]
    pub default_geometry: Option<u16>,
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Configuration declaring `scheme` with everything else defaulted
    pub fn with_scheme(scheme: &str) -> Self {
        Self {
            scheme: Some(scheme.to_string()),
            ..Self::default()
        }
    }

    /// Scheme to use for `rom`
    pub fn scheme_for(&self, rom: &[u8]) -> Result<MappingScheme, CartridgeError> {
        match &self.scheme {
            Some(id) => id.parse(),
            None => {
                let scheme = MappingScheme::detect(rom)?;
                log(LogCategory::Cartridge, LogLevel::Info, || {
                    format!(
                        "Cartridge: no scheme declared, guessed {} from {} byte image",
                        scheme.id(),
                        rom.len()
                    )
                });
                Ok(scheme)
            }
        }
    }

    pub fn initial_geometry(&self) -> Result<DisplayGeometry, ConfigError> {
        match self.default_geometry {
            Some(lines) => {
                DisplayGeometry::from_lines(lines).ok_or(ConfigError::InvalidGeometry(lines))
            }
            None => Ok(self.video_standard.default_geometry()),
        }
    }
}
