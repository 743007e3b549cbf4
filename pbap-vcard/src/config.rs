// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Export Configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum octets per content line before folding.
pub const DEFAULT_FOLD_WIDTH: usize = 75;

/// Listing placeholder for contacts without a name.
pub const DEFAULT_UNKNOWN_NAME_LABEL: &str = "Unknown";

/// Call-log placeholder for withheld numbers.
pub const DEFAULT_UNKNOWN_NUMBER_LABEL: &str = "Unknown number";

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings shared by every export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Global photo policy; a peer mask can only narrow it.
    pub include_photos: bool,
    /// Local device name used for the owner record.
    pub owner_name: String,
    /// Local device number used for the owner record.
    pub owner_number: String,
    /// Listing placeholder for contacts without a name.
    pub unknown_name_label: String,
    /// Call-log placeholder when the caller number may not be disclosed.
    pub unknown_number_label: String,
    /// Maximum octets per content line.
    pub fold_width: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            include_photos: true,
            owner_name: String::new(),
            owner_number: String::new(),
            unknown_name_label: DEFAULT_UNKNOWN_NAME_LABEL.to_string(),
            unknown_number_label: DEFAULT_UNKNOWN_NUMBER_LABEL.to_string(),
            fold_width: DEFAULT_FOLD_WIDTH,
        }
    }
}

impl ExportConfig {
    /// Creates a config for the given owner identity.
    pub fn with_owner(name: &str, number: &str) -> Self {
        ExportConfig {
            owner_name: name.to_string(),
            owner_number: number.to_string(),
            ..Default::default()
        }
    }

    /// Disables photo export regardless of peer filters.
    pub fn without_photos(mut self) -> Self {
        self.include_photos = false;
        self
    }

    /// Sets the call-log placeholder for withheld numbers; an empty label
    /// is ignored.
    pub fn with_unknown_number_label(mut self, label: &str) -> Self {
        if !label.is_empty() {
            self.unknown_number_label = label.to_string();
        }
        self
    }

    /// Sets the listing placeholder for unnamed contacts; an empty label is
    /// ignored.
    pub fn with_unknown_name_label(mut self, label: &str) -> Self {
        if !label.is_empty() {
            self.unknown_name_label = label.to_string();
        }
        self
    }

    /// Sets the fold width; values below 8 are raised to 8.
    pub fn with_fold_width(mut self, width: usize) -> Self {
        self.fold_width = width.max(8);
        self
    }

    /// Parses a JSON config; missing keys take their defaults.
    ///
    /// Placeholder labels must not be empty.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.unknown_name_label.is_empty() {
            return Err(ConfigError::Invalid("unknown_name_label is empty".to_string()));
        }
        if self.unknown_number_label.is_empty() {
            return Err(ConfigError::Invalid("unknown_number_label is empty".to_string()));
        }
        Ok(())
    }
}
