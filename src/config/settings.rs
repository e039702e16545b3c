// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::consts::{
    DEFAULT_ELLIPSOID, DEFAULT_RASTER_FORMAT, DEFAULT_VECTOR_FORMAT,
};
use crate::errors::ModelError;

/// How features with invalid geometries are handled while reading sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidGeometryCheck {
    /// Invalid geometries are passed through untouched
    NoCheck,
    /// Invalid features are skipped and reported as errors
    SkipInvalid,
    /// The first invalid feature aborts the algorithm
    #[default]
    AbortOnInvalid,
}

/// User level processing preferences, threaded through every context.
///
/// # Example
///
/// ```toml
/// prefer_filename_as_layer_name = false
/// invalid_geometry_check = "skip_invalid"
/// preferred_vector_format = "shp"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Name output layers after their file rather than the output parameter
    pub prefer_filename_as_layer_name: bool,
    pub invalid_geometry_check: InvalidGeometryCheck,
    pub preferred_vector_format: String,
    pub preferred_raster_format: String,
    pub ellipsoid: String,
    /// Forward feedback messages to the tracing log
    pub log_feedback: bool,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            prefer_filename_as_layer_name: true,
            invalid_geometry_check: InvalidGeometryCheck::default(),
            preferred_vector_format: DEFAULT_VECTOR_FORMAT.to_string(),
            preferred_raster_format: DEFAULT_RASTER_FORMAT.to_string(),
            ellipsoid: DEFAULT_ELLIPSOID.to_string(),
            log_feedback: true,
        }
    }
}

impl ProcessingSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, ModelError> {
        Ok(toml::from_str(text)?)
    }
}

/// Loads settings from a TOML file. Missing keys take their defaults.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<ProcessingSettings, ModelError> {
    let text = fs::read_to_string(path)?;
    ProcessingSettings::from_toml_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = ProcessingSettings::default();
        assert!(settings.prefer_filename_as_layer_name);
        assert_eq!(settings.invalid_geometry_check, InvalidGeometryCheck::AbortOnInvalid);
        assert_eq!(settings.preferred_vector_format, "gpkg");
        assert_eq!(settings.preferred_raster_format, "tif");
        assert_eq!(settings.ellipsoid, "EPSG:7030");
        assert!(settings.log_feedback);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = ProcessingSettings::from_toml_str(
            r#"
            prefer_filename_as_layer_name = false
            invalid_geometry_check = "skip_invalid"
            "#,
        )
        .unwrap();
        assert!(!settings.prefer_filename_as_layer_name);
        assert_eq!(settings.invalid_geometry_check, InvalidGeometryCheck::SkipInvalid);
        assert_eq!(settings.preferred_vector_format, "gpkg");
    }

    #[test]
    fn test_load_settings_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "preferred_vector_format = \"shp\"\nlog_feedback = false").unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.preferred_vector_format, "shp");
        assert!(!settings.log_feedback);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            ProcessingSettings::from_toml_str("invalid_geometry_check = \"sometimes\""),
            Err(ModelError::Toml(_))
        ));
    }
}
