//! Application configuration
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! loader_threads = 4
//! show_floor = true
//! floor_extent = 250.0
//! floor_color = { r = 90, g = 90, b = 90 }
//!
//! [headers]
//! part = "Component"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::gfx::Rgb;

/// Column header labels shown by tree views
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Headers {
    pub part: String,
    pub visible: String,
    pub colour: String,
}

impl Default for Headers {
    fn default() -> Self {
        Self {
            part: "Part".to_string(),
            visible: "Visible?".to_string(),
            colour: "Colour".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub headers: Headers,
    /// Worker threads for geometry loading
    pub loader_threads: usize,
    /// Add a floor plane under the parts
    pub show_floor: bool,
    pub floor_extent: f32,
    pub floor_color: Rgb,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            headers: Headers::default(),
            loader_threads: num_cpus::get(),
            show_floor: false,
            floor_extent: 500.0,
            floor_color: Rgb::FLOOR_GREY,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(source)?;
        Ok(config.normalized())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading config from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Worker count actually used: never below one
    pub fn worker_count(&self) -> usize {
        self.loader_threads.max(1)
    }

    fn normalized(mut self) -> Self {
        self.loader_threads = self.worker_count();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.headers.colour, "Colour");
        assert!(config.loader_threads >= 1);
    }

    #[test]
    fn test_partial_document() {
        let config = AppConfig::from_toml_str(
            r#"
            loader_threads = 0
            show_floor = true
            floor_color = { r = 90, g = 90, b = 90 }

            [headers]
            part = "Component"
            "#,
        )
        .unwrap();

        assert_eq!(config.loader_threads, 1);
        assert!(config.show_floor);
        assert_eq!(config.floor_extent, 500.0);
        assert_eq!(config.floor_color, Rgb::new(90, 90, 90));
        assert_eq!(config.headers.part, "Component");
        assert_eq!(config.headers.visible, "Visible?");
    }

    #[test]
    fn test_invalid_document() {
        let err = AppConfig::from_toml_str("show_floor = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "floor_extent = 120.5").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.floor_extent, 120.5);

        let missing = AppConfig::from_file("/no/such/partview.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
