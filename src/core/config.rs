//! Configuration and scene file errors

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory relative asset paths resolve against
    pub asset_root: PathBuf,
    /// Where the asset manifest is written
    pub manifest_path: PathBuf,
    /// Where the scene document is written
    pub scene_path: PathBuf,
    /// Substitute placeholders for assets that fail to resolve
    pub placeholders: bool,
    /// Indent saved documents
    pub pretty_documents: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            manifest_path: PathBuf::from("manifest.json"),
            scene_path: PathBuf::from("scene.json"),
            placeholders: true,
            pretty_documents: true,
        }
    }
}

impl Config {
    /// Set the asset root
    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Set the manifest path
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Set the scene document path
    #[must_use]
    pub fn with_scene_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scene_path = path.into();
        self
    }

    /// Enable or disable placeholder substitution
    #[must_use]
    pub fn with_placeholders(mut self, placeholders: bool) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Enable or disable pretty-printed documents
    #[must_use]
    pub fn with_pretty_documents(mut self, pretty: bool) -> Self {
        self.pretty_documents = pretty;
        self
    }

    /// Read a RON config file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read(path)?;
        ron::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a JSON config file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read(path)?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a config file, choosing the format by extension (`.ron` or JSON)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match DocumentFormat::from_path(path) {
            Some(DocumentFormat::Ron) => Self::from_ron_file(path),
            _ => Self::from_json_file(path),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Text formats scene documents can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Ron,
}

impl DocumentFormat {
    /// Format implied by the file extension; no extension means JSON
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Some(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Some(Self::Ron),
            Some(_) => None,
        }
    }
}

/// Errors saving or loading scene documents
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize scene: {0}")]
    Serialize(String),

    #[error("failed to parse scene {path:?}: {message}")]
    Deserialize { path: PathBuf, message: String },

    #[error("unsupported scene format {0:?}, expected .json or .ron")]
    UnsupportedFormat(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_asset_root("data")
            .with_placeholders(false)
            .with_pretty_documents(false);
        assert_eq!(config.asset_root, PathBuf::from("data"));
        assert!(!config.placeholders);
        assert!(!config.pretty_documents);
        assert_eq!(config.scene_path, PathBuf::from("scene.json"));
    }

    #[test]
    fn test_missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        fs::write(&path, r#"(asset_root: "levels")"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.asset_root, PathBuf::from("levels"));
        assert!(config.placeholders);

        let json = dir.path().join("config.json");
        fs::write(&json, r#"{ "placeholders": false }"#).unwrap();
        let config = Config::from_file(&json).unwrap();
        assert!(!config.placeholders);
        assert_eq!(config.asset_root, PathBuf::from("assets"));
    }

    #[test]
    fn test_unreadable_config_is_io_error() {
        let err = Config::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_document_format_by_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a.RON")),
            Some(DocumentFormat::Ron)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("a.json")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), None);
    }
}
