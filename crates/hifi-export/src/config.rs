//! Exporter configuration files
//!
//! Settings can be kept in a YAML or JSON file and passed to the CLI with
//! `--config`. Command-line flags override file values.
//!
//! ```yaml
//! data_path: /home/me/Game/Assets
//! mode: separate
//! folder: Assets/Export
//! manifest: Assets/gameObjects.json
//! export:
//!   copy_materials: true
//! pretty: true
//! ```

use std::path::{Path, PathBuf};

use hifi_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fbx::ExportOptions;
use crate::manifest::{ExportPolicy, ManifestOptions};

/// File-backed exporter settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// The project's `Assets` directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    pub mode: ExportPolicy,
    /// Model folder, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Manifest file, relative to the project root unless absolute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    pub export: ExportOptions,
    pub pretty: bool,
}

impl ExporterConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text),
            "json" => Self::from_json_str(&text),
            _ => Err(Error::UnsupportedFormat { extension: ext }),
        }
        .with_context(|| format!("while loading config {}", path.display()))?;

        debug!(path = %path.display(), "Loaded exporter config");
        Ok(config)
    }

    pub fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions {
            pretty: self.pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExporterConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ExporterConfig::default());
        assert_eq!(config.mode, ExportPolicy::EmbedChildren);
        assert!(!config.export.copy_materials);
    }

    #[test]
    fn test_yaml() {
        let config = ExporterConfig::from_yaml_str(
            "mode: separate\nfolder: Assets/Export\nexport:\n  copy_materials: true\npretty: true\n",
        )
        .unwrap();

        assert_eq!(config.mode, ExportPolicy::FlattenChildren);
        assert_eq!(config.folder.as_deref(), Some("Assets/Export"));
        assert!(config.export.copy_materials);
        assert!(!config.export.copy_textures);
        assert!(config.manifest_options().pretty);
    }

    #[test]
    fn test_bad_mode() {
        let err = ExporterConfig::from_json_str(r#"{"mode":"both"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"data_path":"/p/Assets","mode":"single"}}"#).unwrap();

        let config = ExporterConfig::load(file.path()).unwrap();
        assert_eq!(config.data_path, Some(PathBuf::from("/p/Assets")));
    }

    #[test]
    fn test_load_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = ExporterConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::WithContext { .. }));
    }
}
