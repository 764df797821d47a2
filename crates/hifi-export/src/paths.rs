//! Project paths
//!
//! Model folders are kept relative to the project root and always start
//! with the `Assets` segment. Model URLs and destination files are derived
//! from that folder.

use std::path::{Path, PathBuf};

use hifi_core::{Error, Result};

/// Name of the project's asset directory
pub const ASSETS_DIR: &str = "Assets";

/// Default manifest file name offered when choosing where to save it
pub const DEFAULT_MANIFEST_NAME: &str = "gameObjects.json";

/// Asks the user where exported files go
pub trait PathChooser {
    /// Pick a folder, starting at `start`; `None` cancels
    fn choose_folder(&self, title: &str, start: &Path) -> Option<PathBuf>;

    /// Pick a file inside the project; `None` cancels
    fn choose_file(&self, title: &str, default_name: &str, extension: &str) -> Option<PathBuf>;
}

/// Non-interactive chooser returning preset answers
#[derive(Debug, Clone, Default)]
pub struct FixedPaths {
    pub folder: Option<PathBuf>,
    pub file: Option<PathBuf>,
}

impl FixedPaths {
    pub fn new(folder: impl Into<PathBuf>, file: impl Into<PathBuf>) -> Self {
        Self {
            folder: Some(folder.into()),
            file: Some(file.into()),
        }
    }
}

impl PathChooser for FixedPaths {
    fn choose_folder(&self, _title: &str, _start: &Path) -> Option<PathBuf> {
        self.folder.clone()
    }

    fn choose_file(&self, _title: &str, _default_name: &str, _extension: &str) -> Option<PathBuf> {
        self.file.clone()
    }
}

/// Forward-slash form of a path
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Whether a path has an `Assets` segment
pub fn is_in_assets(path: &str) -> bool {
    path.replace('\\', "/").split('/').any(|c| c == ASSETS_DIR)
}

/// Path from the first `Assets` segment on
///
/// `/home/me/Game/Assets/Models/` → `Assets/Models`
pub fn asset_relative(path: &str) -> Option<String> {
    let path = path.replace('\\', "/");
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    let start = components.iter().position(|c| *c == ASSETS_DIR)?;
    Some(components[start..].join("/"))
}

/// Location of a project on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    data_path: PathBuf,
    project_root: PathBuf,
}

impl ProjectLayout {
    /// `data_path` is the project's `Assets` directory
    pub fn new(data_path: impl Into<PathBuf>) -> Result<Self> {
        let data_path = data_path.into();
        if data_path.file_name().and_then(|n| n.to_str()) != Some(ASSETS_DIR) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "data path {} must point at the project's {} directory",
                    data_path.display(),
                    ASSETS_DIR
                ),
            });
        }
        let project_root = data_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self {
            data_path,
            project_root,
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Where the folder chooser starts
    ///
    /// Without a previous folder this is the asset directory. A previous
    /// folder given from the `Assets` segment on is made absolute and its
    /// last segment dropped.
    pub fn start_dir(&self, previous: Option<&str>) -> PathBuf {
        let Some(previous) = previous else {
            return self.data_path.clone();
        };

        let trimmed = previous.trim_start_matches('/');
        if !trimmed.starts_with(ASSETS_DIR) {
            return PathBuf::from(previous);
        }

        let absolute = self.project_root.join(trimmed);
        match absolute.parent() {
            Some(parent) if parent.starts_with(&self.data_path) => parent.to_path_buf(),
            _ => self.data_path.clone(),
        }
    }

    /// Resolve a chosen file against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn locator(&self, folder: impl Into<String>) -> ModelLocator {
        ModelLocator::new(to_slash(&self.project_root), folder)
    }
}

/// Maps node names to model files and URLs in one export folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocator {
    project_root: String,
    folder: String,
}

impl ModelLocator {
    /// `folder` is relative to the project root, e.g. `Assets/Export`
    pub fn new(project_root: impl Into<String>, folder: impl Into<String>) -> Self {
        let project_root = project_root.into().replace('\\', "/");
        let folder = folder.into().replace('\\', "/");
        Self {
            project_root: project_root.trim_end_matches('/').to_string(),
            folder: folder.trim_matches('/').to_string(),
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// `file:///<project root>/<folder>/<name>.fbx`
    pub fn model_url(&self, name: &str) -> String {
        let root = self.project_root.trim_start_matches('/');
        if root.is_empty() {
            format!("file:///{}/{}.fbx", self.folder, name)
        } else {
            format!("file:///{}/{}/{}.fbx", root, self.folder, name)
        }
    }

    /// Destination file of a node's model
    ///
    /// Names that would leave the export folder are rejected.
    pub fn model_path(&self, name: &str) -> Result<PathBuf> {
        if !is_file_stem(name) {
            return Err(Error::InvalidData {
                message: format!("node name '{}' cannot be used as a model file name", name),
            });
        }
        Ok(PathBuf::from(&self.project_root)
            .join(&self.folder)
            .join(format!("{}.fbx", name)))
    }
}

/// A single path component: no separators, not `.` or `..`
fn is_file_stem(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_relative() {
        assert_eq!(asset_relative("/home/me/Game/Assets/Models/").as_deref(), Some("Assets/Models"));
        assert_eq!(asset_relative("C:\\Game\\Assets").as_deref(), Some("Assets"));
        assert_eq!(asset_relative("Assets/Export").as_deref(), Some("Assets/Export"));
        assert_eq!(asset_relative("/home/me/Desktop"), None);
        assert_eq!(asset_relative("/home/me/MyAssets/x"), None);
    }

    #[test]
    fn test_is_in_assets() {
        assert!(is_in_assets("/p/Assets/Export"));
        assert!(!is_in_assets("/p/Export"));
    }

    #[test]
    fn test_layout_requires_assets_dir() {
        assert!(ProjectLayout::new("/home/me/Game/Assets").is_ok());
        let err = ProjectLayout::new("/home/me/Game").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_start_dir() {
        let layout = ProjectLayout::new("/home/me/Game/Assets").unwrap();

        assert_eq!(layout.start_dir(None), PathBuf::from("/home/me/Game/Assets"));
        assert_eq!(
            layout.start_dir(Some("/Assets/Export/Props")),
            PathBuf::from("/home/me/Game/Assets/Export")
        );
        assert_eq!(layout.start_dir(Some("Assets/Export")), PathBuf::from("/home/me/Game/Assets"));
        assert_eq!(layout.start_dir(Some("/tmp/out")), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_model_url() {
        let locator = ModelLocator::new("/home/me/Game/", "Assets/Export/");

        assert_eq!(locator.model_url("Lamp"), "file:///home/me/Game/Assets/Export/Lamp.fbx");
        assert_eq!(
            locator.model_path("Lamp").unwrap(),
            PathBuf::from("/home/me/Game/Assets/Export/Lamp.fbx")
        );
    }

    #[test]
    fn test_model_path_rejects_escaping_names() {
        let locator = ModelLocator::new("/home/me/Game", "Assets/Export");

        for name in ["../../escaped", "a/b", "a\\b", "..", ".", ""] {
            let err = locator.model_path(name).unwrap_err();
            assert!(matches!(err, Error::InvalidData { .. }), "{name:?} accepted");
        }
        assert!(locator.model_path("Lamp..v2").is_ok());
    }

    #[test]
    fn test_model_url_windows_root() {
        let locator = ModelLocator::new("C:\\Game", "Assets");
        assert_eq!(locator.model_url("Box"), "file:///C:/Game/Assets/Box.fbx");
    }

    #[test]
    fn test_resolve() {
        let layout = ProjectLayout::new("/p/Assets").unwrap();
        assert_eq!(layout.resolve(Path::new("Assets/a.json")), PathBuf::from("/p/Assets/a.json"));
        assert_eq!(layout.resolve(Path::new("/tmp/a.json")), PathBuf::from("/tmp/a.json"));
    }
}
