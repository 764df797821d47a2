//! Export sessions
//!
//! An [`ExportSession`] runs one user-triggered export end to end: resolve
//! the selection, detach the hierarchy when exporting nodes separately,
//! write one model per batch node, then write the manifest. User
//! cancellation at any prompt is an [`ExportOutcome::Cancelled`], not an
//! error.

use std::path::PathBuf;

use hifi_core::{Error, Prompt};
use hifi_scene::{DetachGuard, NodeId, ParentLinks, Resolved, SceneForest, Selection, SelectionResolver};
use thiserror::Error;
use tracing::{info, warn};

use crate::fbx::{ExportOptions, ModelExportError, ModelExporter};
use crate::manifest::{ExportBatch, ExportPolicy, Manifest, ManifestBuilder, ManifestError, ManifestOptions};
use crate::paths::{self, ModelLocator, PathChooser, ProjectLayout, DEFAULT_MANIFEST_NAME};

pub const FOLDER_TITLE: &str = "Select Folder to Export FBX";
pub const MANIFEST_TITLE: &str = "Select JSON Filename";
pub const EXPORT_FAILED_MESSAGE: &str = "The extension probably wasn't an FBX file, could not export.";
pub const OUTSIDE_ASSETS_MESSAGE: &str = "Must save file in the project's assets folder";

/// Export session errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Item selected is not a scene node: {item}")]
    InvalidSelection { item: String },

    #[error("Scene error: {0}")]
    Scene(#[from] Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

/// Summary of a finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub policy: ExportPolicy,
    /// Model folder relative to the project root
    pub folder: String,
    pub manifest_path: PathBuf,
    pub exported: Vec<PathBuf>,
    /// Names of nodes whose model could not be written
    pub failed: Vec<String>,
    pub manifest: Manifest,
}

impl ExportReport {
    pub fn exported_count(&self) -> usize {
        self.exported.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Cancelled,
    Completed(ExportReport),
}

impl ExportOutcome {
    pub fn report(&self) -> Option<&ExportReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Cancelled => None,
        }
    }
}

/// One exporter front end bound to a project
pub struct ExportSession<'a> {
    layout: ProjectLayout,
    prompt: &'a dyn Prompt,
    paths: &'a dyn PathChooser,
    exporter: &'a mut dyn ModelExporter,
    options: ExportOptions,
    manifest_options: ManifestOptions,
    last_folder: Option<String>,
}

impl<'a> ExportSession<'a> {
    pub fn new(
        layout: ProjectLayout,
        prompt: &'a dyn Prompt,
        paths: &'a dyn PathChooser,
        exporter: &'a mut dyn ModelExporter,
    ) -> Self {
        Self {
            layout,
            prompt,
            paths,
            exporter,
            options: ExportOptions::default(),
            manifest_options: ManifestOptions::default(),
            last_folder: None,
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_manifest_options(mut self, options: ManifestOptions) -> Self {
        self.manifest_options = options;
        self
    }

    /// Folder of the last export, offered as the next starting point
    pub fn last_folder(&self) -> Option<&str> {
        self.last_folder.as_deref()
    }

    /// Export a selection
    ///
    /// With [`ExportPolicy::FlattenChildren`] the scene is detached for the
    /// duration of the export and restored before returning, including on
    /// errors.
    pub fn run(
        &mut self,
        scene: &mut SceneForest,
        selection: &Selection,
        policy: ExportPolicy,
    ) -> Result<ExportOutcome, ExportError> {
        let nodes = match SelectionResolver::new(scene, self.prompt).resolve(selection) {
            Ok(Resolved::Nodes(nodes)) => nodes,
            Ok(Resolved::Cancelled) => return Ok(ExportOutcome::Cancelled),
            Err(Error::InvalidSelection { item }) => return Err(ExportError::InvalidSelection { item }),
            Err(e) => return Err(e.into()),
        };
        info!(policy = %policy, nodes = nodes.len(), "Starting export");

        match policy {
            ExportPolicy::EmbedChildren => {
                let batch = ExportBatch::embedded(scene, &nodes)?;
                self.export_batch(scene, &batch, nodes.len())
            }
            ExportPolicy::FlattenChildren => {
                let guard = DetachGuard::new(scene, &nodes)?;
                let batch = ExportBatch::flattened(guard.links());
                let outcome = self.export_batch(guard.forest(), &batch, batch.len());
                guard.finish()?;
                outcome
            }
        }
    }

    fn export_batch(
        &mut self,
        forest: &SceneForest,
        batch: &ExportBatch,
        count: usize,
    ) -> Result<ExportOutcome, ExportError> {
        let Some(folder) = self.choose_folder() else {
            info!("Export folder not chosen");
            return Ok(ExportOutcome::Cancelled);
        };
        let locator = self.layout.locator(folder.clone());

        let mut exported = Vec::with_capacity(batch.len());
        let mut failed = Vec::new();
        for id in batch.nodes() {
            let name = &forest.node(id)?.name;
            let written = locator
                .model_path(name)
                .map_err(ModelExportError::from)
                .and_then(|path| {
                    self.exporter
                        .export(forest, id, &path, &self.options)
                        .map(|()| path)
                });
            match written {
                Ok(path) => exported.push(path),
                Err(e) => {
                    warn!(node = %name, error = %e, "Model export failed");
                    self.prompt.notify("Warning", EXPORT_FAILED_MESSAGE);
                    failed.push(name.clone());
                }
            }
        }
        self.last_folder = Some(folder.clone());

        let Some(chosen) = self
            .paths
            .choose_file(MANIFEST_TITLE, DEFAULT_MANIFEST_NAME, "json")
        else {
            info!("Manifest file not chosen");
            return Ok(ExportOutcome::Cancelled);
        };
        let manifest_path = self.layout.resolve(&chosen);

        let manifest = ManifestBuilder::new(forest, &locator).build(batch)?;
        manifest.write(&manifest_path, &self.manifest_options)?;

        self.prompt
            .notify("Success", &format!("Success {} game objects exported", count));
        info!(
            exported = exported.len(),
            failed = failed.len(),
            manifest = %manifest_path.display(),
            "Export complete"
        );

        Ok(ExportOutcome::Completed(ExportReport {
            policy: batch.policy(),
            folder,
            manifest_path,
            exported,
            failed,
            manifest,
        }))
    }

    /// Ask for the model folder and reduce it to its `Assets/...` form
    fn choose_folder(&self) -> Option<String> {
        let start = self.layout.start_dir(self.last_folder.as_deref());
        let chosen = paths::to_slash(&self.paths.choose_folder(FOLDER_TITLE, &start)?);

        if self.last_folder.is_none() && !paths::is_in_assets(&chosen) {
            warn!(folder = %chosen, "Export folder is outside the asset directory");
            self.prompt.notify("Warning", OUTSIDE_ASSETS_MESSAGE);
            return None;
        }
        paths::asset_relative(&chosen)
    }
}

/// Manifest a batch would produce, without touching files or the scene
pub fn preview_manifest(
    forest: &SceneForest,
    nodes: &[NodeId],
    policy: ExportPolicy,
    locator: &ModelLocator,
) -> Result<Manifest, ExportError> {
    let manifest = match policy {
        ExportPolicy::EmbedChildren => {
            let batch = ExportBatch::embedded(forest, nodes)?;
            ManifestBuilder::new(forest, locator).build(&batch)?
        }
        ExportPolicy::FlattenChildren => {
            let links = ParentLinks::capture(forest, nodes)?;
            let flat = links.detach(forest)?;
            ManifestBuilder::new(&flat, locator).build(&ExportBatch::flattened(&links))?
        }
    };
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fbx::FbxAsciiWriter;
    use crate::paths::FixedPaths;
    use hifi_core::ScriptedPrompt;
    use hifi_scene::SceneNode;

    fn sample() -> (SceneForest, NodeId, NodeId) {
        let mut forest = SceneForest::new();
        let house = forest.add_node(SceneNode::new("House"));
        let door = forest.add_child(house, SceneNode::new("Door")).unwrap();
        (forest, house, door)
    }

    #[test]
    fn test_folder_outside_assets_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path().join("Assets")).unwrap();
        let prompt = ScriptedPrompt::new(true);
        let paths = FixedPaths::new(dir.path().join("Export"), "Assets/gameObjects.json");
        let mut writer = FbxAsciiWriter::new();
        let (mut forest, house, _) = sample();

        let outcome = ExportSession::new(layout, &prompt, &paths, &mut writer)
            .run(&mut forest, &Selection::from_nodes([house]), ExportPolicy::EmbedChildren)
            .unwrap();

        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert_eq!(prompt.count_titled("Warning"), 1);
        assert!(!dir.path().join("Export").exists());
    }

    #[test]
    fn test_manifest_cancel_writes_no_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path().join("Assets")).unwrap();
        let prompt = ScriptedPrompt::new(true);
        let paths = FixedPaths {
            folder: Some(PathBuf::from("Assets/Export")),
            file: None,
        };
        let mut writer = FbxAsciiWriter::new();
        let (mut forest, house, _) = sample();
        let original = forest.clone();

        let mut session = ExportSession::new(layout, &prompt, &paths, &mut writer);
        let outcome = session
            .run(&mut forest, &Selection::from_nodes([house]), ExportPolicy::FlattenChildren)
            .unwrap();

        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert_eq!(session.last_folder(), Some("Assets/Export"));
        assert_eq!(forest, original);
        assert_eq!(prompt.count_titled("Success"), 0);
    }

    #[test]
    fn test_invalid_selection() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path().join("Assets")).unwrap();
        let prompt = ScriptedPrompt::new(true);
        let paths = FixedPaths::default();
        let mut writer = FbxAsciiWriter::new();
        let (mut forest, _, _) = sample();
        let selection = Selection::from_tokens(&forest, &["Garage"]);

        let err = ExportSession::new(layout, &prompt, &paths, &mut writer)
            .run(&mut forest, &selection, ExportPolicy::EmbedChildren)
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidSelection { item } if item == "Garage"));
    }

    #[test]
    fn test_preview_manifest() {
        let (forest, house, door) = sample();
        let locator = ModelLocator::new("/p", "Assets");

        let single = preview_manifest(&forest, &[house, door], ExportPolicy::EmbedChildren, &locator).unwrap();
        assert_eq!(single.len(), 1);

        let separate = preview_manifest(&forest, &[house], ExportPolicy::FlattenChildren, &locator).unwrap();
        assert_eq!(separate.len(), 2);
        assert_eq!(separate.entities[1].model_url(), "file:///p/Assets/Door.fbx");
    }
}
