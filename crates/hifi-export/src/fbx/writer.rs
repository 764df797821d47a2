//! ASCII FBX writer

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hifi_core::{Transform, Vec3};
use hifi_scene::{NodeId, SceneForest, SceneNode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Connection, FbxDocument, FbxModel, ModelExporter, ModelKind};

/// Model export options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Copy the materials used by the model next to it
    pub copy_materials: bool,
    /// Copy textures as well (only meaningful with materials)
    pub copy_textures: bool,
}

/// Model export errors
#[derive(Debug, thiserror::Error)]
pub enum ModelExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not an FBX path: {}", path.display())]
    WrongExtension { path: PathBuf },

    #[error("Scene error: {0}")]
    Scene(#[from] hifi_core::Error),
}

const FIRST_OBJECT_ID: i64 = 1_000_000;

/// Writes each exported subtree as an ASCII FBX 7.4 file
#[derive(Debug, Clone)]
pub struct FbxAsciiWriter {
    creator: String,
}

impl Default for FbxAsciiWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FbxAsciiWriter {
    pub fn new() -> Self {
        Self {
            creator: format!("hifi-export {}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Document for `root` and its descendants
    ///
    /// The root keeps its world pose; descendants keep their local
    /// transforms. Positions and rotations are mirrored on X into FBX's
    /// right-handed axes.
    pub fn build_document(
        &self,
        forest: &SceneForest,
        root: NodeId,
    ) -> Result<FbxDocument, ModelExportError> {
        let subtree = forest.subtree(root)?;
        let object_ids: HashMap<NodeId, i64> = subtree
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, FIRST_OBJECT_ID + i as i64))
            .collect();

        let mut models = Vec::with_capacity(subtree.len());
        let mut connections = Vec::with_capacity(subtree.len());

        for &id in &subtree {
            let node = forest.node(id)?;
            let transform = if id == root {
                forest.world_transform(id)?
            } else {
                node.transform
            };
            let object_id = object_ids[&id];
            models.push(to_model(object_id, node, &transform));

            let parent = if id == root {
                0
            } else {
                node.parent().and_then(|p| object_ids.get(&p).copied()).unwrap_or(0)
            };
            connections.push(Connection {
                child: object_id,
                parent,
            });
        }

        Ok(FbxDocument {
            creator: self.creator.clone(),
            models,
            connections,
        })
    }
}

fn to_model(id: i64, node: &SceneNode, transform: &Transform) -> FbxModel {
    let kind = if node.has_light() {
        ModelKind::Light
    } else if node.has_camera() {
        ModelKind::Camera
    } else if node.has_mesh() {
        ModelKind::Mesh
    } else {
        ModelKind::Null
    };

    let euler = transform.rotation.to_euler_degrees();
    FbxModel {
        id,
        name: node.name.clone(),
        kind,
        translation: Vec3::new(-transform.position.x, transform.position.y, transform.position.z),
        rotation: Vec3::new(euler.x, -euler.y, -euler.z),
        scaling: transform.scale,
    }
}

fn has_fbx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("fbx"))
}

impl ModelExporter for FbxAsciiWriter {
    fn export(
        &mut self,
        forest: &SceneForest,
        node: NodeId,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<(), ModelExportError> {
        if !has_fbx_extension(path) {
            return Err(ModelExportError::WrongExtension {
                path: path.to_path_buf(),
            });
        }
        if options.copy_materials || options.copy_textures {
            debug!(
                copy_materials = options.copy_materials,
                copy_textures = options.copy_textures,
                "Scene carries no materials, nothing to copy"
            );
        }

        let document = self.build_document(forest, node)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(document.to_ascii().as_bytes())?;
        writer.flush()?;

        info!(path = %path.display(), models = document.models.len(), "Exported FBX");
        Ok(())
    }
}
