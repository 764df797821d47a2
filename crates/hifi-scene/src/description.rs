//! Scene description files
//!
//! A scene is described as a flat node list in YAML or JSON. Parents are
//! referenced by name and may be declared in any order.
//!
//! ```yaml
//! nodes:
//!   - name: House
//!     position: { x: 0, y: 0, z: 5 }
//!     mesh: { min: { x: -1, y: 0, z: -1 }, max: { x: 1, y: 3, z: 1 } }
//!   - name: Lamp
//!     parent: House
//!     euler: { x: 0, y: 90, z: 0 }
//!     light: { kind: spot }
//! ```

use std::collections::HashMap;
use std::path::Path;

use hifi_core::{BoundingBox, Error, Quat, Result, ResultExt, Transform, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::node::{Camera, Components, Light, SceneNode};
use crate::tree::SceneForest;

/// Root of a scene description document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
}

/// One node of a scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub position: Vec3,
    /// Quaternion rotation; takes precedence over `euler`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
    /// Euler angles in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub euler: Option<Vec3>,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collider: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<Light>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
}

fn default_active() -> bool {
    true
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl NodeDescription {
    fn to_node(&self) -> SceneNode {
        let rotation = self
            .rotation
            .or_else(|| self.euler.map(Quat::from_euler_degrees))
            .unwrap_or(Quat::IDENTITY);

        let mut node = SceneNode::new(self.name.clone()).with_transform(Transform {
            position: self.position,
            rotation,
            scale: self.scale,
        });
        node.active = self.active;
        node.components = Components {
            mesh: self.mesh,
            renderer: self.renderer,
            collider: self.collider,
            light: self.light.clone(),
            camera: self.camera.clone(),
        };
        node
    }
}

/// Description file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFormat {
    Yaml,
    Json,
}

impl DescriptionFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnsupportedFormat { extension: ext }),
        }
    }
}

impl SceneDescription {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::invalid_data(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::invalid_data(e.to_string()))
    }

    /// Build a forest; parents may appear before or after their children
    pub fn build(&self) -> Result<SceneForest> {
        let mut forest = SceneForest::new();
        let mut by_name = HashMap::with_capacity(self.nodes.len());

        for desc in &self.nodes {
            if by_name.contains_key(desc.name.as_str()) {
                return Err(Error::DuplicateNode {
                    name: desc.name.clone(),
                });
            }
            let id = forest.add_node(desc.to_node());
            by_name.insert(desc.name.as_str(), id);
        }

        for desc in &self.nodes {
            let Some(parent_name) = &desc.parent else {
                continue;
            };
            let parent = by_name
                .get(parent_name.as_str())
                .copied()
                .ok_or_else(|| Error::UnknownParent {
                    node: desc.name.clone(),
                    parent: parent_name.clone(),
                })?;
            forest.set_parent(by_name[desc.name.as_str()], Some(parent))?;
        }

        debug!(nodes = forest.len(), roots = forest.roots().len(), "Built scene forest");
        Ok(forest)
    }

    /// Describe an existing forest (node names must be unique to reload it)
    pub fn from_forest(forest: &SceneForest) -> Self {
        let nodes = forest
            .iter()
            .map(|(_, node)| NodeDescription {
                name: node.name.clone(),
                parent: node
                    .parent()
                    .and_then(|p| forest.get(p))
                    .map(|p| p.name.clone()),
                active: node.active,
                position: node.transform.position,
                rotation: Some(node.transform.rotation),
                euler: None,
                scale: node.transform.scale,
                mesh: node.components.mesh,
                renderer: node.components.renderer,
                collider: node.components.collider,
                light: node.components.light.clone(),
                camera: node.components.camera.clone(),
            })
            .collect();
        Self { nodes }
    }
}

impl SceneForest {
    pub fn from_description(description: &SceneDescription) -> Result<Self> {
        description.build()
    }

    /// Load a forest from a `.yaml`, `.yml` or `.json` description file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let format = DescriptionFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;

        let description = match format {
            DescriptionFormat::Yaml => SceneDescription::from_yaml_str(&text),
            DescriptionFormat::Json => SceneDescription::from_json_str(&text),
        }
        .with_context(|| format!("while loading scene {}", path.display()))?;

        let forest = Self::from_description(&description)?;
        info!(path = %path.display(), nodes = forest.len(), "Loaded scene");
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
nodes:
  - name: Lamp
    parent: House
    euler: { x: 0, y: 90, z: 0 }
    light: { kind: spot }
  - name: House
    position: { x: 0, y: 0, z: 5 }
    mesh: { min: { x: -1, y: 0, z: -1 }, max: { x: 1, y: 3, z: 1 } }
  - name: Camera
    active: false
    camera: {}
"#;

    #[test]
    fn test_build_from_yaml() {
        let forest = SceneDescription::from_yaml_str(YAML).unwrap().build().unwrap();
        let house = forest.find_by_name("House").unwrap();
        let lamp = forest.find_by_name("Lamp").unwrap();

        assert_eq!(forest.len(), 3);
        assert_eq!(forest.parent(lamp).unwrap(), Some(house));
        assert!(forest.node(house).unwrap().has_mesh());
        assert!(forest.node(lamp).unwrap().has_light());
        assert_eq!(forest.world_position(lamp).unwrap(), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(forest.active_nodes().len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let desc = SceneDescription::from_json_str(r#"{"nodes":[{"name":"A"},{"name":"A"}]}"#).unwrap();
        assert!(matches!(desc.build().unwrap_err(), Error::DuplicateNode { .. }));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let desc = SceneDescription::from_json_str(r#"{"nodes":[{"name":"A","parent":"B"}]}"#).unwrap();
        assert!(matches!(desc.build().unwrap_err(), Error::UnknownParent { .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        let desc = SceneDescription::from_json_str(
            r#"{"nodes":[{"name":"A","parent":"B"},{"name":"B","parent":"A"}]}"#,
        )
        .unwrap();
        assert!(matches!(desc.build().unwrap_err(), Error::Cycle { .. }));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DescriptionFormat::from_path(Path::new("a.YML")).unwrap(), DescriptionFormat::Yaml);
        assert_eq!(DescriptionFormat::from_path(Path::new("a.json")).unwrap(), DescriptionFormat::Json);
        assert!(DescriptionFormat::from_path(Path::new("a.fbx")).is_err());
    }

    #[test]
    fn test_from_forest_reloads() {
        let forest = SceneDescription::from_yaml_str(YAML).unwrap().build().unwrap();
        let reloaded = SceneDescription::from_forest(&forest).build().unwrap();
        assert_eq!(reloaded, forest);
    }
}
