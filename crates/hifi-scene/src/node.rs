//! Scene node structures

use hifi_core::{BoundingBox, Transform};
use serde::{Deserialize, Serialize};

/// Index of a node inside a [`SceneForest`](crate::SceneForest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Light type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Directional,
    #[default]
    Point,
    Spot,
    Area,
}

/// Light component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Light {
    #[serde(default)]
    pub kind: LightKind,
}

/// Camera component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(default = "default_fov")]
    pub field_of_view: f32,
}

fn default_fov() -> f32 {
    60.0
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            field_of_view: default_fov(),
        }
    }
}

/// Optional components attached to a node
///
/// Mesh bounds are in the node's local space. Renderer and collider bounds
/// are world-space boxes, as a host engine reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collider: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<Light>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
}

/// A single entity in the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Node name, also used as the exported model's file stem
    pub name: String,
    /// Whether the node itself is enabled
    pub active: bool,
    /// Transform relative to the parent
    pub transform: Transform,
    /// Attached components
    pub components: Components,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    /// Create an active node with an identity transform and no components
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            transform: Transform::IDENTITY,
            components: Components::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, bounds: BoundingBox) -> Self {
        self.components.mesh = Some(bounds);
        self
    }

    pub fn with_renderer(mut self, bounds: BoundingBox) -> Self {
        self.components.renderer = Some(bounds);
        self
    }

    pub fn with_collider(mut self, bounds: BoundingBox) -> Self {
        self.components.collider = Some(bounds);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.components.light = Some(light);
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.components.camera = Some(camera);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_mesh(&self) -> bool {
        self.components.mesh.is_some()
    }

    pub fn has_light(&self) -> bool {
        self.components.light.is_some()
    }

    pub fn has_camera(&self) -> bool {
        self.components.camera.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hifi_core::Vec3;

    #[test]
    fn test_new_node() {
        let node = SceneNode::new("Crate");
        assert!(node.active);
        assert_eq!(node.name, "Crate");
        assert_eq!(node.parent(), None);
        assert!(node.children().is_empty());
        assert!(!node.has_mesh());
    }

    #[test]
    fn test_builder_components() {
        let node = SceneNode::new("Lamp")
            .with_light(Light { kind: LightKind::Spot })
            .with_mesh(BoundingBox::new(Vec3::splat(-1.0), Vec3::ONE))
            .inactive();

        assert!(node.has_light());
        assert!(node.has_mesh());
        assert!(!node.has_camera());
        assert!(!node.active);
    }

    #[test]
    fn test_components_deserialize_defaults() {
        let components: Components = serde_json::from_str(r#"{"light":{},"camera":{}}"#).unwrap();
        assert_eq!(components.light, Some(Light { kind: LightKind::Point }));
        assert_eq!(components.camera.map(|c| c.field_of_view), Some(60.0));
        assert!(components.mesh.is_none());
    }
}
