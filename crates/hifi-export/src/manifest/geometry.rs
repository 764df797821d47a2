//! Geometry-derived manifest fields

use hifi_core::{BoundingBox, Result, Vec3};
use hifi_scene::{NodeId, SceneForest, SceneNode};
use serde::{Deserialize, Serialize};

/// Semantic entity type of a manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Model,
    Light,
    /// Cameras have no entity type of their own
    #[serde(rename = "")]
    Camera,
}

impl EntityType {
    /// Light wins over camera, everything else is a model
    pub fn classify(node: &SceneNode) -> Self {
        if node.has_light() {
            Self::Light
        } else if node.has_camera() {
            Self::Camera
        } else {
            Self::Model
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::Light => "Light",
            Self::Camera => "",
        }
    }
}

/// Mirror a world position into the manifest's handedness (X negated)
pub fn manifest_position(world: Vec3) -> Vec3 {
    Vec3::new(-world.x, world.y, world.z)
}

/// Normalized pivot inside mesh bounds; zero-extent axes yield 0
pub fn registration_point(bounds: &BoundingBox) -> Vec3 {
    let min = bounds.min;
    let size = bounds.size();
    let axis = |min: f32, size: f32| if size == 0.0 { 0.0 } else { -min / size };
    Vec3::new(axis(min.x, size.x), axis(min.y, size.y), axis(min.z, size.z))
}

/// Replace an exactly-zero size with the unit cube
pub fn non_zero_dimensions(size: Vec3) -> Vec3 {
    if size.is_zero() { Vec3::ONE } else { size }
}

/// Dimensions of a node exported together with its descendants
///
/// Uses the node's own renderer bounds grown by every active descendant's
/// renderer bounds. Nodes without a renderer fall back to colliders.
pub fn embedded_dimensions(forest: &SceneForest, id: NodeId) -> Result<Vec3> {
    let node = forest.node(id)?;
    let bounds = if let Some(own) = node.components.renderer {
        Some(encapsulate_active(forest, id, own, |n| n.components.renderer)?)
    } else if let Some(own) = node.components.collider {
        Some(encapsulate_active(forest, id, own, |n| n.components.collider)?)
    } else {
        None
    };

    let size = bounds.map(|b| b.size()).unwrap_or(Vec3::ZERO);
    Ok(non_zero_dimensions(size.scale(&node.transform.scale)))
}

/// Dimensions of a node exported on its own: mesh bounds only
pub fn flattened_dimensions(node: &SceneNode) -> Vec3 {
    let size = node.components.mesh.map(|b| b.size()).unwrap_or(Vec3::ZERO);
    non_zero_dimensions(size.scale(&node.transform.scale))
}

fn encapsulate_active(
    forest: &SceneForest,
    id: NodeId,
    own: BoundingBox,
    pick: impl Fn(&SceneNode) -> Option<BoundingBox>,
) -> Result<BoundingBox> {
    let mut bounds = own;
    for child in forest.descendants(id)? {
        if !forest.is_active_in_hierarchy(child)? {
            continue;
        }
        if let Some(b) = pick(forest.node(child)?) {
            bounds.encapsulate(&b);
        }
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hifi_core::Transform;
    use hifi_scene::{Camera, Light, LightKind};

    fn cube(min: f32, max: f32) -> BoundingBox {
        BoundingBox::new(Vec3::splat(min), Vec3::splat(max))
    }

    #[test]
    fn test_classify() {
        let both = SceneNode::new("Both")
            .with_light(Light { kind: LightKind::Spot })
            .with_camera(Camera::default());
        assert_eq!(EntityType::classify(&both), EntityType::Light);
        assert_eq!(EntityType::classify(&SceneNode::new("Cam").with_camera(Camera::default())), EntityType::Camera);
        assert_eq!(EntityType::classify(&SceneNode::new("Box")), EntityType::Model);
        assert_eq!(serde_json::to_string(&EntityType::Camera).unwrap(), "\"\"");
    }

    #[test]
    fn test_registration_point() {
        assert_eq!(registration_point(&cube(-1.0, 1.0)), Vec3::splat(0.5));

        let flat = BoundingBox::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 2.0));
        let rp = registration_point(&flat);
        assert_eq!(rp, Vec3::new(0.25, 0.0, 0.0));
        assert!(rp.x.is_finite() && rp.y.is_finite() && rp.z.is_finite());
    }

    #[test]
    fn test_manifest_position() {
        assert_eq!(manifest_position(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(-1.0, 2.0, 3.0));
    }

    #[test]
    fn test_flattened_dimensions() {
        let scaled = SceneNode::new("Box").with_mesh(cube(-1.0, 1.0)).with_transform(Transform {
            scale: Vec3::new(2.0, 1.0, 0.5),
            ..Transform::IDENTITY
        });
        assert_eq!(flattened_dimensions(&scaled), Vec3::new(4.0, 2.0, 1.0));
        assert_eq!(flattened_dimensions(&SceneNode::new("Empty")), Vec3::ONE);
    }

    #[test]
    fn test_embedded_dimensions_skip_inactive() {
        let mut forest = SceneForest::new();
        let root = forest.add_node(SceneNode::new("Root").with_renderer(cube(0.0, 1.0)));
        forest
            .add_child(root, SceneNode::new("Wide").with_renderer(cube(0.0, 3.0)))
            .unwrap();
        forest
            .add_child(root, SceneNode::new("Off").with_renderer(cube(-10.0, 10.0)).inactive())
            .unwrap();

        assert_eq!(embedded_dimensions(&forest, root).unwrap(), Vec3::splat(3.0));
    }

    #[test]
    fn test_embedded_dimensions_collider_fallback() {
        let mut forest = SceneForest::new();
        let root = forest.add_node(SceneNode::new("Root").with_collider(cube(0.0, 2.0)));
        forest
            .add_child(root, SceneNode::new("Child").with_collider(cube(-1.0, 0.0)))
            .unwrap();
        let empty = forest.add_node(SceneNode::new("Empty"));

        assert_eq!(embedded_dimensions(&forest, root).unwrap(), Vec3::splat(3.0));
        assert_eq!(embedded_dimensions(&forest, empty).unwrap(), Vec3::ONE);
    }
}
