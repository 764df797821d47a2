//! Hierarchy detaching
//!
//! Exporting "each node separately" needs every node of the batch to be a
//! root while the manifest still knows the original tree. [`ParentLinks`]
//! is the restoration record: for every node it holds the original parent
//! and local transform. Detaching and restoring are pure functions from one
//! forest value to another; [`DetachGuard`] brackets them over a mutable
//! forest so restoration runs on every exit path.

use std::collections::HashMap;

use hifi_core::{Result, Transform};
use tracing::{debug, error};

use crate::node::NodeId;
use crate::tree::SceneForest;

/// Original placement of one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentLink {
    pub node: NodeId,
    /// `None` means the node was a root
    pub parent: Option<NodeId>,
    /// Local transform before detaching
    pub local: Transform,
}

/// Ordered node → original parent table
///
/// Iteration order is insertion order, which drives manifest id
/// assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentLinks {
    links: Vec<ParentLink>,
    index: HashMap<NodeId, usize>,
}

impl ParentLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every node reachable from `roots`
    pub fn capture(forest: &SceneForest, roots: &[NodeId]) -> Result<Self> {
        let mut links = Self::new();
        for root in roots {
            links.record(forest, *root)?;
        }
        debug!(roots = roots.len(), nodes = links.len(), "Captured parent links");
        Ok(links)
    }

    /// Record `root` and its descendants, depth-first pre-order
    ///
    /// A parent is recorded before its children, so within one subtree a
    /// parent's manifest id is lower than its children's. Nodes already
    /// present keep their first entry; their children are still visited.
    pub fn record(&mut self, forest: &SceneForest, root: NodeId) -> Result<()> {
        for id in forest.subtree(root)? {
            if self.index.contains_key(&id) {
                continue;
            }
            let node = forest.node(id)?;
            self.index.insert(id, self.links.len());
            self.links.push(ParentLink {
                node: id,
                parent: node.parent(),
                local: node.transform,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&ParentLink> {
        self.index.get(&id).map(|i| &self.links[*i])
    }

    /// Recorded nodes in table order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.iter().map(|l| l.node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParentLink> + '_ {
        self.links.iter()
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.index.clear();
    }

    /// Forest in which every recorded node is a root
    ///
    /// Each detached node keeps its world pose: its local transform becomes
    /// the world transform it had in `forest`.
    pub fn detach(&self, forest: &SceneForest) -> Result<SceneForest> {
        let mut flat = forest.clone();
        for link in &self.links {
            let world = forest.world_transform(link.node)?;
            flat.set_parent(link.node, None)?;
            flat.node_mut(link.node)?.transform = world;
        }
        Ok(flat)
    }

    /// Put every recorded node back under its original parent
    ///
    /// Consumes the table; the returned forest has the parent relation and
    /// local transforms that were captured.
    pub fn restore(mut self, mut forest: SceneForest) -> Result<SceneForest> {
        self.restore_into(&mut forest)?;
        Ok(forest)
    }

    fn restore_into(&mut self, forest: &mut SceneForest) -> Result<()> {
        // Clear parents first so intermediate states cannot form a cycle
        // when the forest was edited while detached.
        for link in &self.links {
            forest.set_parent(link.node, None)?;
        }
        for link in &self.links {
            forest.set_parent(link.node, link.parent)?;
            forest.node_mut(link.node)?.transform = link.local;
        }
        debug!(nodes = self.links.len(), "Restored parent links");
        self.clear();
        Ok(())
    }
}

/// Scoped detach over a mutable forest
///
/// Creating the guard swaps the detached forest into the slot. Dropping it
/// (or calling [`DetachGuard::finish`]) swaps the original relation back.
pub struct DetachGuard<'a> {
    slot: &'a mut SceneForest,
    links: ParentLinks,
}

impl<'a> DetachGuard<'a> {
    pub fn new(slot: &'a mut SceneForest, roots: &[NodeId]) -> Result<Self> {
        let links = ParentLinks::capture(slot, roots)?;
        let flat = links.detach(slot)?;
        *slot = flat;
        Ok(Self { slot, links })
    }

    /// The detached forest
    pub fn forest(&self) -> &SceneForest {
        &*self.slot
    }

    pub fn links(&self) -> &ParentLinks {
        &self.links
    }

    /// Restore now and report failures instead of logging them
    pub fn finish(mut self) -> Result<()> {
        let mut links = std::mem::take(&mut self.links);
        links.restore_into(self.slot)
    }
}

impl Drop for DetachGuard<'_> {
    fn drop(&mut self) {
        if self.links.is_empty() {
            return;
        }
        if let Err(e) = self.links.restore_into(self.slot) {
            error!(error = %e, "Failed to restore scene hierarchy");
        }
    }
}

impl std::fmt::Debug for DetachGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetachGuard")
            .field("links", &self.links.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SceneNode;
    use hifi_core::{Error, Vec3};

    fn sample() -> (SceneForest, NodeId, NodeId, NodeId, NodeId) {
        let mut forest = SceneForest::new();
        let root = forest.add_node(SceneNode::new("Root").with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))));
        let a = forest
            .add_child(root, SceneNode::new("A").with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))))
            .unwrap();
        let b = forest.add_child(a, SceneNode::new("B")).unwrap();
        let other = forest.add_node(SceneNode::new("Other"));
        (forest, root, a, b, other)
    }

    #[test]
    fn test_capture_preorder() {
        let (forest, root, a, b, _) = sample();
        let links = ParentLinks::capture(&forest, &[root]).unwrap();

        assert_eq!(links.nodes().collect::<Vec<_>>(), vec![root, a, b]);
        assert_eq!(links.get(root).map(|l| l.parent), Some(None));
        assert_eq!(links.get(b).map(|l| l.parent), Some(Some(a)));
    }

    #[test]
    fn test_capture_skips_recorded() {
        let (forest, root, a, b, _) = sample();
        let links = ParentLinks::capture(&forest, &[a, root]).unwrap();

        // A was recorded first with its real parent; Root is added after
        assert_eq!(links.nodes().collect::<Vec<_>>(), vec![a, b, root]);
        assert_eq!(links.get(a).map(|l| l.parent), Some(Some(root)));
    }

    #[test]
    fn test_detach_keeps_world_pose() {
        let (forest, root, a, b, _) = sample();
        let links = ParentLinks::capture(&forest, &[root]).unwrap();
        let flat = links.detach(&forest).unwrap();

        assert_eq!(flat.roots().len(), 4);
        assert_eq!(flat.world_position(b).unwrap(), forest.world_position(b).unwrap());
        assert_eq!(flat.node(a).unwrap().transform.position, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_restore_roundtrip() {
        let (forest, root, _, _, _) = sample();
        let links = ParentLinks::capture(&forest, &[root]).unwrap();
        let flat = links.detach(&forest).unwrap();
        let restored = links.restore(flat).unwrap();

        assert_eq!(restored, forest);
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let (mut forest, root, a, _, _) = sample();
        let original = forest.clone();
        {
            let guard = DetachGuard::new(&mut forest, &[root]).unwrap();
            assert_eq!(guard.forest().parent(a).unwrap(), None);
            assert_eq!(guard.links().len(), 3);
        }
        assert_eq!(forest, original);
    }

    #[test]
    fn test_guard_restores_on_early_return() {
        fn fails(forest: &mut SceneForest, root: NodeId) -> Result<()> {
            let _guard = DetachGuard::new(forest, &[root])?;
            Err(Error::invalid_data("export failed"))
        }

        let (mut forest, root, _, _, _) = sample();
        let original = forest.clone();
        assert!(fails(&mut forest, root).is_err());
        assert_eq!(forest, original);
    }

    #[test]
    fn test_guard_finish() {
        let (mut forest, root, _, _, _) = sample();
        let original = forest.clone();
        let guard = DetachGuard::new(&mut forest, &[root]).unwrap();
        guard.finish().unwrap();
        assert_eq!(forest, original);
    }
}
