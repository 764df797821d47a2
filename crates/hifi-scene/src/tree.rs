//! Scene forest implementation

use hifi_core::{Error, Result, Transform, Vec3};
use crate::node::{NodeId, SceneNode};
use crate::path;

/// Arena-backed forest of scene nodes
///
/// Parent and child links are kept consistent by the forest. Children are
/// always ordered by `NodeId`, which makes the sibling order independent of
/// the order in which nodes were re-parented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneForest {
    nodes: Vec<SceneNode>,
}

impl SceneForest {
    /// Create an empty forest
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node as a new root
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Add a node under an existing parent
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.add_node(node);
        self.set_parent(id, Some(parent))?;
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    /// Get a node or fail with `NodeNotFound`
    pub fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.nodes.get(id.0).ok_or_else(|| Error::node_not_found(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.nodes.get_mut(id.0).ok_or_else(|| Error::node_not_found(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// All node ids in arena order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Iterate nodes with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Parentless nodes in arena order
    pub fn roots(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Change a node's parent. `None` makes it a root.
    ///
    /// The local transform is left untouched.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        let old_parent = self.node(id)?.parent;
        if old_parent == parent {
            return Ok(());
        }

        if let Some(new_parent) = parent {
            self.node(new_parent)?;
            if new_parent == id || self.is_ancestor(id, new_parent)? {
                return Err(Error::Cycle {
                    node: self.nodes[id.0].name.clone(),
                    parent: self.nodes[new_parent.0].name.clone(),
                });
            }
        }

        if let Some(old) = old_parent {
            self.nodes[old.0].children.retain(|c| *c != id);
        }

        if let Some(new_parent) = parent {
            let children = &mut self.nodes[new_parent.0].children;
            let pos = children.binary_search(&id).unwrap_or_else(|p| p);
            children.insert(pos, id);
        }

        self.nodes[id.0].parent = parent;
        Ok(())
    }

    /// Check whether `ancestor` lies on the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> Result<bool> {
        let mut current = self.node(id)?.parent;
        while let Some(p) = current {
            if p == ancestor {
                return Ok(true);
            }
            current = self.nodes[p.0].parent;
        }
        Ok(false)
    }

    /// Parent chain from the direct parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut current = self.node(id)?.parent;
        while let Some(p) = current {
            result.push(p);
            current = self.nodes[p.0].parent;
        }
        Ok(result)
    }

    /// All descendants in depth-first pre-order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut result = self.subtree(id)?;
        result.remove(0);
        Ok(result)
    }

    /// `id` followed by all of its descendants in depth-first pre-order
    pub fn subtree(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.node(id)?;
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        Ok(result)
    }

    /// Active in hierarchy: the node and all of its ancestors are active
    pub fn is_active_in_hierarchy(&self, id: NodeId) -> Result<bool> {
        if !self.node(id)?.active {
            return Ok(false);
        }
        Ok(self.ancestors(id)?.iter().all(|a| self.nodes[a.0].active))
    }

    /// All nodes active in hierarchy, in arena order
    pub fn active_nodes(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|id| self.is_active_in_hierarchy(*id).unwrap_or(false))
            .collect()
    }

    /// World-space transform (position, rotation, lossy scale)
    pub fn world_transform(&self, id: NodeId) -> Result<Transform> {
        let node = self.node(id)?;
        match node.parent {
            Some(parent) => Ok(self.world_transform(parent)?.compose(&node.transform)),
            None => Ok(node.transform),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vec3> {
        Ok(self.world_transform(id)?.position)
    }

    /// Slash-separated name path from the root, e.g. `Building/Floor/Lamp`
    pub fn path_of(&self, id: NodeId) -> Result<String> {
        let mut names: Vec<&str> = self
            .ancestors(id)?
            .iter()
            .map(|a| self.nodes[a.0].name.as_str())
            .collect();
        names.reverse();
        names.push(self.nodes[id.0].name.as_str());
        Ok(names.join("/"))
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    /// Node at a name path, see [`SceneForest::path_of`]
    pub fn find_by_path(&self, node_path: &str) -> Option<NodeId> {
        let wanted = path::normalize_path(node_path);
        self.ids().find(|id| {
            self.path_of(*id)
                .map(|p| path::normalize_path(&p) == wanted)
                .unwrap_or(false)
        })
    }

    /// Nodes whose name or path matches a glob pattern, in arena order
    pub fn find_matching(&self, pattern: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(id, node)| {
                path::glob_match(pattern, &node.name)
                    || self
                        .path_of(*id)
                        .map(|p| path::glob_match(pattern, &p))
                        .unwrap_or(false)
            })
            .map(|(id, _)| id)
            .collect()
    }
}
