//! Selection resolving
//!
//! Turns what the user picked into the ordered list of nodes an export
//! batch works on.

use hifi_core::{Error, Prompt, Result};
use tracing::{debug, info, warn};

use crate::node::NodeId;
use crate::path;
use crate::tree::SceneForest;

/// One selected item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedItem {
    /// A scene node
    Node(NodeId),
    /// Anything that is not a scene node (an asset, a folder, an unmatched name)
    Other(String),
}

/// An ordered selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<SelectedItem>,
}

impl Selection {
    /// Empty selection, which asks to export the whole scene
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            items: nodes.into_iter().map(SelectedItem::Node).collect(),
        }
    }

    pub fn push(&mut self, item: SelectedItem) {
        self.items.push(item);
    }

    /// Resolve names, name paths or globs against a forest
    ///
    /// A token that matches nothing becomes [`SelectedItem::Other`].
    pub fn from_tokens<S: AsRef<str>>(forest: &SceneForest, tokens: &[S]) -> Self {
        let mut selection = Self::empty();
        for token in tokens {
            let token = token.as_ref();
            let matched = if path::is_pattern(token) {
                forest.find_matching(token)
            } else {
                forest
                    .find_by_path(token)
                    .or_else(|| forest.find_by_name(token))
                    .into_iter()
                    .collect()
            };

            if matched.is_empty() {
                debug!(token, "Selection token matched no node");
                selection.push(SelectedItem::Other(token.to_string()));
            } else {
                selection.items.extend(matched.into_iter().map(SelectedItem::Node));
            }
        }
        selection
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Outcome of resolving a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Distinct nodes in selection order
    Nodes(Vec<NodeId>),
    /// The user declined to export the whole scene
    Cancelled,
}

/// Resolves a [`Selection`] against a forest, asking the user when needed
pub struct SelectionResolver<'a> {
    forest: &'a SceneForest,
    prompt: &'a dyn Prompt,
}

impl<'a> SelectionResolver<'a> {
    pub fn new(forest: &'a SceneForest, prompt: &'a dyn Prompt) -> Self {
        Self { forest, prompt }
    }

    /// Resolve to a node list
    ///
    /// An empty selection asks whether to export every active node. Any
    /// non-node item aborts the whole batch with a warning.
    pub fn resolve(&self, selection: &Selection) -> Result<Resolved> {
        if selection.is_empty() {
            let accepted = self.prompt.confirm(
                "Export Scene",
                "No Game Object Selected. Do you want to export the entire scene?",
            );
            if !accepted {
                info!("Whole-scene export declined");
                return Ok(Resolved::Cancelled);
            }
            let nodes = self.forest.active_nodes();
            info!(nodes = nodes.len(), "Exporting entire scene");
            return Ok(Resolved::Nodes(nodes));
        }

        let mut nodes: Vec<NodeId> = Vec::with_capacity(selection.len());
        for item in selection.items() {
            match item {
                SelectedItem::Node(id) => {
                    self.forest.node(*id)?;
                    if !nodes.contains(id) {
                        nodes.push(*id);
                    }
                }
                SelectedItem::Other(name) => {
                    warn!(item = %name, "Selected item is not a scene node");
                    self.prompt.notify("Warning", "Item selected is not a GameObject");
                    return Err(Error::InvalidSelection { item: name.clone() });
                }
            }
        }

        debug!(nodes = nodes.len(), "Resolved selection");
        Ok(Resolved::Nodes(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SceneNode;
    use hifi_core::ScriptedPrompt;

    fn sample() -> (SceneForest, NodeId, NodeId, NodeId) {
        let mut forest = SceneForest::new();
        let house = forest.add_node(SceneNode::new("House"));
        let lamp = forest.add_child(house, SceneNode::new("Lamp")).unwrap();
        let hidden = forest.add_node(SceneNode::new("Hidden").inactive());
        (forest, house, lamp, hidden)
    }

    #[test]
    fn test_empty_selection_confirmed() {
        let (forest, house, lamp, _) = sample();
        let prompt = ScriptedPrompt::new(true);
        let resolved = SelectionResolver::new(&forest, &prompt)
            .resolve(&Selection::empty())
            .unwrap();

        assert_eq!(resolved, Resolved::Nodes(vec![house, lamp]));
    }

    #[test]
    fn test_empty_selection_declined() {
        let (forest, _, _, _) = sample();
        let prompt = ScriptedPrompt::new(false);
        let resolved = SelectionResolver::new(&forest, &prompt)
            .resolve(&Selection::empty())
            .unwrap();

        assert_eq!(resolved, Resolved::Cancelled);
        assert!(prompt.notices().is_empty());
    }

    #[test]
    fn test_duplicates_removed() {
        let (forest, house, lamp, _) = sample();
        let prompt = ScriptedPrompt::new(true);
        let selection = Selection::from_nodes([lamp, house, lamp]);
        let resolved = SelectionResolver::new(&forest, &prompt).resolve(&selection).unwrap();

        assert_eq!(resolved, Resolved::Nodes(vec![lamp, house]));
    }

    #[test]
    fn test_non_node_aborts() {
        let (forest, house, _, _) = sample();
        let prompt = ScriptedPrompt::new(true);
        let mut selection = Selection::from_nodes([house]);
        selection.push(SelectedItem::Other("Materials/Brick.mat".into()));

        let err = SelectionResolver::new(&forest, &prompt).resolve(&selection).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection { .. }));
        assert_eq!(prompt.count_titled("Warning"), 1);
    }

    #[test]
    fn test_from_tokens() {
        let (forest, house, lamp, hidden) = sample();
        let selection = Selection::from_tokens(&forest, &["House/Lamp", "H*", "Garage"]);

        assert_eq!(
            selection.items(),
            &[
                SelectedItem::Node(lamp),
                // "H*" also matches the path House/Lamp
                SelectedItem::Node(house),
                SelectedItem::Node(lamp),
                SelectedItem::Node(hidden),
                SelectedItem::Other("Garage".into()),
            ]
        );
    }
}
