//! Export batches and manifest building
//!
//! An [`ExportBatch`] is the ordered node list one export works on. Model
//! export and [`ManifestBuilder`] both consume it, so models and manifest
//! entries always line up.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use hifi_core::{EntityId, Result, Vec3};
use hifi_scene::{NodeId, ParentLinks, SceneForest};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geometry::{self, EntityType};
use super::{EmbeddedEntry, FlattenedEntry, Manifest, ManifestEntry};
use crate::paths::ModelLocator;

/// How the nodes of a batch map to model files and manifest entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportPolicy {
    /// One model per batch root, descendants embedded in it
    #[default]
    #[serde(rename = "single")]
    EmbedChildren,
    /// One model per node, hierarchy kept only through manifest ids
    #[serde(rename = "separate")]
    FlattenChildren,
}

impl FromStr for ExportPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "embed" => Ok(Self::EmbedChildren),
            "separate" | "flatten" => Ok(Self::FlattenChildren),
            _ => Err(format!("Unknown export mode: {}", s)),
        }
    }
}

impl fmt::Display for ExportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmbedChildren => write!(f, "single"),
            Self::FlattenChildren => write!(f, "separate"),
        }
    }
}

/// One node of an export batch with its original parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchMember {
    pub node: NodeId,
    pub parent: Option<NodeId>,
}

/// Ordered nodes of one export, shared by model export and manifest building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBatch {
    policy: ExportPolicy,
    members: Vec<BatchMember>,
}

impl ExportBatch {
    /// Batch roots of a selection: nodes whose parent is not selected
    pub fn embedded(forest: &SceneForest, selected: &[NodeId]) -> Result<Self> {
        let in_batch: HashSet<NodeId> = selected.iter().copied().collect();
        let mut members = Vec::with_capacity(selected.len());

        for &node in selected {
            let parent = forest.parent(node)?;
            if parent.is_some_and(|p| in_batch.contains(&p)) {
                debug!(node = %node, "Embedded in its parent, skipping");
                continue;
            }
            members.push(BatchMember { node, parent });
        }

        Ok(Self {
            policy: ExportPolicy::EmbedChildren,
            members,
        })
    }

    /// Every recorded node, in table order
    pub fn flattened(links: &ParentLinks) -> Self {
        let members = links
            .iter()
            .map(|link| BatchMember {
                node: link.node,
                parent: link.parent,
            })
            .collect();

        Self {
            policy: ExportPolicy::FlattenChildren,
            members,
        }
    }

    pub fn policy(&self) -> ExportPolicy {
        self.policy
    }

    pub fn members(&self) -> &[BatchMember] {
        &self.members
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().map(|m| m.node)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Ids in batch order, starting at [`EntityId::FIRST`]
    pub fn entity_ids(&self) -> HashMap<NodeId, EntityId> {
        self.members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.node, EntityId::new(EntityId::FIRST.value() + i as u64)))
            .collect()
    }
}

/// Builds the manifest of a batch
pub struct ManifestBuilder<'a> {
    forest: &'a SceneForest,
    locator: &'a ModelLocator,
}

impl<'a> ManifestBuilder<'a> {
    /// `forest` is the scene as the models were exported: detached for
    /// flattened batches
    pub fn new(forest: &'a SceneForest, locator: &'a ModelLocator) -> Self {
        Self { forest, locator }
    }

    pub fn build(&self, batch: &ExportBatch) -> Result<Manifest> {
        let entities = match batch.policy() {
            ExportPolicy::EmbedChildren => batch
                .nodes()
                .map(|id| self.embedded_entry(id))
                .collect::<Result<Vec<_>>>()?,
            ExportPolicy::FlattenChildren => {
                let ids = batch.entity_ids();
                batch
                    .members()
                    .iter()
                    .map(|m| self.flattened_entry(m, &ids))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        debug!(policy = %batch.policy(), entities = entities.len(), "Built manifest");
        Ok(Manifest { entities })
    }

    fn embedded_entry(&self, id: NodeId) -> Result<ManifestEntry> {
        let node = self.forest.node(id)?;
        Ok(ManifestEntry::Embedded(EmbeddedEntry {
            entity_type: EntityType::classify(node),
            position: geometry::manifest_position(self.forest.world_position(id)?),
            registration_point: Vec3::ZERO,
            dimensions: geometry::embedded_dimensions(self.forest, id)?,
            model_url: self.locator.model_url(&node.name),
        }))
    }

    fn flattened_entry(
        &self,
        member: &BatchMember,
        ids: &HashMap<NodeId, EntityId>,
    ) -> Result<ManifestEntry> {
        let node = self.forest.node(member.node)?;
        let entity_type = EntityType::classify(node);
        let parent_id = member
            .parent
            .and_then(|p| ids.get(&p).copied())
            .unwrap_or(EntityId::NONE);

        Ok(ManifestEntry::Flattened(FlattenedEntry {
            id: ids[&member.node],
            parent_id,
            entity_type,
            shape_type: (entity_type == EntityType::Model).then(|| "compound".to_string()),
            position: geometry::manifest_position(self.forest.world_position(member.node)?),
            registration_point: node
                .components
                .mesh
                .map(|b| geometry::registration_point(&b))
                .unwrap_or(Vec3::ZERO),
            dimensions: geometry::flattened_dimensions(node),
            model_url: self.locator.model_url(&node.name),
        }))
    }
}
