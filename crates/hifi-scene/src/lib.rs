//! HiFi Exporter Scene Model
//!
//! Provides the scene forest the exporter works on:
//! - Arena-backed nodes with transforms and optional components
//! - Hierarchy detaching with an explicit restoration record
//! - Selection resolving (explicit picks, name globs, whole scene)
//! - YAML/JSON scene descriptions
//!
//! # Example
//! ```no_run
//! use hifi_scene::{ParentLinks, SceneForest};
//!
//! let forest = SceneForest::load("scene.yaml").unwrap();
//! let links = ParentLinks::capture(&forest, &forest.roots()).unwrap();
//!
//! // Every recorded node becomes a root
//! let flat = links.detach(&forest).unwrap();
//! assert_eq!(flat.roots().len(), forest.len());
//!
//! let restored = links.restore(flat).unwrap();
//! assert_eq!(restored, forest);
//! ```

pub mod description;
pub mod hierarchy;
pub mod node;
pub mod path;
pub mod selection;
pub mod tree;

pub use description::{DescriptionFormat, NodeDescription, SceneDescription};
pub use hierarchy::{DetachGuard, ParentLink, ParentLinks};
pub use node::{Camera, Components, Light, LightKind, NodeId, SceneNode};
pub use selection::{Resolved, SelectedItem, Selection, SelectionResolver};
pub use tree::SceneForest;
