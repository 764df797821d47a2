//! HiFi Exporter Pipeline
//!
//! Turns a selection of scene nodes into FBX model files plus a JSON
//! entity manifest:
//! - Manifest building for embedded or flattened hierarchies
//! - ASCII FBX model writing behind the [`ModelExporter`] seam
//! - Project path resolution and model URLs
//! - Export sessions driving prompts, path choosers and exporters

pub mod config;
pub mod fbx;
pub mod logging;
pub mod manifest;
pub mod paths;
pub mod pipeline;

pub use config::ExporterConfig;
pub use fbx::{ExportOptions, FbxAsciiWriter, ModelExportError, ModelExporter};
pub use manifest::{
    EntityType, ExportBatch, ExportPolicy, Manifest, ManifestBuilder, ManifestEntry, ManifestError,
    ManifestOptions,
};
pub use paths::{FixedPaths, ModelLocator, PathChooser, ProjectLayout};
pub use pipeline::{preview_manifest, ExportError, ExportOutcome, ExportReport, ExportSession};
