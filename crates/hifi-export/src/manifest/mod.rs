//! Entity manifest
//!
//! The manifest is a JSON document `{"Entities":[...]}` with one entry per
//! exported node. Its shape depends on the [`ExportPolicy`] of the batch:
//! embedded exports list only batch roots, flattened exports list every
//! node together with synthetic ids linking it to its original parent.

mod builder;
pub mod geometry;

pub use builder::{BatchMember, ExportBatch, ExportPolicy, ManifestBuilder};
pub use geometry::EntityType;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use hifi_core::{EntityId, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Scene error: {0}")]
    Scene(#[from] hifi_core::Error),
}

pub type ManifestResult<T> = Result<T, ManifestError>;

/// Manifest output options
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// Pretty-print instead of the compact single-line form
    pub pretty: bool,
}

/// Shape shared by every entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedEntry {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub position: Vec3,
    #[serde(rename = "registrationPoint")]
    pub registration_point: Vec3,
    pub dimensions: Vec3,
    #[serde(rename = "modelURL")]
    pub model_url: String,
}

/// Entry of a flattened export, linked to its parent by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenedEntry {
    #[serde(with = "guid")]
    pub id: EntityId,
    #[serde(rename = "parentID", with = "guid")]
    pub parent_id: EntityId,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(rename = "shapeType", default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    pub position: Vec3,
    #[serde(rename = "registrationPoint")]
    pub registration_point: Vec3,
    pub dimensions: Vec3,
    #[serde(rename = "modelURL")]
    pub model_url: String,
}

/// One manifest entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    Flattened(FlattenedEntry),
    Embedded(EmbeddedEntry),
}

impl ManifestEntry {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Flattened(e) => e.entity_type,
            Self::Embedded(e) => e.entity_type,
        }
    }

    pub fn dimensions(&self) -> Vec3 {
        match self {
            Self::Flattened(e) => e.dimensions,
            Self::Embedded(e) => e.dimensions,
        }
    }

    pub fn model_url(&self) -> &str {
        match self {
            Self::Flattened(e) => &e.model_url,
            Self::Embedded(e) => &e.model_url,
        }
    }

    pub fn as_flattened(&self) -> Option<&FlattenedEntry> {
        match self {
            Self::Flattened(e) => Some(e),
            Self::Embedded(_) => None,
        }
    }
}

/// The whole manifest document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "Entities")]
    pub entities: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn to_json_string(&self, options: &ManifestOptions) -> ManifestResult<String> {
        let text = if options.pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    pub fn from_json_str(text: &str) -> ManifestResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the manifest as UTF-8, replacing any existing file
    pub fn write(&self, path: impl AsRef<Path>, options: &ManifestOptions) -> ManifestResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        if options.pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writer.flush()?;

        info!(path = %path.display(), entities = self.len(), "Wrote manifest");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Ids are written in brace-wrapped GUID form
mod guid {
    use hifi_core::EntityId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &EntityId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_guid_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntityId, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != 32 || text.chars().any(|c| !"{}-0123456789".contains(c)) {
            return Err(serde::de::Error::custom(format!("invalid entity id: {text}")));
        }
        digits
            .parse::<u64>()
            .map(EntityId::new)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flattened() -> FlattenedEntry {
        FlattenedEntry {
            id: EntityId::FIRST,
            parent_id: EntityId::NONE,
            entity_type: EntityType::Model,
            shape_type: Some("compound".into()),
            position: Vec3::new(-1.0, 0.0, 0.0),
            registration_point: Vec3::splat(0.5),
            dimensions: Vec3::splat(2.0),
            model_url: "file:///project/Assets/Export/A.fbx".into(),
        }
    }

    #[test]
    fn test_flattened_entry_json() {
        let value = serde_json::to_value(ManifestEntry::Flattened(flattened())).unwrap();

        assert_eq!(value["id"], "{00000000-0000-0000-0000-000000000002}");
        assert_eq!(value["parentID"], "{00000000-0000-0000-0000-000000000000}");
        assert_eq!(value["type"], "Model");
        assert_eq!(value["shapeType"], "compound");
        assert_eq!(value["registrationPoint"]["y"], 0.5);
        assert_eq!(value["modelURL"], "file:///project/Assets/Export/A.fbx");
    }

    #[test]
    fn test_embedded_entry_has_no_ids() {
        let entry = ManifestEntry::Embedded(EmbeddedEntry {
            entity_type: EntityType::Light,
            position: Vec3::ZERO,
            registration_point: Vec3::ZERO,
            dimensions: Vec3::ONE,
            model_url: "file:///p/Assets/Lamp.fbx".into(),
        });
        let value = serde_json::to_value(&entry).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("id"));
        assert!(!object.contains_key("parentID"));
        assert!(!object.contains_key("shapeType"));
        assert_eq!(object["type"], "Light");
    }

    #[test]
    fn test_manifest_document() {
        let manifest = Manifest {
            entities: vec![ManifestEntry::Flattened(flattened())],
        };
        let compact = manifest.to_json_string(&ManifestOptions::default()).unwrap();

        assert!(compact.starts_with("{\"Entities\":[{"));
        assert!(!compact.contains('\n'));
        assert_eq!(Manifest::from_json_str(&compact).unwrap(), manifest);

        let pretty = manifest.to_json_string(&ManifestOptions { pretty: true }).unwrap();
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gameObjects.json");
        let manifest = Manifest::default();

        manifest.write(&path, &ManifestOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"Entities\":[]}");
        assert_eq!(Manifest::load(&path).unwrap(), manifest);
    }

    #[test]
    fn test_bad_id_falls_back_to_embedded() {
        let text = r#"{"Entities":[{"id":"{2}","parentID":"{00000000-0000-0000-0000-000000000000}","type":"Model","position":{"x":0,"y":0,"z":0},"registrationPoint":{"x":0,"y":0,"z":0},"dimensions":{"x":1,"y":1,"z":1},"modelURL":"x"}]}"#;
        // Falls through to the embedded shape, which ignores the unknown id
        let manifest = Manifest::from_json_str(text).unwrap();
        assert!(manifest.entities[0].as_flattened().is_none());
    }
}
