//! FBX model export
//!
//! [`ModelExporter`] is the seam the export session drives. The bundled
//! [`FbxAsciiWriter`] writes the node hierarchy of a subtree as an ASCII
//! FBX 7.4 document.

mod writer;

pub use writer::{ExportOptions, FbxAsciiWriter, ModelExportError};

use std::fmt::Write as _;
use std::path::Path;

use hifi_core::Vec3;
use hifi_scene::{NodeId, SceneForest};

/// Writes one model file per exported node
pub trait ModelExporter {
    /// Export `node` and its descendants to `path`
    fn export(
        &mut self,
        forest: &SceneForest,
        node: NodeId,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<(), ModelExportError>;
}

/// Node attribute type of an FBX model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Null,
    Mesh,
    Light,
    Camera,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Mesh => "Mesh",
            Self::Light => "Light",
            Self::Camera => "Camera",
        }
    }
}

/// FBX `Model` object
#[derive(Debug, Clone, PartialEq)]
pub struct FbxModel {
    pub id: i64,
    pub name: String,
    pub kind: ModelKind,
    pub translation: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    pub scaling: Vec3,
}

/// Object-to-object connection; parent 0 is the scene root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub child: i64,
    pub parent: i64,
}

/// In-memory ASCII FBX document
#[derive(Debug, Clone, PartialEq)]
pub struct FbxDocument {
    pub creator: String,
    pub models: Vec<FbxModel>,
    pub connections: Vec<Connection>,
}

impl FbxDocument {
    fn model_name(&self, id: i64) -> &str {
        self.models
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.as_str())
            .unwrap_or("RootNode")
    }

    /// Render the ASCII form
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_ascii(&mut out);
        out
    }

    fn write_ascii(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "; FBX 7.4.0 project file")?;
        writeln!(out, "; Created by {}", self.creator)?;
        writeln!(out, "; ----------------------------------------------------")?;
        writeln!(out)?;

        writeln!(out, "FBXHeaderExtension:  {{")?;
        writeln!(out, "\tFBXHeaderVersion: 1003")?;
        writeln!(out, "\tFBXVersion: 7400")?;
        writeln!(out, "\tCreator: \"{}\"", escape(&self.creator))?;
        writeln!(out, "}}")?;

        writeln!(out, "GlobalSettings:  {{")?;
        writeln!(out, "\tVersion: 1000")?;
        writeln!(out, "\tProperties70:  {{")?;
        for (name, value) in [
            ("UpAxis", 1),
            ("UpAxisSign", 1),
            ("FrontAxis", 2),
            ("FrontAxisSign", 1),
            ("CoordAxis", 0),
            ("CoordAxisSign", 1),
        ] {
            writeln!(out, "\t\tP: \"{}\", \"int\", \"Integer\", \"\",{}", name, value)?;
        }
        writeln!(out, "\t\tP: \"UnitScaleFactor\", \"double\", \"Number\", \"\",100")?;
        writeln!(out, "\t}}")?;
        writeln!(out, "}}")?;

        writeln!(out, "Definitions:  {{")?;
        writeln!(out, "\tVersion: 100")?;
        writeln!(out, "\tCount: {}", self.models.len())?;
        writeln!(out, "\tObjectType: \"Model\" {{")?;
        writeln!(out, "\t\tCount: {}", self.models.len())?;
        writeln!(out, "\t}}")?;
        writeln!(out, "}}")?;

        writeln!(out, "Objects:  {{")?;
        for model in &self.models {
            writeln!(
                out,
                "\tModel: {}, \"Model::{}\", \"{}\" {{",
                model.id,
                escape(&model.name),
                model.kind.as_str()
            )?;
            writeln!(out, "\t\tVersion: 232")?;
            writeln!(out, "\t\tProperties70:  {{")?;
            writeln!(out, "\t\t\tP: \"RotationOrder\", \"enum\", \"\", \"\",4")?;
            write_vector(out, "Lcl Translation", model.translation)?;
            write_vector(out, "Lcl Rotation", model.rotation)?;
            write_vector(out, "Lcl Scaling", model.scaling)?;
            writeln!(out, "\t\t}}")?;
            writeln!(out, "\t\tShading: T")?;
            writeln!(out, "\t\tCulling: \"CullingOff\"")?;
            writeln!(out, "\t}}")?;
        }
        writeln!(out, "}}")?;

        writeln!(out, "Connections:  {{")?;
        for c in &self.connections {
            writeln!(
                out,
                "\t;Model::{}, Model::{}",
                escape(self.model_name(c.child)),
                escape(self.model_name(c.parent))
            )?;
            writeln!(out, "\tC: \"OO\",{},{}", c.child, c.parent)?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}

fn write_vector(out: &mut String, name: &str, v: Vec3) -> std::fmt::Result {
    writeln!(
        out,
        "\t\t\tP: \"{name}\", \"{name}\", \"\", \"A\",{:.6},{:.6},{:.6}",
        v.x, v.y, v.z
    )
}

fn escape(text: &str) -> String {
    text.replace('"', "&quot;")
}
