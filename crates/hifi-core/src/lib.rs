//! HiFi Exporter Core Library
//!
//! This crate provides the math types, identifiers, error handling and the
//! dialog abstraction shared by the scene and export crates.

pub mod error;
pub mod prompt;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use prompt::{Notice, Prompt, ScriptedPrompt};
pub use types::*;
