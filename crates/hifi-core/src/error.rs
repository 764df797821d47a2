//! Unified error handling for the HiFi exporter
//!
//! Scene loading, selection and configuration all report through this
//! error type. The export crate wraps it in its own pipeline error.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for scene and configuration operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Parse Errors ====================

    /// Unsupported description format
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat {
        extension: String,
    },

    /// Malformed scene or config document
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    // ==================== Scene Errors ====================

    /// Node id does not exist in the forest
    #[error("Node not found: {id}")]
    NodeNotFound {
        id: String,
    },

    /// Two nodes in a description share a name
    #[error("Duplicate node name: {name}")]
    DuplicateNode {
        name: String,
    },

    /// A description refers to a parent that is not declared
    #[error("Unknown parent '{parent}' for node '{node}'")]
    UnknownParent {
        node: String,
        parent: String,
    },

    /// Re-parenting would create a cycle
    #[error("Cycle detected: '{node}' cannot be parented under '{parent}'")]
    Cycle {
        node: String,
        parent: String,
    },

    /// Selected item is not an exportable node
    #[error("Invalid selection: {item} is not a scene node")]
    InvalidSelection {
        item: String,
    },

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// Create a node-not-found error
    pub fn node_not_found(id: impl std::fmt::Display) -> Self {
        Error::NodeNotFound {
            id: id.to_string(),
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::FileNotFound(_) | Error::NodeNotFound { .. } => true,
            Error::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
