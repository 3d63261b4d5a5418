//! Error types for cellview-rs.

use thiserror::Error;

/// The main error type for cellview-rs operations.
#[derive(Error, Debug)]
pub enum CellviewError {
    /// The viewer has not finished initializing.
    #[error("viewer not initialized - await ViewerModel::init() first")]
    NotInitialized,

    /// The viewer has already been initialized.
    #[error("viewer already initialized")]
    AlreadyInitialized,

    /// A view with the given id already exists in the collection.
    #[error("view '{0}' already exists")]
    ViewExists(String),

    /// A view with the given id was not found in the collection.
    #[error("view '{0}' not found")]
    ViewNotFound(String),

    /// A reorder index fell outside the collection bounds.
    #[error("index {index} out of range for collection of {len} views")]
    IndexOutOfRange { index: usize, len: usize },

    /// The engine produced no image when asked for a canvas capture.
    #[error("no image produced by canvas capture")]
    NoImage,

    /// The captured image asset has no backing file to materialize.
    #[error("image asset has no backing file")]
    NoBackingFile,

    /// The engine reported a failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// A persistence-layer failure.
    #[error("store error: {0}")]
    Store(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for cellview-rs operations.
pub type Result<T> = std::result::Result<T, CellviewError>;
