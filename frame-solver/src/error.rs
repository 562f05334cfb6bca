//! Error types for the frame solver

use thiserror::Error;

/// Main error type for frame analysis operations
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Node '{0}' not found in model")]
    NodeNotFound(String),

    #[error("Member '{0}' not found in model")]
    MemberNotFound(String),

    #[error("Material '{0}' not found in model")]
    MaterialNotFound(String),

    #[error("Section '{0}' not found in model")]
    SectionNotFound(String),

    #[error("Load combination '{0}' not found")]
    LoadCombinationNotFound(String),

    #[error("Load case '{0}' not found in model")]
    LoadCaseNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Model is unstable at node '{node}' ({dof})")]
    Unstable { node: String, dof: &'static str },

    #[error("Singular stiffness matrix - model may be unstable or have insufficient supports")]
    SingularMatrix,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not analyzed - run analyze() first")]
    NotAnalyzed,

    #[error("Results are stale - the model changed after the last analysis")]
    StaleResults,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FrameError {
    /// True for errors raised because the structure cannot carry load
    pub fn is_instability(&self) -> bool {
        matches!(self, Self::Unstable { .. } | Self::SingularMatrix)
    }
}

/// Result type for frame analysis operations
pub type FrameResult<T> = Result<T, FrameError>;
