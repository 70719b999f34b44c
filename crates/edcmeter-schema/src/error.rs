use crate::boundary::Boundary;

/// Errors that can occur during schema validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The envelope failed schema validation.
    #[error("{boundary} envelope rejected: {message}")]
    ValidationFailed { boundary: Boundary, message: String },

    /// The envelope is not valid JSON.
    #[error("envelope is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// No schema registered for the given boundary.
    #[error("no schema registered for {0} envelopes")]
    NoSchema(Boundary),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
