//! Job errors

use de_cad::{BuildError, CadError, ParameterError};
use de_draw::{ProjectError, RenderError};
use thiserror::Error;

/// Configuration file errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Kernel '{0}' is not compiled into this build")]
    KernelUnavailable(String),
}

/// Everything that can go wrong while decoding or running a job
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    #[error("Invalid job: {0}")]
    Decode(String),

    #[error("Unsupported operation type: {0}")]
    UnsupportedOperationType(String),

    #[error("Invalid parameter in operation {index} of SolidSpec '{solid}': {source}")]
    InvalidOperationParameter {
        solid: String,
        index: usize,
        #[source]
        source: ParameterError,
    },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Kernel(#[from] CadError),

    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to encode job output: {0}")]
    Output(String),
}

/// Result type for job operations
pub type JobResult<T> = Result<T, JobError>;
