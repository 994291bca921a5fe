//! Error types for isoflow

use thiserror::Error;

/// Main error type for isoflow operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Component {component} out of range for a field with {components} component(s)")]
    ComponentOutOfRange { component: usize, components: usize },

    #[error("Output capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Contouring cancelled")]
    Cancelled,

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for isoflow operations
pub type Result<T> = std::result::Result<T, Error>;
