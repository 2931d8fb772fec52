//! Error types for the SVR pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvrError {
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Optimization failed: {0}")]
    OptimizationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SvrError>;
