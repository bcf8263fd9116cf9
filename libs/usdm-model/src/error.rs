//! Error types for USDM models

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid USDM document: {0}")]
    InvalidDocument(String),

    #[error("Study has no versions")]
    MissingVersion,

    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
