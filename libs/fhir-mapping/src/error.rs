//! Error types for the mapping engine
//!
//! None of these cross the public `export`/`import` entry points; they are
//! converted into diagnostics plus an empty payload there.

use thiserror::Error;

/// Failure to construct one resource or sub-structure
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("missing required field '{field}' for {target}")]
    MissingField {
        target: &'static str,
        field: String,
    },

    #[error("{target} rejected the supplied fields")]
    Shape {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid input for {target}: {reason}")]
    Invalid {
        target: &'static str,
        reason: String,
    },

    #[error("unexpected failure building {target}: {reason}")]
    Unexpected {
        target: &'static str,
        reason: String,
    },
}

/// Failure of a whole export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("study has no versions")]
    MissingVersion,

    #[error("study version has no study design")]
    MissingStudyDesign,

    #[error("study has no protocol document version")]
    MissingDocument,

    #[error("timeline '{0}' not found")]
    TimelineNotFound(String),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Model(#[from] usdm_fhir_models::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a whole import
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("message is not a valid bundle: {0}")]
    InvalidBundle(#[source] serde_json::Error),

    #[error("no ResearchStudy resource in the bundle")]
    MissingResearchStudy,

    #[error("assembler failed: {0}")]
    Assembler(String),
}

/// Unknown profile name
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unsupported profile '{0}', expected one of madrid, prism2, prism3")]
pub struct ProfileError(pub String);

/// Failure loading the export extra configuration
#[derive(Error, Debug)]
pub enum ExtraError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
