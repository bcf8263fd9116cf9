//! Version-agnostic FHIR models
//!
//! Data types and the Bundle container shared by every resource

pub mod bundle;
pub mod complex;
pub mod error;
pub mod resource;

// Re-export commonly used types
pub use bundle::*;
pub use complex::*;
pub use error::{Error, Result};
pub use resource::Resource;
