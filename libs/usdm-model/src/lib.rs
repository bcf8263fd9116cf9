//! USDM study graph models
//!
//! This crate provides strongly-typed, read-only Rust structures for the
//! USDM (Unified Study Definitions Model) study graph consumed by the FHIR
//! mapping engine.
//!
//! # Module Organization
//!
//! - `code`: Coded values (`Code`, `AliasCode`)
//! - `ct`: Controlled terminology constants used to classify instances
//! - `study`: `Study`, `StudyVersion` and the version-level collections
//! - `amendment`: Amendment history (reasons, impacts, scopes, changes)
//! - `design`: Study designs, populations, criteria and schedules
//! - `document`: Protocol documents and the linked narrative content list
//!
//! # Example
//!
//! ```rust
//! use usdm_model::Wrapper;
//! use serde_json::json;
//!
//! let wrapper: Wrapper = serde_json::from_value(json!({
//!     "study": {
//!         "id": "study-1",
//!         "name": "PILOT",
//!         "versions": [{ "id": "sv-1", "versionIdentifier": "2" }]
//!     },
//!     "usdmVersion": "4.0.0"
//! }))
//! .unwrap();
//!
//! let version = wrapper.study.first_version().unwrap();
//! assert_eq!(version.version_identifier.as_deref(), Some("2"));
//! ```

pub mod amendment;
pub mod code;
pub mod ct;
pub mod design;
pub mod document;
pub mod error;
pub mod study;

pub use amendment::*;
pub use code::{AliasCode, Code};
pub use design::*;
pub use document::*;
pub use error::{Error, Result};
pub use study::*;
