//! FHIR data models
//!
//! This crate provides strongly-typed Rust structures for the FHIR resources
//! produced and consumed by the USDM protocol mapping.
//!
//! # Module Organization
//!
//! - `common`: Version-agnostic data types, the `Resource` trait and `Bundle`
//! - `r5`: R5 resource shapes (ResearchStudy, Organization, Practitioner,
//!   Composition, Group, PlanDefinition, ActivityDefinition)
//!
//! # Design Philosophy
//!
//! - **Shape checked by serde**: required fields are non-optional, so a
//!   resource that deserializes is structurally valid
//! - **Stable containers**: list fields that consumers append to are always
//!   serialized, even when empty
//! - **Compatible**: bundle entries keep resources as `serde_json::Value`
//!
//! # Example
//!
//! ```rust
//! use usdm_fhir_models::{Bundle, BundleType, Organization, Resource};
//! use serde_json::json;
//!
//! let org: Organization = serde_json::from_value(json!({
//!     "resourceType": "Organization",
//!     "id": "org-1",
//!     "name": "ACME Pharma"
//! }))
//! .unwrap();
//!
//! let mut bundle = Bundle::new(BundleType::Transaction);
//! bundle.put(&org, "urn:uuid:org-1").unwrap();
//! assert_eq!(org.reference().unwrap(), "Organization/org-1");
//! assert_eq!(bundle.entry_count(), 1);
//! ```

pub mod common;
pub mod r5;

// Re-export commonly used types
pub use common::*;
pub use r5::*;
