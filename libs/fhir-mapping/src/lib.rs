//! USDM protocol to FHIR mapping engine
//!
//! Exports a USDM study graph as a FHIR transaction bundle for the Madrid,
//! PRISM2 or PRISM3 protocol profile, exports a schedule of activities, and
//! imports such bundles back into a profile-independent study description.
//!
//! # Module Organization
//!
//! - `export`: Profile-bound [`Export`] and the schedule of activities [`SoaExport`]
//! - `import`: Profile-bound [`Import`], the bundle index and [`import::Assembler`]
//! - `factory`: Generic resource builders shared by every orchestrator
//! - `narrative`: Narrative content list to composition sections and back
//! - `resolver`: Reference and tag resolution in narrative text
//! - `diagnostics`: Per-call diagnostics sink
//! - `profile`: Supported profiles and their rules
//! - `extra`: Protocol fields supplied alongside the study graph
//! - `vocab`: Extension urls, code systems and NCI codes
//!
//! # Example
//!
//! ```rust,no_run
//! use usdm_fhir::{Export, Extra, Import, Profile};
//! use usdm_model::Wrapper;
//!
//! let json = std::fs::read_to_string("study.json").unwrap();
//! let wrapper: Wrapper = serde_json::from_str(&json).unwrap();
//!
//! let outcome = Export::new(Profile::Prism3).export(&wrapper.study, &Extra::default());
//! for entry in outcome.diagnostics.entries() {
//!     println!("{}", entry);
//! }
//!
//! if let Some(message) = outcome.message {
//!     let imported = Import::new(Profile::Prism3).extract(&message);
//!     assert!(imported.is_success());
//! }
//! ```

pub mod diagnostics;
pub mod error;
pub mod export;
pub mod extra;
pub mod factory;
pub mod ids;
pub mod import;
pub mod narrative;
pub mod profile;
pub mod resolver;
pub mod utils;
pub mod vocab;

pub use diagnostics::{Diagnostic, Diagnostics, Location, Severity};
pub use error::{BuildError, ExportError, ImportError, ProfileError};
pub use export::{Export, ExportOptions, ExportOutcome, SoaExport};
pub use extra::Extra;
pub use import::{AssemblerInput, Import, ImportOutcome, JsonAssembler};
pub use profile::{Profile, ProfileRules};
