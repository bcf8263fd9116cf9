//! FHIR R5 resources used by the protocol profiles

pub mod composition;
pub mod group;
pub mod organization;
pub mod plan_definition;
pub mod research_study;

pub use composition::*;
pub use group::*;
pub use organization::*;
pub use plan_definition::*;
pub use research_study::*;
