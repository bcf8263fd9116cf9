//! Import orchestration: FHIR bundle to study graph
//!
//! [`Import`] parses a message, indexes the bundle once and extracts a
//! profile-independent [`AssemblerInput`]. Turning that input into a study
//! graph is the job of an [`Assembler`], which may be asynchronous.

mod extract;
mod index;
mod input;

pub use index::{BundleIndex, ExtensionIndex};
pub use input::*;

use crate::diagnostics::{Diagnostics, Location};
use crate::error::ImportError;
use crate::extra::Extra;
use crate::profile::Profile;
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use usdm_fhir_models::{Bundle, BundleEntry, BundleType};

const MODULE: &str = "import";

/// Builds the caller's study representation from extracted input
#[async_trait]
pub trait Assembler: Send {
    type Output: Send;

    async fn assemble(
        &mut self,
        input: AssemblerInput,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self::Output, Box<dyn Error + Send + Sync>>;
}

/// Assembler that hands the input back as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAssembler;

#[async_trait]
impl Assembler for JsonAssembler {
    type Output = Value;

    async fn assemble(
        &mut self,
        input: AssemblerInput,
        _diagnostics: &mut Diagnostics,
    ) -> Result<Value, Box<dyn Error + Send + Sync>> {
        Ok(serde_json::to_value(input)?)
    }
}

/// Result of an import call
#[derive(Debug)]
pub struct ImportOutcome<T> {
    /// `None` when the import failed
    pub value: Option<T>,
    pub diagnostics: Diagnostics,
    /// Protocol fields recovered for a later export
    pub extra: Extra,
}

impl<T> ImportOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.value.is_some()
    }

    fn failed(err: ImportError, mut diagnostics: Diagnostics) -> Self {
        diagnostics.exception(
            "Exception raised parsing FHIR content",
            Location::new(MODULE, "import"),
            &err,
        );
        Self {
            value: None,
            diagnostics,
            extra: Extra::default(),
        }
    }
}

/// Profile-bound importer
#[derive(Debug, Clone, Copy)]
pub struct Import {
    profile: Profile,
}

impl Import {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Parse `message` and extract the assembler input without assembling
    pub fn extract(&self, message: &str) -> ImportOutcome<AssemblerInput> {
        tracing::info!(profile = %self.profile, bytes = message.len(), "Importing message");
        let mut diagnostics = Diagnostics::new();
        let bundle = match parse(message) {
            Ok(bundle) => bundle,
            Err(err) => return ImportOutcome::failed(err, diagnostics),
        };
        match extract::extract(&bundle, self.profile.rules(), &mut diagnostics) {
            Ok((input, extra)) => {
                tracing::info!(
                    sections = input.document.contents.len(),
                    warnings = diagnostics.count(crate::diagnostics::Severity::Warning),
                    "Import complete"
                );
                ImportOutcome {
                    value: Some(input),
                    diagnostics,
                    extra,
                }
            }
            Err(err) => ImportOutcome::failed(err, diagnostics),
        }
    }

    /// Parse `message`, extract and hand the input to `assembler`
    pub async fn from_message<A: Assembler>(
        &self,
        message: &str,
        assembler: &mut A,
    ) -> ImportOutcome<A::Output> {
        let ImportOutcome {
            value,
            mut diagnostics,
            extra,
        } = self.extract(message);
        let Some(input) = value else {
            return ImportOutcome {
                value: None,
                diagnostics,
                extra,
            };
        };
        match assembler.assemble(input, &mut diagnostics).await {
            Ok(output) => ImportOutcome {
                value: Some(output),
                diagnostics,
                extra,
            },
            Err(err) => {
                let mut outcome = ImportOutcome::failed(
                    ImportError::Assembler(err.to_string()),
                    diagnostics,
                );
                outcome.extra = extra;
                outcome
            }
        }
    }
}

/// Bundle from a message; a lone resource is wrapped in a collection bundle
fn parse(message: &str) -> Result<Bundle, ImportError> {
    let value: Value = serde_json::from_str(message).map_err(ImportError::InvalidBundle)?;
    if value.get("resourceType").and_then(Value::as_str) == Some("Bundle") {
        return serde_json::from_value(value).map_err(ImportError::InvalidBundle);
    }
    let mut bundle = Bundle::new(BundleType::Collection);
    bundle.add_entry(BundleEntry {
        full_url: None,
        resource: Some(value),
        request: None,
        extensions: Default::default(),
    });
    Ok(bundle)
}
