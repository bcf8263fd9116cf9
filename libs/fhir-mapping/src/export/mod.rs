//! Export orchestration: study graph to FHIR bundle
//!
//! [`Export`] is bound to one [`Profile`]. Every call builds its own
//! [`Diagnostics`], id generator and text resolver, walks the first study
//! version in a fixed order and returns an [`ExportOutcome`]. Failures never
//! escape as errors; they leave the message empty and are explained by the
//! diagnostics.

mod amendment;
mod eligibility;
mod narrative;
mod protocol;
mod research_study;
mod soa;

pub use soa::SoaExport;

use crate::diagnostics::{Diagnostics, Location};
use crate::error::{ExportError, Result};
use crate::extra::Extra;
use crate::ids::{IdGenerator, IdStrategy};
use crate::profile::Profile;
use crate::resolver::{PassThrough, TagReferenceResolver, TextResolver};
use chrono::{DateTime, SecondsFormat, Utc};
use usdm_fhir_models::Bundle;
use usdm_model::{Study, StudyDefinitionDocumentVersion, StudyDesign, StudyVersion};

const MODULE: &str = "export";

/// Knobs for one export call
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub ids: IdStrategy,
    /// Fixed composition date and bundle timestamp; the current time when unset
    pub timestamp: Option<DateTime<Utc>>,
    /// Resolve `usdm:ref`/`usdm:tag` markup in narrative and criterion text
    pub resolve_references: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            ids: IdStrategy::Random,
            timestamp: None,
            resolve_references: true,
        }
    }
}

impl ExportOptions {
    /// Sequential ids and a fixed timestamp, for reproducible output
    pub fn deterministic(timestamp: DateTime<Utc>) -> Self {
        Self {
            ids: IdStrategy::Sequential,
            timestamp: Some(timestamp),
            resolve_references: true,
        }
    }
}

/// Result of an export call
#[derive(Debug)]
pub struct ExportOutcome {
    /// Serialized bundle, `None` when the export failed
    pub message: Option<String>,
    pub diagnostics: Diagnostics,
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        self.message.is_some()
    }

    /// The message parsed back into a bundle
    pub fn bundle(&self) -> Option<Bundle> {
        self.message
            .as_deref()
            .and_then(|m| serde_json::from_str(m).ok())
    }
}

/// Profile-bound exporter
#[derive(Debug, Clone)]
pub struct Export {
    profile: Profile,
    options: ExportOptions,
}

impl Export {
    pub fn new(profile: Profile) -> Self {
        Self::with_options(profile, ExportOptions::default())
    }

    pub fn with_options(profile: Profile, options: ExportOptions) -> Self {
        Self { profile, options }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Export the study's first version as a transaction bundle
    pub fn export(&self, study: &Study, extra: &Extra) -> ExportOutcome {
        tracing::info!(profile = %self.profile, study = %study.name, "Exporting study");
        let mut ctx = match ExportContext::new(study, extra, &self.options) {
            Ok(ctx) => ctx,
            Err(err) => return failed(err, Diagnostics::new()),
        };
        let bundle = protocol::to_bundle(&mut ctx, self.profile.rules());
        finish(bundle, ctx.diagnostics)
    }
}

pub(crate) fn finish(bundle: Result<Bundle>, diagnostics: Diagnostics) -> ExportOutcome {
    match bundle.and_then(|b| serde_json::to_string_pretty(&b).map_err(ExportError::from)) {
        Ok(message) => {
            tracing::info!(
                errors = diagnostics.error_count(),
                warnings = diagnostics.count(crate::diagnostics::Severity::Warning),
                "Export complete"
            );
            ExportOutcome {
                message: Some(message),
                diagnostics,
            }
        }
        Err(err) => failed(err, diagnostics),
    }
}

fn failed(err: ExportError, mut diagnostics: Diagnostics) -> ExportOutcome {
    diagnostics.exception(
        "Exception raised generating FHIR content",
        Location::new(MODULE, "export"),
        &err,
    );
    ExportOutcome {
        message: None,
        diagnostics,
    }
}

/// State shared by the steps of one export call
pub(crate) struct ExportContext<'a> {
    pub study: &'a Study,
    pub version: &'a StudyVersion,
    pub design: &'a StudyDesign,
    pub document: Option<&'a StudyDefinitionDocumentVersion>,
    pub extra: &'a Extra,
    pub ids: IdGenerator,
    pub timestamp: String,
    pub resolver: Box<dyn TextResolver + 'a>,
    pub diagnostics: Diagnostics,
}

impl<'a> ExportContext<'a> {
    pub fn new(study: &'a Study, extra: &'a Extra, options: &ExportOptions) -> Result<Self> {
        let version = study.first_version().ok_or(ExportError::MissingVersion)?;
        let design = version
            .study_designs
            .first()
            .ok_or(ExportError::MissingStudyDesign)?;
        let resolver: Box<dyn TextResolver> = if options.resolve_references {
            Box::new(TagReferenceResolver::new(study))
        } else {
            Box::new(PassThrough)
        };
        let timestamp = options
            .timestamp
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        Ok(Self {
            study,
            version,
            design,
            document: study.document_version(),
            extra,
            ids: IdGenerator::new(options.ids),
            timestamp,
            resolver,
            diagnostics: Diagnostics::new(),
        })
    }

    pub fn require_document(&self) -> Result<&'a StudyDefinitionDocumentVersion> {
        self.document.ok_or(ExportError::MissingDocument)
    }
}
