//! Profile-independent study description handed to an assembler

use serde::{Deserialize, Serialize};
use usdm_model::{NarrativeContent, NarrativeContentItem};

/// Everything an import recovers from a protocol bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AssemblerInput {
    pub identification: Identification,
    pub compounds: Compounds,
    pub amendments_summary: AmendmentsSummary,
    pub study_design: StudyDesignInput,
    pub study: StudyInput,
    pub other: Other,
    pub document: DocumentInput,
    pub population: PopulationInput,
    pub amendments: Vec<AmendmentInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Identification {
    pub titles: Titles,
    pub identifiers: Vec<IdentifierInput>,
    /// Organizations linked as associated parties, sponsor first
    pub parties: Vec<OrganizationInput>,
    pub medical_expert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Titles {
    pub official: String,
    pub acronym: String,
    pub brief: String,
}

/// A study identifier and the organization that scopes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IdentifierInput {
    pub identifier: String,
    pub scope: Option<OrganizationInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInput {
    pub name: String,
    /// Associated party role code, `None` for regulatory authorities
    pub role: Option<String>,
    pub legal_address: Option<AddressInput>,
}

/// Address in study graph field names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub text: Option<String>,
    pub lines: Vec<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Compounds {
    pub compound_codes: String,
    pub compound_names: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AmendmentsSummary {
    pub amendment_identifier: String,
    pub amendment_scope: String,
    pub amendment_details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StudyDesignInput {
    pub label: String,
    pub trial_phase: String,
    pub trial_phase_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StudyInput {
    pub sponsor_approval_date: String,
    pub version: String,
    pub original_protocol: bool,
    pub name: StudyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StudyName {
    pub acronym: String,
    pub identifier: String,
    pub compound_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Other {
    pub confidentiality: String,
    pub regulatory_agency_identifiers: String,
}

/// The protocol narrative rebuilt as study graph content nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DocumentInput {
    pub title: String,
    pub contents: Vec<NarrativeContent>,
    pub items: Vec<NarrativeContentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PopulationInput {
    pub label: String,
    pub inclusion_exclusion: InclusionExclusion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InclusionExclusion {
    pub inclusion: Vec<String>,
    pub exclusion: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CodeInput {
    pub code: String,
    pub decode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AmendmentInput {
    pub identifier: String,
    pub summary: String,
    pub scope: String,
    pub countries: Vec<String>,
    pub regions: Vec<String>,
    pub sites: Vec<String>,
    pub primary_reason: Option<CodeInput>,
    pub secondary_reasons: Vec<CodeInput>,
    pub safety_impact: bool,
    pub safety_impact_reason: String,
    pub robustness_impact: bool,
    pub robustness_impact_reason: String,
    pub changes: Vec<ChangeInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChangeInput {
    pub summary: String,
    pub rationale: String,
    pub section_code: String,
    /// Top-level section recovered from the section code, empty when unknown
    pub section_number: String,
}
