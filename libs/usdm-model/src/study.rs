//! Study, study version and the version-level collections

use super::amendment::{GeographicScope, StudyAmendment};
use super::code::Code;
use super::ct;
use super::design::StudyDesign;
use super::document::{StudyDefinitionDocument, StudyDefinitionDocumentVersion};
use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level USDM file envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wrapper {
    pub study: Study,

    #[serde(default)]
    pub usdm_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_version: Option<String>,
}

impl Wrapper {
    /// Parse a USDM JSON document
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(Error::from)
    }
}

/// The study: a versioned tree of designs, documents and organizations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub versions: Vec<StudyVersion>,

    #[serde(default)]
    pub documented_by: Vec<StudyDefinitionDocument>,
}

impl Study {
    pub fn first_version(&self) -> Option<&StudyVersion> {
        self.versions.first()
    }

    /// Same as [`Study::first_version`] but reports a missing version as an error.
    pub fn require_first_version(&self) -> Result<&StudyVersion> {
        self.first_version().ok_or(Error::MissingVersion)
    }

    /// First version of the first protocol document
    pub fn document_version(&self) -> Option<&StudyDefinitionDocumentVersion> {
        self.documented_by
            .first()
            .and_then(|document| document.versions.first())
    }

    pub fn document(&self) -> Option<&StudyDefinitionDocument> {
        self.documented_by.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyVersion {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    #[serde(default)]
    pub titles: Vec<StudyTitle>,

    #[serde(default)]
    pub study_identifiers: Vec<StudyIdentifier>,

    #[serde(default)]
    pub organizations: Vec<Organization>,

    #[serde(default)]
    pub roles: Vec<StudyRole>,

    #[serde(default)]
    pub assigned_persons: Vec<AssignedPerson>,

    #[serde(default)]
    pub amendments: Vec<StudyAmendment>,

    #[serde(default)]
    pub study_designs: Vec<StudyDesign>,

    #[serde(default)]
    pub date_values: Vec<GovernanceDate>,

    #[serde(default)]
    pub narrative_content_items: Vec<NarrativeContentItem>,

    #[serde(default)]
    pub eligibility_criterion_items: Vec<EligibilityCriterionItem>,

    #[serde(default)]
    pub dictionaries: Vec<SyntaxTemplateDictionary>,

    #[serde(default)]
    pub document_version_ids: Vec<String>,

    #[serde(default)]
    pub extension_attributes: Vec<ExtensionAttribute>,
}

impl StudyVersion {
    fn title_of_type(&self, code: &str) -> Option<&StudyTitle> {
        self.titles.iter().find(|t| t.title_type.code == code)
    }

    pub fn official_title(&self) -> Option<&StudyTitle> {
        self.title_of_type(ct::OFFICIAL_TITLE)
    }

    /// Official title text, empty when the version has no official title
    pub fn official_title_text(&self) -> String {
        self.official_title()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    pub fn short_title(&self) -> Option<&StudyTitle> {
        self.title_of_type(ct::BRIEF_TITLE)
    }

    pub fn acronym(&self) -> Option<&StudyTitle> {
        self.title_of_type(ct::ACRONYM)
    }

    /// Organizations keyed by id
    pub fn organization_map(&self) -> HashMap<&str, &Organization> {
        self.organizations
            .iter()
            .map(|o| (o.id.as_str(), o))
            .collect()
    }

    pub fn organization(&self, id: &str) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.id == id)
    }

    /// The sponsor organization (organization type Clinical Study Sponsor)
    pub fn sponsor(&self) -> Option<&Organization> {
        self.organizations
            .iter()
            .find(|o| o.organization_type.code == ct::SPONSOR_ORGANIZATION)
            .or_else(|| self.role_organizations(ct::ROLE_SPONSOR).into_iter().next())
    }

    /// The identifier scoped by the sponsor organization
    pub fn sponsor_identifier(&self) -> Option<&StudyIdentifier> {
        let sponsor = self.sponsor()?;
        self.study_identifiers
            .iter()
            .find(|i| i.scope_id == sponsor.id)
    }

    fn identifiers_scoped_by_type(&self, type_code: &str) -> Vec<&StudyIdentifier> {
        let organizations = self.organization_map();
        self.study_identifiers
            .iter()
            .filter(|i| {
                i.scoped_by(&organizations)
                    .is_some_and(|o| o.organization_type.code == type_code)
            })
            .collect()
    }

    pub fn regulatory_identifiers(&self) -> Vec<&StudyIdentifier> {
        self.identifiers_scoped_by_type(ct::REGULATORY_AGENCY)
    }

    pub fn registry_identifiers(&self) -> Vec<&StudyIdentifier> {
        self.identifiers_scoped_by_type(ct::CLINICAL_STUDY_REGISTRY)
    }

    /// Organizations attached to a study role, matched on the role decode
    pub fn role_organizations(&self, role_decode: &str) -> Vec<&Organization> {
        self.roles
            .iter()
            .filter(|r| r.code.decode_is(role_decode))
            .flat_map(|r| r.organization_ids.iter())
            .filter_map(|id| self.organization(id))
            .collect()
    }

    /// People attached to a study role, matched on the role decode
    pub fn role_persons(&self, role_decode: &str) -> Vec<&AssignedPerson> {
        self.roles
            .iter()
            .filter(|r| r.code.decode_is(role_decode))
            .flat_map(|r| r.assigned_person_ids.iter())
            .filter_map(|id| self.assigned_persons.iter().find(|p| &p.id == id))
            .collect()
    }

    pub fn first_amendment(&self) -> Option<&StudyAmendment> {
        self.amendments.first()
    }

    /// A version without amendments is the original protocol
    pub fn original_version(&self) -> bool {
        self.amendments.is_empty()
    }

    pub fn approval_date(&self) -> Option<&GovernanceDate> {
        self.date_values
            .iter()
            .find(|d| d.date_type.code == ct::SPONSOR_APPROVAL_DATE)
    }

    pub fn approval_date_value(&self) -> Option<&str> {
        self.approval_date()
            .map(|d| d.date_value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn confidentiality_statement(&self) -> Option<&str> {
        self.extension_attributes
            .iter()
            .find(|e| e.url == ct::CONFIDENTIALITY_STATEMENT_URL)
            .and_then(|e| e.value_string.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn narrative_content_item(&self, id: &str) -> Option<&NarrativeContentItem> {
        self.narrative_content_items.iter().find(|i| i.id == id)
    }

    pub fn eligibility_criterion_item(&self, id: &str) -> Option<&EligibilityCriterionItem> {
        self.eligibility_criterion_items.iter().find(|i| i.id == id)
    }

    pub fn dictionary(&self, id: &str) -> Option<&SyntaxTemplateDictionary> {
        self.dictionaries.iter().find(|d| d.id == id)
    }

    /// Study site managed by any of the version's organizations
    pub fn site(&self, id: &str) -> Option<&StudySite> {
        self.organizations
            .iter()
            .flat_map(|o| o.managed_sites.iter())
            .find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyTitle {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(rename = "type")]
    pub title_type: Code,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyIdentifier {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub scope_id: String,
}

impl StudyIdentifier {
    /// Organization that issued the identifier
    pub fn scoped_by<'a>(
        &self,
        organizations: &HashMap<&str, &'a Organization>,
    ) -> Option<&'a Organization> {
        organizations.get(self.scope_id.as_str()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type", default)]
    pub organization_type: Code,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub identifier_scheme: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_address: Option<Address>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_sites: Vec<StudySite>,
}

impl Organization {
    /// Label when present, otherwise the name
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudySite {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub lines: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Code>,
}

impl Address {
    /// True when no address field carries a value
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.text)
            && self.lines.iter().all(|line| line.trim().is_empty())
            && blank(&self.city)
            && blank(&self.district)
            && blank(&self.state)
            && blank(&self.postal_code)
            && self.country.as_ref().map_or(true, |c| c.decode.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyRole {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub code: Code,

    #[serde(default)]
    pub organization_ids: Vec<String>,

    #[serde(default)]
    pub assigned_person_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssignedPerson {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceDate {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub date_type: Code,

    #[serde(default)]
    pub date_value: String,

    #[serde(default)]
    pub geographic_scopes: Vec<GeographicScope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeContentItem {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriterionItem {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTemplateDictionary {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub parameter_maps: Vec<ParameterMap>,
}

impl SyntaxTemplateDictionary {
    pub fn reference_for(&self, tag: &str) -> Option<&str> {
        self.parameter_maps
            .iter()
            .find(|m| m.tag == tag)
            .map(|m| m.reference.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMap {
    #[serde(default)]
    pub id: String,

    pub tag: String,

    #[serde(default)]
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionAttribute {
    #[serde(default)]
    pub id: String,

    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}
