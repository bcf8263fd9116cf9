//! Amendment history

use super::code::{AliasCode, Code};
use super::ct;
use super::study::GovernanceDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyAmendment {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub number: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_reason: Option<StudyAmendmentReason>,

    #[serde(default)]
    pub secondary_reasons: Vec<StudyAmendmentReason>,

    #[serde(default)]
    pub impacts: Vec<StudyAmendmentImpact>,

    #[serde(default)]
    pub geographic_scopes: Vec<GeographicScope>,

    #[serde(default)]
    pub enrollments: Vec<SubjectEnrollment>,

    #[serde(default)]
    pub changes: Vec<StudyChange>,

    #[serde(default)]
    pub date_values: Vec<GovernanceDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
}

impl StudyAmendment {
    /// Geographic scopes other than the global scope
    pub fn local_scopes(&self) -> impl Iterator<Item = &GeographicScope> {
        self.geographic_scopes.iter().filter(|s| !s.is_global())
    }

    /// Site ids the amendment enrolls into
    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.enrollments
            .iter()
            .filter_map(|e| e.for_study_site_id.as_deref())
    }

    /// The amendment applies globally unless it names countries, regions or sites
    pub fn is_global(&self) -> bool {
        self.local_scopes().next().is_none() && self.site_ids().next().is_none()
    }

    /// First impact whose type decode mentions `keyword`
    pub fn impact(&self, keyword: &str) -> Option<&StudyAmendmentImpact> {
        let keyword = keyword.to_lowercase();
        self.impacts
            .iter()
            .find(|i| i.impact_type.decode.to_lowercase().contains(&keyword))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyAmendmentReason {
    #[serde(default)]
    pub id: String,

    pub code: Code,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyAmendmentImpact {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub impact_type: Code,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub is_substantial: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeographicScope {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub scope_type: Code,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<AliasCode>,
}

impl GeographicScope {
    pub fn is_global(&self) -> bool {
        self.scope_type.code == ct::GLOBAL_SCOPE
    }

    pub fn is_country(&self) -> bool {
        self.scope_type.code == ct::COUNTRY_SCOPE
    }

    pub fn is_region(&self) -> bool {
        self.scope_type.code == ct::REGION_SCOPE
    }

    /// The country or region code, if any
    pub fn value_code(&self) -> Option<&str> {
        self.code
            .as_ref()
            .map(|c| c.standard_code.code.as_str())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEnrollment {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_geographic_scope: Option<GeographicScope>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_study_site_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyChange {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub rationale: String,

    #[serde(default)]
    pub changed_sections: Vec<DocumentContentReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContentReference {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub section_number: String,

    #[serde(default)]
    pub section_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_id: Option<String>,
}
