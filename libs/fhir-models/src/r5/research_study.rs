//! ResearchStudy resource (R5)

use crate::common::complex::{CodeableConcept, Extension, Identifier, Meta, Reference};
use crate::fhir_resource;
use serde::{Deserialize, Serialize};

/// A scientific study of nature that sometimes includes processes involved in
/// health and disease.
///
/// The list containers are always serialized, even when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchStudy {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default)]
    pub extension: Vec<Extension>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub label: Vec<ResearchStudyLabel>,

    #[serde(default)]
    pub protocol: Vec<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// draft | active | retired | unknown
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub associated_party: Vec<ResearchStudyAssociatedParty>,

    #[serde(default)]
    pub progress_status: Vec<ResearchStudyProgressStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruitment: Option<ResearchStudyRecruitment>,
}

fhir_resource!(ResearchStudy, default_resource_type);

impl ResearchStudy {
    /// Label whose type carries `code`
    pub fn label_value(&self, code: &str) -> Option<&str> {
        self.label
            .iter()
            .find(|l| l.type_.as_ref().is_some_and(|t| t.has_code(code)))
            .and_then(|l| l.value.as_deref())
    }

    /// Identifier whose type carries `code`
    pub fn identifier_of_type(&self, code: &str) -> Option<&Identifier> {
        self.identifier.iter().find(|i| i.is_type(code))
    }
}

/// Additional names for the study
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResearchStudyLabel {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Sponsors, collaborators, and other parties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResearchStudyAssociatedParty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub role: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<Reference>,
}

/// Status of the study over time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResearchStudyProgressStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<bool>,
}

/// Target or actual group of participants enrolled in study
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResearchStudyRecruitment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_number: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Resource;
    use serde_json::json;

    #[test]
    fn test_empty_containers_serialized() {
        let study: ResearchStudy = serde_json::from_value(json!({
            "resourceType": "ResearchStudy",
            "id": "rs-1",
            "status": "active"
        }))
        .unwrap();
        let json = serde_json::to_value(&study).unwrap();
        assert_eq!(json["identifier"], json!([]));
        assert_eq!(json["extension"], json!([]));
        assert_eq!(json["label"], json!([]));
        assert_eq!(json["associatedParty"], json!([]));
        assert_eq!(study.reference().unwrap(), "ResearchStudy/rs-1");
    }

    #[test]
    fn test_status_required() {
        let result: Result<ResearchStudy, _> =
            serde_json::from_value(json!({"resourceType": "ResearchStudy", "id": "rs-1"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_label_lookup() {
        let study: ResearchStudy = serde_json::from_value(json!({
            "resourceType": "ResearchStudy",
            "status": "active",
            "label": [
                {"type": {"coding": [{"code": "C207646"}]}, "value": "TST"}
            ]
        }))
        .unwrap();
        assert_eq!(study.label_value("C207646"), Some("TST"));
        assert_eq!(study.label_value("C207615"), None);
    }

    #[test]
    fn test_wrong_resource_type_rejected() {
        let value = json!({"resourceType": "Organization", "id": "x"});
        assert!(ResearchStudy::from_resource_value(&value).is_err());
    }
}
