//! Composition resource (R5)

use crate::common::complex::{CodeableConcept, Extension, Meta, Narrative, Reference};
use crate::fhir_resource;
use serde::{Deserialize, Serialize};

/// A set of healthcare-related information assembled into a single logical
/// package, organised as a tree of sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    /// registered | partial | preliminary | final | amended | ...
    pub status: String,

    #[serde(rename = "type")]
    pub type_: CodeableConcept,

    pub date: String,

    pub author: Vec<Reference>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<CompositionSection>,
}

fhir_resource!(Composition, default_resource_type);

/// Composition is broken into sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompositionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section: Vec<CompositionSection>,
}

impl CompositionSection {
    /// Text of the section code, empty when absent
    pub fn code_text(&self) -> &str {
        self.code
            .as_ref()
            .and_then(|c| c.text.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_sections() {
        let composition: Composition = serde_json::from_value(json!({
            "resourceType": "Composition",
            "id": "c1",
            "status": "preliminary",
            "type": {"text": "EvidenceReport"},
            "date": "2024-01-01T00:00:00Z",
            "author": [{"display": "USDM"}],
            "title": "Protocol",
            "section": [{
                "title": "Introduction",
                "code": {"text": "section1-introduction"},
                "section": [{"title": "Background", "code": {"text": "section1.1-background"}}]
            }]
        }))
        .unwrap();
        assert_eq!(composition.section[0].code_text(), "section1-introduction");
        assert_eq!(composition.section[0].section.len(), 1);
        assert!(composition.section[0].text.is_none());
    }

    #[test]
    fn test_required_fields() {
        let result: Result<Composition, _> = serde_json::from_value(json!({
            "resourceType": "Composition",
            "status": "preliminary",
            "date": "2024-01-01T00:00:00Z",
            "author": [],
            "title": "Protocol"
        }));
        assert!(result.is_err());
    }
}
