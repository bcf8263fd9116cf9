//! Group resource (R5)

use crate::common::complex::{CodeableConcept, Extension};
use crate::fhir_resource;
use serde::{Deserialize, Serialize};

/// A defined collection of entities, here used definitionally to carry
/// eligibility criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// person | animal | practitioner | device | ...
    #[serde(rename = "type")]
    pub type_: String,

    /// definitional | enumerated
    pub membership: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub characteristic: Vec<GroupCharacteristic>,
}

fhir_resource!(Group, default_resource_type);

/// Include / Exclude group members by Trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCharacteristic {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    pub code: CodeableConcept,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    pub exclude: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exclude_required() {
        let result: Result<GroupCharacteristic, _> =
            serde_json::from_value(json!({"code": {"text": "x"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_group_roundtrip_keeps_order() {
        let value = json!({
            "resourceType": "Group",
            "id": "g1",
            "type": "person",
            "membership": "definitional",
            "characteristic": [
                {"code": {"text": "Inclusion"}, "valueCodeableConcept": {"text": "I1"}, "exclude": false},
                {"code": {"text": "Exclusion"}, "valueCodeableConcept": {"text": "E1"}, "exclude": true}
            ]
        });
        let group: Group = serde_json::from_value(value.clone()).unwrap();
        assert!(group.characteristic[1].exclude);
        assert_eq!(serde_json::to_value(&group).unwrap(), value);
    }
}
