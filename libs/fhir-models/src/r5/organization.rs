//! Organization and Practitioner resources (R5)

use crate::common::complex::{Address, ExtendedContactDetail, Extension, HumanName, Identifier};
use crate::fhir_resource;
use serde::{Deserialize, Serialize};

/// A formally or informally recognized grouping of people or organizations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default = "default_organization_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<ExtendedContactDetail>,
}

fhir_resource!(Organization, default_organization_type);

impl Organization {
    /// Address of the first contact, if any
    pub fn address(&self) -> Option<&Address> {
        self.contact.first().and_then(|c| c.address.as_ref())
    }
}

/// A person with a formal responsibility in the provisioning of healthcare
/// or research
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    #[serde(default = "default_practitioner_type")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,
}

fhir_resource!(Practitioner, default_practitioner_type);

impl Practitioner {
    /// Text of the first name, if any
    pub fn name_text(&self) -> Option<&str> {
        self.name.first().and_then(|n| n.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_organization_address() {
        let org: Organization = serde_json::from_value(json!({
            "resourceType": "Organization",
            "id": "o1",
            "name": "ACME",
            "contact": [{"address": {"line": ["1 Main St"], "city": "Basel", "country": "Switzerland"}}]
        }))
        .unwrap();
        let address = org.address().unwrap();
        assert_eq!(address.city.as_deref(), Some("Basel"));
        assert_eq!(address.line, vec!["1 Main St"]);
    }

    #[test]
    fn test_practitioner_default_type() {
        let p: Practitioner =
            serde_json::from_value(json!({"id": "p1", "name": [{"text": "Dr Who"}]})).unwrap();
        assert_eq!(p.resource_type, "Practitioner");
        assert_eq!(p.name_text(), Some("Dr Who"));
    }
}
