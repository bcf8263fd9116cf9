//! Export "extra" mapping: protocol fields the study graph does not carry
//!
//! Every key is optional; missing keys read as empty.

use crate::error::ExtraError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Extra {
    pub title_page: TitlePage,
    pub amendment: AmendmentExtra,
    pub miscellaneous: Miscellaneous,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TitlePage {
    pub compound_codes: String,
    pub compound_names: String,
    pub amendment_identifier: String,
    pub sponsor_confidentiality: String,
    pub regulatory_agency_identifiers: String,
    pub amendment_details: String,
    /// Overrides the derived amendment scope code when set
    pub amendment_scope: String,
    pub manufacturer_name_and_address: String,
    pub medical_expert_contact: String,
    /// "Yes" / "No"; derived from the amendment history when empty
    pub original_protocol: String,
    pub sae_reporting_method: String,
    pub sponsor_approval_date: String,
    pub sponsor_name_and_address: String,
    pub sponsor_signatory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AmendmentExtra {
    pub amendment_details: String,
    pub robustness_impact: bool,
    pub robustness_impact_reason: String,
    pub safety_impact: bool,
    pub safety_impact_reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Miscellaneous {
    pub medical_expert_contact: String,
    pub sae_reporting_method: String,
    pub sponsor_signatory: String,
}

impl Extra {
    pub fn from_yaml(data: &str) -> Result<Self, ExtraError> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn from_json(data: &str) -> Result<Self, ExtraError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Original protocol flag from the title page, when it says yes or no
    pub fn original_protocol(&self) -> Option<bool> {
        match self.title_page.original_protocol.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Some(true),
            "no" | "n" | "false" => Some(false),
            _ => None,
        }
    }

    /// Medical expert contact, from either the title page or miscellaneous
    pub fn medical_expert_contact(&self) -> Option<&str> {
        [
            self.miscellaneous.medical_expert_contact.as_str(),
            self.title_page.medical_expert_contact.as_str(),
        ]
        .into_iter()
        .find(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml() {
        let extra = Extra::from_yaml(
            "title_page:\n  original_protocol: 'No'\n  amendment_scope: C217026\namendment:\n  safety_impact: true\n",
        )
        .unwrap();
        assert_eq!(extra.original_protocol(), Some(false));
        assert_eq!(extra.title_page.amendment_scope, "C217026");
        assert!(extra.amendment.safety_impact);
        assert!(extra.miscellaneous.sponsor_signatory.is_empty());
    }

    #[test]
    fn test_empty_json() {
        let extra = Extra::from_json("{}").unwrap();
        assert_eq!(extra, Extra::default());
        assert_eq!(extra.original_protocol(), None);
        assert_eq!(extra.medical_expert_contact(), None);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Extra::from_yaml("title_page: [1, 2").is_err());
    }
}
