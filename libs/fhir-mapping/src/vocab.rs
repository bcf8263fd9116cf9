//! Controlled vocabularies and fixed urls that are part of the wire contract

use phf::phf_map;

pub const NCI_CODE_SYSTEM: &str = "http://ncicb.nci.nih.gov/xml/owl/EVS/Thesaurus.owl";

/// Base of the pharmaceutical research protocol profiles
pub const UDP_BASE: &str = "http://hl7.org/fhir/uv/pharmaceutical-research-protocol";

pub const RESEARCH_STUDY_PROFILE: &str = "http://hl7.org/fhir/uv/pharmaceutical-research-protocol/StructureDefinition/m11-research-study-profile";

pub const PARTY_ROLE_SYSTEM: &str = "http://hl7.org/fhir/research-study-party-role";

/// Extension urls
pub mod url {
    pub const CONFIDENTIALITY: &str = "http://hl7.org/fhir/uv/ebm/StructureDefinition/research-study-sponsor-confidentiality-statement";
    pub const ORIGINAL_PROTOCOL: &str =
        "http://hl7.org/fhir/uv/pharmaceutical-research-protocol/study-amendment";
    pub const NARRATIVE_ELEMENTS: &str = "http://hl7.org/fhir/uv/pharmaceutical-research-protocol/StructureDefinition/narrative-elements";
    pub const PROTOCOL_AMENDMENT: &str = "http://hl7.org/fhir/uv/pharmaceutical-research-protocol/StructureDefinition/protocol-amendment";
    pub const AMENDMENT_DETAIL: &str = "http://hl7.org/fhir/uv/clinical-study-protocol/StructureDefinition/protocol-amendment-detail";
    pub const ELIGIBILITY_CRITERION_TEXT: &str = "http://hl7.org/fhir/uv/pharmaceutical-research-protocol/StructureDefinition/eligibility-criterion-text";

    // Children of the protocol-amendment extension
    pub const SCOPE: &str = "scope";
    pub const COUNTRY: &str = "country";
    pub const REGION: &str = "region";
    pub const SITE: &str = "site";
    pub const RATIONALE: &str = "rationale";
    pub const AMENDMENT_NUMBER: &str = "amendmentNumber";
    pub const PRIMARY_REASON: &str = "primaryReason";
    pub const SECONDARY_REASON: &str = "secondaryReason";
    pub const IMPACT_SAFETY: &str = "substantialImpactSafety";
    pub const IMPACT_SAFETY_COMMENT: &str = "substantialImpactSafetyComment";
    pub const IMPACT_RELIABILITY: &str = "substantialImpactReliability";
    pub const IMPACT_RELIABILITY_COMMENT: &str = "substantialImpactReliabilityComment";

    // Children of a protocol-amendment-detail extension
    pub const DETAIL: &str = "detail";
    pub const SECTION: &str = "section";
}

/// Identifier systems
pub mod system {
    pub const SPONSOR_IDENTIFIER: &str = "https://d4k.dk/sponsor-identifier";
    pub const AMENDMENT_IDENTIFIER: &str = "https://d4k.dk/amendment-identifier";
    pub const REGULATORY_IDENTIFIER: &str = "https://example.org/fda-ind-identifier";
    pub const SITE_IDENTIFIER: &str = "https://example.org/site-identifier";
    pub const URN: &str = "urn:ietf:rfc:3986";
}

/// A code in the NCI thesaurus with its display text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NciCode {
    pub code: &'static str,
    pub display: &'static str,
}

impl NciCode {
    pub const fn new(code: &'static str, display: &'static str) -> Self {
        Self { code, display }
    }
}

pub const SPONSOR_PROTOCOL_IDENTIFIER: NciCode =
    NciCode::new("C132351", "Sponsor Protocol Identifier");
pub const AMENDMENT_IDENTIFIER: NciCode = NciCode::new("C218477", "Amendment Identifier");
pub const FDA_IND_NUMBER: NciCode = NciCode::new("C218685", "FDA IND Number");
pub const NCT_NUMBER: NciCode = NciCode::new("C172240", "NCT Number");
pub const EU_CT_NUMBER: NciCode = NciCode::new("C218684", "EU CT Number");

pub const YES: NciCode = NciCode::new("C49488", "Yes");
pub const NO: NciCode = NciCode::new("C49487", "No");

pub const GLOBAL: NciCode = NciCode::new("C68846", "Global");
pub const NOT_GLOBAL: NciCode = NciCode::new("C217026", "Not Global");

pub const ACRONYM: NciCode = NciCode::new("C207646", "Study Acronym");
pub const BRIEF_TITLE: NciCode = NciCode::new("C207615", "Brief Study Title");

pub const INCLUSION: NciCode = NciCode::new("C25532", "Inclusion Criteria");
pub const EXCLUSION: NciCode = NciCode::new("C25370", "Exclusion Criteria");

/// Regulatory identifier type from the owning organization's name
pub fn regulatory_identifier_type(organization_name: &str) -> Option<NciCode> {
    match organization_name {
        "FDA" => Some(FDA_IND_NUMBER),
        "CT.GOV" => Some(NCT_NUMBER),
        "EMA" => Some(EU_CT_NUMBER),
        _ => None,
    }
}

/// Owning organization name from a regulatory identifier type code
pub fn regulatory_authority(code: &str) -> Option<&'static str> {
    match code {
        "C218685" => Some("FDA"),
        "C172240" => Some("CT.GOV"),
        "C218684" => Some("EMA"),
        _ => None,
    }
}

static SECTION_CODES: phf::Map<&'static str, NciCode> = phf_map! {
    "1" => NciCode::new("C217342", "Section 1"),
    "2" => NciCode::new("C217343", "Section 2"),
    "3" => NciCode::new("C217344", "Section 3"),
    "4" => NciCode::new("C217345", "Section 4"),
    "5" => NciCode::new("C217346", "Section 5"),
    "6" => NciCode::new("C217347", "Section 6"),
    "7" => NciCode::new("C217348", "Section 7"),
    "8" => NciCode::new("C217349", "Section 8"),
    "9" => NciCode::new("C217350", "Section 9"),
    "10" => NciCode::new("C217351", "Section 10"),
    "11" => NciCode::new("C217352", "Section 11"),
    "12" => NciCode::new("C217353", "Section 12"),
    "13" => NciCode::new("C217354", "Section 13"),
    "14" => NciCode::new("C217355", "Section 14"),
    "Title Page" => NciCode::new("C217356", "Section Title Page"),
    "Amendment Details" => NciCode::new("C217357", "Section Amendment Details"),
};

/// Code and display for a section number, keyed on the part before the
/// first `.`. Numbers outside the table map to `("Unknown", "Unknown")`.
pub fn section_code(section_number: &str) -> (&'static str, &'static str) {
    let key = section_number.split('.').next().unwrap_or_default();
    match SECTION_CODES.get(key) {
        Some(code) => (code.code, code.display),
        None => ("Unknown", "Unknown"),
    }
}

/// Inverse of [`section_code`] for the top-level key
pub fn section_for_code(code: &str) -> Option<&'static str> {
    SECTION_CODES
        .entries()
        .find(|(_, c)| c.code == code)
        .map(|(key, _)| *key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_code_uses_top_level() {
        assert_eq!(section_code("1"), ("C217342", "Section 1"));
        assert_eq!(section_code("10.2.3"), ("C217351", "Section 10"));
        assert_eq!(section_code("Title Page"), ("C217356", "Section Title Page"));
    }

    #[test]
    fn test_section_code_fallback() {
        assert_eq!(section_code("15"), ("Unknown", "Unknown"));
        assert_eq!(section_code(""), ("Unknown", "Unknown"));
        assert_eq!(section_code("Appendix"), ("Unknown", "Unknown"));
    }

    #[test]
    fn test_section_for_code() {
        assert_eq!(section_for_code("C217357"), Some("Amendment Details"));
        assert_eq!(section_for_code("C0"), None);
    }

    #[test]
    fn test_regulatory_lookup_roundtrip() {
        for name in ["FDA", "CT.GOV", "EMA"] {
            let code = regulatory_identifier_type(name).unwrap();
            assert_eq!(regulatory_authority(code.code), Some(name));
        }
        assert!(regulatory_identifier_type("PMDA").is_none());
    }
}
