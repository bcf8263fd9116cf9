//! Bundle to [`AssemblerInput`]
//!
//! The inverse of the protocol export. Every lookup goes through the
//! [`BundleIndex`] or an [`ExtensionIndex`]; a missing optional part reads as
//! empty and at most records a warning. Only a bundle without a ResearchStudy
//! is fatal.

use super::index::{BundleIndex, ExtensionIndex};
use super::input::*;
use crate::diagnostics::{Diagnostics, Location};
use crate::error::ImportError;
use crate::extra::Extra;
use crate::narrative::from_sections;
use crate::profile::{PartyRole, ProfileRules};
use crate::vocab::{self, regulatory_authority, section_for_code, url};
use usdm_fhir_models::{
    Address, Bundle, CodeableConcept, Composition, CompositionSection, Extension, Group,
    Organization, Practitioner, ResearchStudy,
};

const MODULE: &str = "import.extract";

struct Extractor<'b, 'd> {
    index: BundleIndex<'b>,
    rules: &'static ProfileRules,
    diagnostics: &'d mut Diagnostics,
}

/// Assembler input plus the extra configuration recovered from the bundle
pub(super) fn extract(
    bundle: &Bundle,
    rules: &'static ProfileRules,
    diagnostics: &mut Diagnostics,
) -> Result<(AssemblerInput, Extra), ImportError> {
    let index = BundleIndex::new(bundle);
    let rs: ResearchStudy = index
        .first_of()
        .ok_or(ImportError::MissingResearchStudy)?;
    let mut extractor = Extractor {
        index,
        rules,
        diagnostics,
    };
    Ok(extractor.research_study(&rs))
}

impl Extractor<'_, '_> {
    fn research_study(&mut self, rs: &ResearchStudy) -> (AssemblerInput, Extra) {
        let extensions = ExtensionIndex::new(&rs.extension);
        let mut input = AssemblerInput::default();
        let mut extra = Extra::default();

        let acronym = rs.label_value(vocab::ACRONYM.code).unwrap_or_default().to_string();
        input.identification.titles = Titles {
            official: rs.title.clone().unwrap_or_default(),
            acronym: acronym.clone(),
            brief: rs
                .label_value(vocab::BRIEF_TITLE.code)
                .unwrap_or_default()
                .to_string(),
        };

        self.parties(rs, &mut input.identification);
        self.identifiers(rs, &mut input);
        input.study_design = self.study_design(rs);

        let original = extensions
            .first(url::ORIGINAL_PROTOCOL)
            .and_then(Extension::value_coding)
            .map(|c| c.code() == vocab::YES.code);
        input.study = StudyInput {
            sponsor_approval_date: rs.date.clone().unwrap_or_default(),
            version: rs.version.clone().unwrap_or_default(),
            original_protocol: original.unwrap_or(false),
            name: StudyName {
                acronym,
                identifier: rs
                    .identifier_of_type(vocab::SPONSOR_PROTOCOL_IDENTIFIER.code)
                    .and_then(|i| i.value.clone())
                    .unwrap_or_default(),
                compound_code: String::new(),
            },
        };
        input.other.confidentiality = extensions
            .string(url::CONFIDENTIALITY)
            .unwrap_or_default()
            .to_string();

        input.document = self.document(&extensions);
        input.population = self.population(rs);
        input.amendments = extensions
            .all(url::PROTOCOL_AMENDMENT)
            .iter()
            .map(|ext| amendment(ext))
            .collect();
        if let Some(first) = input.amendments.first() {
            input.amendments_summary.amendment_scope = first.scope.clone();
            input.amendments_summary.amendment_details = first.summary.clone();
            extra.amendment.safety_impact = first.safety_impact;
            extra.amendment.safety_impact_reason = first.safety_impact_reason.clone();
            extra.amendment.robustness_impact = first.robustness_impact;
            extra.amendment.robustness_impact_reason = first.robustness_impact_reason.clone();
        } else if original == Some(false) {
            self.diagnostics.warning(
                "Amended protocol without a protocol amendment extension",
                Location::new(MODULE, "research_study"),
            );
        }

        extra.title_page.sponsor_confidentiality = input.other.confidentiality.clone();
        extra.title_page.amendment_identifier = input.amendments_summary.amendment_identifier.clone();
        extra.title_page.amendment_scope = input.amendments_summary.amendment_scope.clone();
        extra.title_page.regulatory_agency_identifiers =
            input.other.regulatory_agency_identifiers.clone();
        extra.title_page.original_protocol = match original {
            Some(true) => "Yes".to_string(),
            Some(false) => "No".to_string(),
            None => String::new(),
        };
        extra.title_page.sponsor_approval_date = input.study.sponsor_approval_date.clone();
        if let Some(ref expert) = input.identification.medical_expert {
            extra.miscellaneous.medical_expert_contact = expert.clone();
        }
        (input, extra)
    }

    /// Associated parties the profile carries, classified by role code
    fn parties(&mut self, rs: &ResearchStudy, identification: &mut Identification) {
        let location = Location::new(MODULE, "parties");
        for party in &rs.associated_party {
            let code = party.role.first_coding().map(|c| c.code()).unwrap_or_default();
            let Some(role) = PartyRole::from_code(code) else {
                self.diagnostics
                    .debug(format!("Ignoring party with role '{}'", code), location);
                continue;
            };
            let Some(reference) = party.party.as_ref() else {
                self.diagnostics
                    .warning(format!("Party '{}' without a reference", code), location);
                continue;
            };

            if role == PartyRole::MedicalExpert {
                if !self.rules.medical_expert {
                    continue;
                }
                match self.index.resolve::<Practitioner>(reference) {
                    Some(practitioner) => {
                        identification.medical_expert =
                            practitioner.name_text().map(str::to_string);
                    }
                    None => self.diagnostics.warning(
                        format!("Medical expert '{:?}' not found", reference.reference),
                        location,
                    ),
                }
                continue;
            }
            if !self.rules.organization_parties.contains(&role) {
                self.diagnostics.debug(
                    format!("Party role '{}' not carried by this profile", code),
                    location,
                );
                continue;
            }
            match self.index.resolve::<Organization>(reference) {
                Some(organization) => {
                    let input = organization_input(&organization, Some(role));
                    if role == PartyRole::Sponsor {
                        identification.parties.insert(0, input);
                    } else {
                        identification.parties.push(input);
                    }
                }
                None => self.diagnostics.warning(
                    format!("Organization for party '{}' not found", code),
                    location,
                ),
            }
        }
    }

    /// Sponsor, amendment and regulatory identifiers
    fn identifiers(&mut self, rs: &ResearchStudy, input: &mut AssemblerInput) {
        let sponsor = input
            .identification
            .parties
            .iter()
            .find(|p| p.role.as_deref() == Some(PartyRole::Sponsor.code()))
            .cloned();
        let mut regulatory = Vec::new();
        for identifier in &rs.identifier {
            let value = identifier.value.clone().unwrap_or_default();
            let code = identifier
                .type_
                .as_ref()
                .and_then(CodeableConcept::first_coding)
                .map(|c| c.code())
                .unwrap_or_default();
            if code == vocab::SPONSOR_PROTOCOL_IDENTIFIER.code {
                input.identification.identifiers.push(IdentifierInput {
                    identifier: value,
                    scope: sponsor.clone(),
                });
            } else if code == vocab::AMENDMENT_IDENTIFIER.code {
                input.amendments_summary.amendment_identifier = value;
            } else if let Some(authority) = regulatory_authority(code) {
                regulatory.push(value.clone());
                input.identification.identifiers.push(IdentifierInput {
                    identifier: value,
                    scope: Some(OrganizationInput {
                        name: authority.to_string(),
                        role: None,
                        legal_address: None,
                    }),
                });
            } else {
                self.diagnostics.debug(
                    format!("Ignoring identifier of type '{}'", code),
                    Location::new(MODULE, "identifiers"),
                );
            }
        }
        input.other.regulatory_agency_identifiers = regulatory.join(", ");
    }

    fn study_design(&mut self, rs: &ResearchStudy) -> StudyDesignInput {
        let coding = rs.phase.as_ref().and_then(CodeableConcept::first_coding);
        let Some(coding) = coding else {
            self.diagnostics.warning(
                "No trial phase in ResearchStudy",
                Location::new(MODULE, "study_design"),
            );
            return StudyDesignInput {
                label: "Study Design 1".to_string(),
                ..Default::default()
            };
        };
        StudyDesignInput {
            label: "Study Design 1".to_string(),
            trial_phase: coding.display().to_string(),
            trial_phase_code: coding.code().to_string(),
        }
    }

    /// Narrative from the compositions the study links to, in link order;
    /// every Composition in the bundle when there are no links
    fn document(&mut self, extensions: &ExtensionIndex<'_>) -> DocumentInput {
        let location = Location::new(MODULE, "document");
        let mut compositions: Vec<Composition> = Vec::new();
        for ext in extensions.all(url::NARRATIVE_ELEMENTS) {
            let Some(reference) = ext.value_reference() else {
                continue;
            };
            match self.index.resolve::<Composition>(reference) {
                Some(composition) => compositions.push(composition),
                None => self.diagnostics.warning(
                    format!("Composition {:?} not found", reference.reference),
                    location,
                ),
            }
        }
        if compositions.is_empty() {
            compositions = self.index.all_of();
        }
        if compositions.is_empty() {
            self.diagnostics.warning("No protocol narrative", location);
            return DocumentInput::default();
        }

        let sections: Vec<CompositionSection> = compositions
            .iter()
            .flat_map(|c| c.section.iter().cloned())
            .collect();
        let arena = from_sections(&sections);
        let (contents, items) = arena.to_contents();
        DocumentInput {
            title: compositions[0].title.clone(),
            contents,
            items,
        }
    }

    fn population(&mut self, rs: &ResearchStudy) -> PopulationInput {
        let location = Location::new(MODULE, "population");
        let mut population = PopulationInput {
            label: "Default population".to_string(),
            ..Default::default()
        };
        let Some(reference) = rs.recruitment.as_ref().and_then(|r| r.eligibility.as_ref()) else {
            self.diagnostics.info("No eligibility criteria", location);
            return population;
        };
        let Some(group) = self.index.resolve::<Group>(reference) else {
            self.diagnostics.warning(
                format!("Eligibility group {:?} not found", reference.reference),
                location,
            );
            return population;
        };
        if let Some(name) = group.name.filter(|n| !n.is_empty()) {
            population.label = name;
        }
        for characteristic in &group.characteristic {
            let text = ExtensionIndex::new(&characteristic.extension)
                .string(url::ELIGIBILITY_CRITERION_TEXT)
                .map(str::to_string)
                .or_else(|| {
                    characteristic
                        .value_codeable_concept
                        .as_ref()
                        .and_then(|c| c.text.clone())
                })
                .unwrap_or_default();
            if characteristic.exclude {
                population.inclusion_exclusion.exclusion.push(text);
            } else {
                population.inclusion_exclusion.inclusion.push(text);
            }
        }
        population
    }
}

/// Study graph view of an Organization
pub(super) fn organization_input(organization: &Organization, role: Option<PartyRole>) -> OrganizationInput {
    OrganizationInput {
        name: organization.name.clone().unwrap_or_default(),
        role: role.map(|r| r.code().to_string()),
        legal_address: address_input(organization.address()),
    }
}

/// FHIR address back to study graph field names; an address without any
/// value is no address
pub(super) fn address_input(address: Option<&Address>) -> Option<AddressInput> {
    let address = address?;
    let value = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
    let input = AddressInput {
        text: value(&address.text),
        lines: address.line.iter().filter(|l| !l.is_empty()).cloned().collect(),
        city: value(&address.city),
        district: value(&address.district),
        state: value(&address.state),
        postal_code: value(&address.postal_code),
        country: value(&address.country),
    };
    (input != AddressInput::default()).then_some(input)
}

fn amendment(extension: &Extension) -> AmendmentInput {
    let children = ExtensionIndex::new(&extension.extension);
    let string = |url: &str| children.string(url).unwrap_or_default().to_string();
    let yes = |url: &str| children.code(url) == Some(vocab::YES.code);
    AmendmentInput {
        identifier: string(url::AMENDMENT_NUMBER),
        summary: string(url::RATIONALE),
        scope: children.code(url::SCOPE).unwrap_or_default().to_string(),
        countries: codes(&children, url::COUNTRY),
        regions: codes(&children, url::REGION),
        sites: children
            .all(url::SITE)
            .iter()
            .filter_map(|e| e.value_identifier())
            .filter_map(|i| i.value.clone())
            .collect(),
        primary_reason: children
            .first(url::PRIMARY_REASON)
            .and_then(Extension::value_codeable_concept)
            .and_then(code_input),
        secondary_reasons: children
            .all(url::SECONDARY_REASON)
            .iter()
            .filter_map(|e| e.value_codeable_concept())
            .filter_map(code_input)
            .collect(),
        safety_impact: yes(url::IMPACT_SAFETY),
        safety_impact_reason: string(url::IMPACT_SAFETY_COMMENT),
        robustness_impact: yes(url::IMPACT_RELIABILITY),
        robustness_impact_reason: string(url::IMPACT_RELIABILITY_COMMENT),
        changes: children
            .all(url::AMENDMENT_DETAIL)
            .iter()
            .map(|e| change(e))
            .collect(),
    }
}

fn change(extension: &Extension) -> ChangeInput {
    let children = ExtensionIndex::new(&extension.extension);
    let section_code = children
        .first(url::SECTION)
        .and_then(Extension::value_codeable_concept)
        .and_then(CodeableConcept::first_coding)
        .map(|c| c.code().to_string())
        .unwrap_or_default();
    ChangeInput {
        summary: children.string(url::DETAIL).unwrap_or_default().to_string(),
        rationale: children.string(url::RATIONALE).unwrap_or_default().to_string(),
        section_number: section_for_code(&section_code).unwrap_or_default().to_string(),
        section_code,
    }
}

fn codes(children: &ExtensionIndex<'_>, url: &str) -> Vec<String> {
    children
        .all(url)
        .iter()
        .filter_map(|e| e.value_code())
        .map(str::to_string)
        .collect()
}

fn code_input(concept: &CodeableConcept) -> Option<CodeInput> {
    concept.first_coding().map(|c| CodeInput {
        code: c.code().to_string(),
        decode: c.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_address_is_absent() {
        let address: Address = serde_json::from_value(json!({"line": [""], "city": ""})).unwrap();
        assert_eq!(address_input(Some(&address)), None);
        assert_eq!(address_input(None), None);
    }

    #[test]
    fn test_address_renaming() {
        let address: Address = serde_json::from_value(json!({
            "line": ["1 Main St"],
            "city": "Basel",
            "postalCode": "4051",
            "country": "Switzerland"
        }))
        .unwrap();
        let input = address_input(Some(&address)).unwrap();
        assert_eq!(input.lines, vec!["1 Main St"]);
        assert_eq!(input.postal_code.as_deref(), Some("4051"));
        assert_eq!(input.country.as_deref(), Some("Switzerland"));
        assert_eq!(input.district, None);
    }

    #[test]
    fn test_amendment_defaults_when_children_missing() {
        let extension: Extension = serde_json::from_value(json!({
            "url": url::PROTOCOL_AMENDMENT,
            "extension": [{"url": "amendmentNumber", "valueString": "2"}]
        }))
        .unwrap();
        let amendment = amendment(&extension);
        assert_eq!(amendment.identifier, "2");
        assert_eq!(amendment.scope, "");
        assert!(!amendment.safety_impact);
        assert!(amendment.primary_reason.is_none());
        assert!(amendment.changes.is_empty());
    }

    #[test]
    fn test_change_section_number() {
        let extension: Extension = serde_json::from_value(json!({
            "url": url::AMENDMENT_DETAIL,
            "extension": [
                {"url": "detail", "valueString": "Updated dosing"},
                {"url": "section", "valueCodeableConcept": {"coding": [{"code": "C217346", "display": "Section 5"}]}}
            ]
        }))
        .unwrap();
        let change = change(&extension);
        assert_eq!(change.summary, "Updated dosing");
        assert_eq!(change.rationale, "");
        assert_eq!(change.section_number, "5");
    }

    #[test]
    fn test_missing_research_study_is_fatal() {
        let bundle = Bundle::new(usdm_fhir_models::BundleType::Transaction);
        let mut diagnostics = Diagnostics::new();
        let result = extract(&bundle, crate::profile::Profile::Madrid.rules(), &mut diagnostics);
        assert!(matches!(result, Err(ImportError::MissingResearchStudy)));
    }
}
