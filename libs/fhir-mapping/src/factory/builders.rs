//! Named builders for every target the profiles produce

use super::{prepare, Factory};
use crate::diagnostics::{Diagnostics, Location};
use crate::error::BuildError;
use crate::ids::urn_uuid;
use crate::profile::PartyRole;
use crate::vocab::{NciCode, NCI_CODE_SYSTEM, PARTY_ROLE_SYSTEM};
use serde_json::{json, Value};
use usdm_fhir_models::{
    ActivityDefinition, Address, BundleEntry, CodeableConcept, Coding, Composition,
    CompositionSection, Extension, Group, GroupCharacteristic, HumanName, Identifier,
    Organization, PlanDefinition, PlanDefinitionAction, Practitioner, Reference, Resource,
    ResearchStudy, ResearchStudyAssociatedParty, ResearchStudyLabel,
};
use usdm_model::Code;

pub const CODING: Factory<Coding> = Factory::new("Coding", "factory.coding").requires(&["code"]);
pub const USDM_CODING: Factory<Coding> = Factory::new("Coding", "factory.coding")
    .with_prepare(prepare::usdm_code_fields)
    .requires(&["code"]);
pub const CODEABLE_CONCEPT: Factory<CodeableConcept> =
    Factory::new("CodeableConcept", "factory.codeable_concept");
pub const IDENTIFIER: Factory<Identifier> =
    Factory::new("Identifier", "factory.identifier").requires(&["value"]);
pub const REFERENCE: Factory<Reference> =
    Factory::new("Reference", "factory.reference").requires(&["reference"]);
pub const ADDRESS: Factory<Address> =
    Factory::new("Address", "factory.address").with_prepare(prepare::address_fields);
pub const EXTENSION: Factory<Extension> = Factory::new("Extension", "factory.extension")
    .with_prepare(prepare::extension_fields)
    .requires(&["url"]);
pub const ORGANIZATION: Factory<Organization> = Factory::new("Organization", "factory.organization")
    .with_prepare(prepare::organization_fields)
    .requires(&["id"]);
pub const HUMAN_NAME: Factory<HumanName> =
    Factory::new("HumanName", "factory.human_name").requires(&["text"]);
pub const PRACTITIONER: Factory<Practitioner> =
    Factory::new("Practitioner", "factory.practitioner").requires(&["id"]);
pub const LABEL: Factory<ResearchStudyLabel> =
    Factory::new("ResearchStudyLabel", "factory.label").requires(&["value"]);
pub const ASSOCIATED_PARTY: Factory<ResearchStudyAssociatedParty> =
    Factory::new("ResearchStudyAssociatedParty", "factory.associated_party");
pub const RESEARCH_STUDY: Factory<ResearchStudy> =
    Factory::new("ResearchStudy", "factory.research_study").requires(&["id"]);
pub const COMPOSITION: Factory<Composition> =
    Factory::new("Composition", "factory.composition").requires(&["id"]);
pub const COMPOSITION_SECTION: Factory<CompositionSection> =
    Factory::new("CompositionSection", "factory.composition");
pub const GROUP: Factory<Group> = Factory::new("Group", "factory.group").requires(&["id"]);
pub const GROUP_CHARACTERISTIC: Factory<GroupCharacteristic> =
    Factory::new("GroupCharacteristic", "factory.group");
pub const PLAN_DEFINITION: Factory<PlanDefinition> =
    Factory::new("PlanDefinition", "factory.plan_definition").requires(&["id"]);
pub const PLAN_DEFINITION_ACTION: Factory<PlanDefinitionAction> =
    Factory::new("PlanDefinitionAction", "factory.plan_definition");
pub const ACTIVITY_DEFINITION: Factory<ActivityDefinition> =
    Factory::new("ActivityDefinition", "factory.activity_definition").requires(&["id"]);

/// The two mutually exclusive ways of describing a coding
pub enum CodingInput<'a> {
    /// Raw `system`/`version`/`code`/`display` fields
    Fields(Value),
    /// A study graph code, remapped field by field
    Usdm(&'a Code),
}

pub fn coding(input: CodingInput<'_>, diagnostics: &mut Diagnostics) -> Result<Coding, BuildError> {
    match input {
        CodingInput::Fields(fields) => CODING.build(fields, diagnostics),
        CodingInput::Usdm(code) => {
            let fields = serde_json::to_value(code).map_err(|e| BuildError::Unexpected {
                target: "Coding",
                reason: e.to_string(),
            });
            match fields {
                Ok(fields) => USDM_CODING.build(fields, diagnostics),
                Err(err) => {
                    diagnostics.exception(
                        "Failed to build Coding",
                        Location::new("factory.coding", "build"),
                        &err,
                    );
                    Err(err)
                }
            }
        }
    }
}

/// Coding from the NCI thesaurus
pub fn nci_coding(code: NciCode, diagnostics: &mut Diagnostics) -> Result<Coding, BuildError> {
    coding(
        CodingInput::Fields(json!({
            "system": NCI_CODE_SYSTEM,
            "code": code.code,
            "display": code.display,
        })),
        diagnostics,
    )
}

pub fn codeable_concept(
    coding: Coding,
    text: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Result<CodeableConcept, BuildError> {
    let mut fields = json!({ "coding": [coding] });
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        fields["text"] = Value::from(text);
    }
    CODEABLE_CONCEPT.build(fields, diagnostics)
}

/// Identifier typed by an NCI code
pub fn typed_identifier(
    type_code: NciCode,
    system: &str,
    value: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Identifier, BuildError> {
    let type_ = codeable_concept(nci_coding(type_code, diagnostics)?, None, diagnostics)?;
    IDENTIFIER.build(
        json!({ "type": type_, "system": system, "value": value }),
        diagnostics,
    )
}

/// `{Type}/{id}` reference to a resource
pub fn reference_to<R: Resource>(
    resource: &R,
    diagnostics: &mut Diagnostics,
) -> Result<Reference, BuildError> {
    let reference = resource.reference().map_err(|e| BuildError::Invalid {
        target: "Reference",
        reason: e.to_string(),
    });
    match reference {
        Ok(reference) => REFERENCE.build(json!({ "reference": reference }), diagnostics),
        Err(err) => {
            diagnostics.exception(
                "Failed to build Reference",
                Location::new("factory.reference", "build"),
                &err,
            );
            Err(err)
        }
    }
}

pub fn extension(fields: Value, diagnostics: &mut Diagnostics) -> Result<Extension, BuildError> {
    EXTENSION.build(fields, diagnostics)
}

/// Organization resource for a study graph organization, under a fresh id
pub fn organization(
    organization: &usdm_model::Organization,
    id: String,
    diagnostics: &mut Diagnostics,
) -> Result<Organization, BuildError> {
    let mut fields = serde_json::to_value(organization).map_err(|e| BuildError::Unexpected {
        target: "Organization",
        reason: e.to_string(),
    })?;
    fields["id"] = Value::from(id);
    let result = ORGANIZATION.build(fields, diagnostics);
    if let Ok(ref org) = result {
        diagnostics.debug(
            format!("Organization created: {}", org.name.as_deref().unwrap_or_default()),
            Location::new("factory.organization", "build"),
        );
    }
    result
}

pub fn address(
    address: &usdm_model::Address,
    diagnostics: &mut Diagnostics,
) -> Result<Address, BuildError> {
    let fields = serde_json::to_value(address).map_err(|e| BuildError::Unexpected {
        target: "Address",
        reason: e.to_string(),
    })?;
    ADDRESS.build(fields, diagnostics)
}

/// Practitioner named by free text
pub fn practitioner(
    name: &str,
    id: String,
    diagnostics: &mut Diagnostics,
) -> Result<Practitioner, BuildError> {
    let human_name = HUMAN_NAME.build(json!({ "text": name }), diagnostics)?;
    PRACTITIONER.build(
        json!({ "resourceType": "Practitioner", "id": id, "name": [human_name] }),
        diagnostics,
    )
}

/// Study label typed by a title type code
pub fn label(
    title_type: &Code,
    text: &str,
    diagnostics: &mut Diagnostics,
) -> Result<ResearchStudyLabel, BuildError> {
    let coding = coding(CodingInput::Usdm(title_type), diagnostics)?;
    let type_ = codeable_concept(coding, None, diagnostics)?;
    LABEL.build(json!({ "type": type_, "value": text }), diagnostics)
}

/// Role-tagged link from the study to a party resource
pub fn associated_party<R: Resource>(
    role: PartyRole,
    party: &R,
    diagnostics: &mut Diagnostics,
) -> Result<ResearchStudyAssociatedParty, BuildError> {
    let coding = coding(
        CodingInput::Fields(json!({
            "system": PARTY_ROLE_SYSTEM,
            "code": role.code(),
            "display": role.display(),
        })),
        diagnostics,
    )?;
    let role = codeable_concept(coding, None, diagnostics)?;
    let party = reference_to(party, diagnostics)?;
    ASSOCIATED_PARTY.build(json!({ "role": role, "party": party }), diagnostics)
}

/// `PUT {Type}/{id}` bundle entry with a `urn:uuid:` full url
pub fn bundle_entry<R: Resource>(
    resource: &R,
    diagnostics: &mut Diagnostics,
) -> Result<BundleEntry, BuildError> {
    let location = Location::new("factory.bundle", "entry");
    let result = match resource.id() {
        Some(id) => BundleEntry::put(resource, urn_uuid(id)).map_err(|e| BuildError::Invalid {
            target: "BundleEntry",
            reason: e.to_string(),
        }),
        None => Err(BuildError::MissingField {
            target: "BundleEntry",
            field: format!("{}.id", R::RESOURCE_TYPE),
        }),
    };
    if let Err(ref err) = result {
        diagnostics.exception("Failed to build BundleEntry", location, err);
    }
    result
}
