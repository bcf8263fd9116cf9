//! Protocol bundle assembly shared by the Madrid, PRISM2 and PRISM3 profiles
//!
//! The profiles differ only in their [`ProfileRules`]: which narrative sections
//! are dropped, how compositions are grouped and which associated parties are
//! emitted.

use super::eligibility::eligibility_group;
use super::narrative::{compositions, narrative_element};
use super::research_study::research_study;
use super::ExportContext;
use crate::diagnostics::Location;
use crate::error::Result;
use crate::factory;
use crate::profile::{PartyRole, ProfileRules};
use std::collections::HashMap;
use usdm_fhir_models::{
    Bundle, BundleType, Organization, Practitioner, ResearchStudy, ResearchStudyRecruitment,
};
use usdm_model::ct;

const MODULE: &str = "export.protocol";

/// Party resources referenced from the research study
#[derive(Debug, Default)]
struct Parties {
    organizations: Vec<Organization>,
    practitioners: Vec<Practitioner>,
}

pub(super) fn to_bundle(ctx: &mut ExportContext<'_>, rules: &ProfileRules) -> Result<Bundle> {
    let mut rs = research_study(ctx)?;

    let compositions = compositions(ctx, rules)?;
    for composition in &compositions {
        if let Some(extension) = narrative_element(ctx, composition) {
            rs.extension.push(extension);
        }
    }

    let parties = parties(ctx, rules, &mut rs);

    let group = eligibility_group(ctx);
    if let Some(ref group) = group {
        if let Ok(reference) = factory::reference_to(group, &mut ctx.diagnostics) {
            rs.recruitment = Some(ResearchStudyRecruitment {
                target_number: None,
                eligibility: Some(reference),
            });
        }
    }

    let mut bundle = Bundle::new(BundleType::Transaction);
    bundle.timestamp = Some(ctx.timestamp.clone());
    for composition in &compositions {
        bundle.add_entry(factory::bundle_entry(composition, &mut ctx.diagnostics)?);
    }
    for organization in &parties.organizations {
        bundle.add_entry(factory::bundle_entry(organization, &mut ctx.diagnostics)?);
    }
    for practitioner in &parties.practitioners {
        bundle.add_entry(factory::bundle_entry(practitioner, &mut ctx.diagnostics)?);
    }
    if let Some(ref group) = group {
        bundle.add_entry(factory::bundle_entry(group, &mut ctx.diagnostics)?);
    }
    bundle.add_entry(factory::bundle_entry(&rs, &mut ctx.diagnostics)?);

    tracing::debug!(
        entries = bundle.entry_count(),
        compositions = compositions.len(),
        "Protocol bundle assembled"
    );
    Ok(bundle)
}

/// Organizations for every party role the profile emits, then the medical
/// expert. An organization holding several roles becomes one resource with
/// several associated parties.
fn parties(ctx: &mut ExportContext<'_>, rules: &ProfileRules, rs: &mut ResearchStudy) -> Parties {
    let location = Location::new(MODULE, "parties");
    let version = ctx.version;
    let mut parties = Parties::default();
    let mut emitted: HashMap<&str, usize> = HashMap::new();

    for &role in rules.organization_parties {
        let organizations = match role {
            PartyRole::Sponsor => version.sponsor().into_iter().collect(),
            other => version.role_organizations(other.study_role()),
        };
        if organizations.is_empty() {
            if role == PartyRole::Sponsor {
                ctx.diagnostics.warning("No sponsor organization", location);
            } else {
                ctx.diagnostics
                    .debug(format!("No '{}' organization", role.code()), location);
            }
            continue;
        }

        for organization in organizations {
            let index = match emitted.get(organization.id.as_str()) {
                Some(&index) => index,
                None => {
                    let Ok(resource) =
                        factory::organization(organization, ctx.ids.next_id(), &mut ctx.diagnostics)
                    else {
                        continue;
                    };
                    parties.organizations.push(resource);
                    emitted.insert(organization.id.as_str(), parties.organizations.len() - 1);
                    parties.organizations.len() - 1
                }
            };
            if let Ok(party) = factory::associated_party(
                role,
                &parties.organizations[index],
                &mut ctx.diagnostics,
            ) {
                rs.associated_party.push(party);
            }
        }
    }

    if rules.medical_expert {
        if let Some(practitioner) = medical_expert(ctx) {
            if let Ok(party) =
                factory::associated_party(PartyRole::MedicalExpert, &practitioner, &mut ctx.diagnostics)
            {
                rs.associated_party.push(party);
                parties.practitioners.push(practitioner);
            }
        }
    }
    parties
}

/// Practitioner for the medical expert named in the study roles or, failing
/// that, in the extra configuration
fn medical_expert(ctx: &mut ExportContext<'_>) -> Option<Practitioner> {
    let version = ctx.version;
    let extra = ctx.extra;
    let name = version
        .role_persons(ct::ROLE_MEDICAL_EXPERT)
        .into_iter()
        .map(|p| p.label.as_deref().filter(|l| !l.is_empty()).unwrap_or(&p.name))
        .find(|n| !n.trim().is_empty())
        .or_else(|| extra.medical_expert_contact());
    let Some(name) = name else {
        ctx.diagnostics.info(
            "No medical expert",
            Location::new(MODULE, "medical_expert"),
        );
        return None;
    };
    factory::practitioner(name, ctx.ids.next_id(), &mut ctx.diagnostics).ok()
}
