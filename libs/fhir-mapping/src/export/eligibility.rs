//! Eligibility criteria as one definitional Group

use super::ExportContext;
use crate::diagnostics::Location;
use crate::factory::{self, CodingInput, GROUP, GROUP_CHARACTERISTIC};
use crate::vocab::url;
use serde_json::json;
use usdm_fhir_models::{Group, GroupCharacteristic};
use usdm_model::EligibilityCriterion;

const MODULE: &str = "export.eligibility";

/// The population's criteria as Group characteristics, `None` when the
/// population references no criteria or the group cannot be built
pub(super) fn eligibility_group(ctx: &mut ExportContext<'_>) -> Option<Group> {
    let design = ctx.design;
    let criteria = design.population_criteria();
    if criteria.is_empty() {
        ctx.diagnostics.info(
            "No eligibility criteria for the study population",
            Location::new(MODULE, "eligibility_group"),
        );
        return None;
    }

    let characteristics: Vec<GroupCharacteristic> = criteria
        .into_iter()
        .filter_map(|criterion| characteristic(ctx, criterion))
        .collect();
    let name = design
        .population
        .as_ref()
        .map(|p| p.label.as_deref().filter(|l| !l.is_empty()).unwrap_or(&p.name))
        .filter(|n| !n.is_empty())
        .unwrap_or("Eligibility criteria");

    GROUP
        .build(
            json!({
                "resourceType": "Group",
                "id": ctx.ids.next_id(),
                "name": name,
                "type": "person",
                "membership": "definitional",
                "characteristic": characteristics,
            }),
            &mut ctx.diagnostics,
        )
        .ok()
}

fn characteristic(
    ctx: &mut ExportContext<'_>,
    criterion: &EligibilityCriterion,
) -> Option<GroupCharacteristic> {
    let version = ctx.version;
    let text = match version.eligibility_criterion_item(&criterion.criterion_item_id) {
        Some(item) => ctx.resolver.translate(&item.text, &mut ctx.diagnostics),
        None => {
            ctx.diagnostics.warning(
                format!(
                    "No criterion item '{}' for criterion '{}'",
                    criterion.criterion_item_id, criterion.id
                ),
                Location::new(MODULE, "characteristic"),
            );
            String::new()
        }
    };
    let text = if text.trim().is_empty() {
        criterion.name.clone()
    } else {
        text
    };

    let code = factory::coding(CodingInput::Usdm(&criterion.category), &mut ctx.diagnostics)
        .and_then(|coding| {
            factory::codeable_concept(coding, Some(&criterion.category.decode), &mut ctx.diagnostics)
        })
        .ok()?;
    let mut extensions = Vec::new();
    if text.trim().is_empty() {
        ctx.diagnostics.warning(
            format!("Empty text for criterion '{}', text extension omitted", criterion.id),
            Location::new(MODULE, "characteristic"),
        );
    } else {
        extensions.push(
            factory::extension(
                json!({ "url": url::ELIGIBILITY_CRITERION_TEXT, "valueString": text }),
                &mut ctx.diagnostics,
            )
            .ok()?,
        );
    }
    GROUP_CHARACTERISTIC
        .build(
            json!({
                "extension": extensions,
                "code": code,
                "valueCodeableConcept": { "text": criterion.identifier },
                "exclude": criterion.is_exclusion(),
            }),
            &mut ctx.diagnostics,
        )
        .ok()
}
