//! ResearchStudy header: titles, identifiers, version and amendment state

use super::amendment::amendment_extension;
use super::ExportContext;
use crate::diagnostics::Location;
use crate::error::Result;
use crate::factory::{self, CodingInput, RESEARCH_STUDY};
use crate::vocab::{self, system, url, RESEARCH_STUDY_PROFILE};
use serde_json::json;
use usdm_fhir_models::ResearchStudy;

const MODULE: &str = "export.research_study";

/// The base ResearchStudy with every header field the version supports.
///
/// Only the base construction is fatal; each later step records its own
/// failure and is left out.
pub(super) fn research_study(ctx: &mut ExportContext<'_>) -> Result<ResearchStudy> {
    let mut rs = RESEARCH_STUDY.build(
        json!({
            "resourceType": "ResearchStudy",
            "id": ctx.ids.next_id(),
            "meta": { "profile": [RESEARCH_STUDY_PROFILE] },
            "status": "active",
            "identifier": [],
            "extension": [],
            "label": [],
            "protocol": [],
            "associatedParty": [],
            "progressStatus": [],
        }),
        &mut ctx.diagnostics,
    )?;

    confidentiality(ctx, &mut rs);

    let title = ctx.version.official_title_text();
    if !title.is_empty() {
        rs.title = Some(title);
    }
    labels(ctx, &mut rs);
    sponsor_identifier(ctx, &mut rs);

    let original = original_protocol(ctx, &mut rs);

    rs.version = Some(
        ctx.version
            .version_identifier
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "1".to_string()),
    );
    if let Some(date) = ctx.version.approval_date_value() {
        rs.date = Some(date.to_string());
    }

    amendment(ctx, &mut rs, original);
    phase(ctx, &mut rs);
    regulatory_identifiers(ctx, &mut rs);
    Ok(rs)
}

fn confidentiality(ctx: &mut ExportContext<'_>, rs: &mut ResearchStudy) {
    let statement = ctx
        .version
        .confidentiality_statement()
        .or_else(|| Some(ctx.extra.title_page.sponsor_confidentiality.as_str()))
        .filter(|s| !s.trim().is_empty());
    if let Some(statement) = statement {
        if let Ok(ext) = factory::extension(
            json!({ "url": url::CONFIDENTIALITY, "valueString": statement }),
            &mut ctx.diagnostics,
        ) {
            rs.extension.push(ext);
        }
    }
}

fn labels(ctx: &mut ExportContext<'_>, rs: &mut ResearchStudy) {
    for title in [ctx.version.acronym(), ctx.version.short_title()]
        .into_iter()
        .flatten()
    {
        if title.text.is_empty() {
            continue;
        }
        if let Ok(label) = factory::label(&title.title_type, &title.text, &mut ctx.diagnostics) {
            rs.label.push(label);
        }
    }
}

fn sponsor_identifier(ctx: &mut ExportContext<'_>, rs: &mut ResearchStudy) {
    let Some(identifier) = ctx.version.sponsor_identifier() else {
        ctx.diagnostics.warning(
            "No sponsor identifier",
            Location::new(MODULE, "sponsor_identifier"),
        );
        return;
    };
    if let Ok(identifier) = factory::typed_identifier(
        vocab::SPONSOR_PROTOCOL_IDENTIFIER,
        system::SPONSOR_IDENTIFIER,
        &identifier.text,
        &mut ctx.diagnostics,
    ) {
        rs.identifier.push(identifier);
    }
}

/// Adds the original protocol flag and returns it
fn original_protocol(ctx: &mut ExportContext<'_>, rs: &mut ResearchStudy) -> bool {
    let original = ctx
        .extra
        .original_protocol()
        .unwrap_or_else(|| ctx.version.original_version());
    let code = if original { vocab::YES } else { vocab::NO };
    let extension = factory::nci_coding(code, &mut ctx.diagnostics).and_then(|coding| {
        factory::extension(
            json!({ "url": url::ORIGINAL_PROTOCOL, "valueCoding": coding }),
            &mut ctx.diagnostics,
        )
    });
    if let Ok(extension) = extension {
        rs.extension.push(extension);
    }
    original
}

fn amendment(ctx: &mut ExportContext<'_>, rs: &mut ResearchStudy, original: bool) {
    let location = Location::new(MODULE, "amendment");
    if original {
        ctx.diagnostics.info("No amendment, original protocol", location);
        return;
    }
    ctx.diagnostics
        .info("Amendment present based on original protocol value", location);
    let version = ctx.version;
    let Some(first) = version.first_amendment() else {
        ctx.diagnostics.error("Could not find first amendment", location);
        return;
    };
    ctx.diagnostics
        .info(format!("First amendment detected '{}'", first.number), location);
    if first.number.is_empty() {
        ctx.diagnostics.error("Empty identifier for first amendment", location);
        return;
    }
    if let Ok(identifier) = factory::typed_identifier(
        vocab::AMENDMENT_IDENTIFIER,
        system::AMENDMENT_IDENTIFIER,
        &first.number,
        &mut ctx.diagnostics,
    ) {
        rs.identifier.push(identifier);
    }
    if let Some(extension) = amendment_extension(ctx, first) {
        rs.extension.push(extension);
    }
}

fn phase(ctx: &mut ExportContext<'_>, rs: &mut ResearchStudy) {
    let design = ctx.design;
    let Some(phase) = design.phase() else {
        ctx.diagnostics
            .warning("No trial phase", Location::new(MODULE, "phase"));
        return;
    };
    let concept = factory::coding(
        CodingInput::Fields(json!({
            "system": vocab::NCI_CODE_SYSTEM,
            "code": phase.code,
            "display": phase.decode,
        })),
        &mut ctx.diagnostics,
    )
    .and_then(|coding| factory::codeable_concept(coding, Some(&phase.decode), &mut ctx.diagnostics));
    if let Ok(concept) = concept {
        rs.phase = Some(concept);
    }
}

fn regulatory_identifiers(ctx: &mut ExportContext<'_>, rs: &mut ResearchStudy) {
    let version = ctx.version;
    let organizations = version.organization_map();
    let mut identifiers = version.regulatory_identifiers();
    identifiers.extend(version.registry_identifiers());
    for identifier in identifiers {
        let Some(organization) = identifier.scoped_by(&organizations) else {
            continue;
        };
        let Some(type_code) = vocab::regulatory_identifier_type(&organization.name) else {
            ctx.diagnostics.debug(
                format!("Ignoring identifier scoped by '{}'", organization.name),
                Location::new(MODULE, "regulatory_identifiers"),
            );
            continue;
        };
        if let Ok(identifier) = factory::typed_identifier(
            type_code,
            system::REGULATORY_IDENTIFIER,
            &identifier.text,
            &mut ctx.diagnostics,
        ) {
            rs.identifier.push(identifier);
        }
    }
}
