//! Protocol amendment extension tree
//!
//! Everything hangs off one `protocol-amendment` extension: the scope code,
//! repeated `country`/`region`/`site` entries, rationale and number, reasons,
//! substantial impacts and one `protocol-amendment-detail` per change.

use super::ExportContext;
use crate::diagnostics::{Diagnostics, Location};
use crate::factory::{self, CodingInput};
use crate::vocab::{self, section_code, system, url, NCI_CODE_SYSTEM};
use serde_json::json;
use usdm_fhir_models::Extension;
use usdm_model::{Code, StudyAmendment};

const MODULE: &str = "export.amendment";

pub(super) fn amendment_extension(
    ctx: &mut ExportContext<'_>,
    amendment: &StudyAmendment,
) -> Option<Extension> {
    let mut children = Vec::new();
    scope(ctx, amendment, &mut children);
    children.extend(string_extension(url::RATIONALE, &amendment.summary, &mut ctx.diagnostics));
    children.extend(string_extension(
        url::AMENDMENT_NUMBER,
        &amendment.number,
        &mut ctx.diagnostics,
    ));
    reasons(amendment, &mut children, &mut ctx.diagnostics);
    impacts(ctx, amendment, &mut children);
    changes(amendment, &mut children, &mut ctx.diagnostics);
    factory::extension(
        json!({ "url": url::PROTOCOL_AMENDMENT, "extension": children }),
        &mut ctx.diagnostics,
    )
    .ok()
}

/// Scope code, then one entry per country, region and site
fn scope(ctx: &mut ExportContext<'_>, amendment: &StudyAmendment, children: &mut Vec<Extension>) {
    let location = Location::new(MODULE, "scope");
    let configured = ctx.extra.title_page.amendment_scope.trim();
    let code = if !configured.is_empty() {
        configured.to_string()
    } else if amendment.is_global() {
        vocab::GLOBAL.code.to_string()
    } else {
        vocab::NOT_GLOBAL.code.to_string()
    };
    match factory::extension(json!({ "url": url::SCOPE, "valueCode": code }), &mut ctx.diagnostics) {
        Ok(ext) => children.push(ext),
        Err(_) => ctx.diagnostics.error(
            format!("Failed to create 'scope' extension with value '{}'", code),
            location,
        ),
    }

    for geographic in amendment.local_scopes() {
        let child_url = if geographic.is_country() {
            url::COUNTRY
        } else if geographic.is_region() {
            url::REGION
        } else {
            ctx.diagnostics.warning(
                format!("Unrecognised geographic scope type '{}'", geographic.scope_type.code),
                location,
            );
            continue;
        };
        let Some(value) = geographic.value_code() else {
            ctx.diagnostics
                .warning(format!("Empty {} code in amendment scope", child_url), location);
            continue;
        };
        if let Ok(ext) = factory::extension(
            json!({ "url": child_url, "valueCode": value }),
            &mut ctx.diagnostics,
        ) {
            children.push(ext);
        }
    }

    let version = ctx.version;
    for site_id in amendment.site_ids() {
        let value = version
            .site(site_id)
            .map(|s| s.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(site_id);
        let identifier = factory::IDENTIFIER.build(
            json!({ "system": system::SITE_IDENTIFIER, "value": value }),
            &mut ctx.diagnostics,
        );
        let ext = identifier.and_then(|identifier| {
            factory::extension(
                json!({ "url": url::SITE, "valueIdentifier": identifier }),
                &mut ctx.diagnostics,
            )
        });
        if let Ok(ext) = ext {
            children.push(ext);
        }
    }
}

fn reasons(amendment: &StudyAmendment, children: &mut Vec<Extension>, diagnostics: &mut Diagnostics) {
    match &amendment.primary_reason {
        Some(primary) => {
            children.extend(reason_extension(url::PRIMARY_REASON, &primary.code, diagnostics))
        }
        None => diagnostics.warning(
            "Amendment has no primary reason",
            Location::new(MODULE, "reasons"),
        ),
    }
    for secondary in &amendment.secondary_reasons {
        children.extend(reason_extension(url::SECONDARY_REASON, &secondary.code, diagnostics));
    }
}

fn reason_extension(url: &str, code: &Code, diagnostics: &mut Diagnostics) -> Option<Extension> {
    let concept = factory::coding(
        CodingInput::Fields(json!({
            "system": NCI_CODE_SYSTEM,
            "code": code.code,
            "display": code.decode,
        })),
        diagnostics,
    )
    .and_then(|coding| factory::codeable_concept(coding, None, diagnostics));
    let result = concept.and_then(|concept| {
        factory::extension(json!({ "url": url, "valueCodeableConcept": concept }), diagnostics)
    });
    if result.is_err() {
        diagnostics.error(
            format!("Failed to create '{}' extension with value '{}'", url, code.decode),
            Location::new(MODULE, "reasons"),
        );
    }
    result.ok()
}

/// Substantial safety and reliability impacts, from the amendment's impacts
/// or else from the extra configuration
fn impacts(ctx: &mut ExportContext<'_>, amendment: &StudyAmendment, children: &mut Vec<Extension>) {
    let safety = amendment
        .impact("safety")
        .filter(|i| i.is_substantial)
        .map(|i| i.text.clone())
        .or_else(|| {
            let extra = &ctx.extra.amendment;
            extra.safety_impact.then(|| extra.safety_impact_reason.clone())
        });
    let reliability = amendment
        .impact("reliability")
        .or_else(|| amendment.impact("robustness"))
        .filter(|i| i.is_substantial)
        .map(|i| i.text.clone())
        .or_else(|| {
            let extra = &ctx.extra.amendment;
            extra
                .robustness_impact
                .then(|| extra.robustness_impact_reason.clone())
        });

    for (flag_url, comment_url, comment) in [
        (url::IMPACT_SAFETY, url::IMPACT_SAFETY_COMMENT, safety),
        (url::IMPACT_RELIABILITY, url::IMPACT_RELIABILITY_COMMENT, reliability),
    ] {
        let Some(comment) = comment else {
            continue;
        };
        if let Ok(ext) = factory::extension(
            json!({ "url": flag_url, "valueCode": vocab::YES.code }),
            &mut ctx.diagnostics,
        ) {
            children.push(ext);
            children.extend(string_extension(comment_url, &comment, &mut ctx.diagnostics));
        }
    }
}

fn changes(amendment: &StudyAmendment, children: &mut Vec<Extension>, diagnostics: &mut Diagnostics) {
    for change in &amendment.changes {
        let mut detail = Vec::new();
        detail.extend(string_extension(url::DETAIL, &change.summary, diagnostics));
        detail.extend(string_extension(url::RATIONALE, &change.rationale, diagnostics));
        match change.changed_sections.first() {
            Some(section) => {
                let (code, display) = section_code(&section.section_number);
                diagnostics.debug(
                    format!("Section map result '{}' -> ({}, {})", section.section_number, code, display),
                    Location::new(MODULE, "changes"),
                );
                let ext = factory::coding(
                    CodingInput::Fields(json!({
                        "system": NCI_CODE_SYSTEM,
                        "code": code,
                        "display": display,
                    })),
                    diagnostics,
                )
                .and_then(|coding| factory::codeable_concept(coding, None, diagnostics))
                .and_then(|concept| {
                    factory::extension(
                        json!({ "url": url::SECTION, "valueCodeableConcept": concept }),
                        diagnostics,
                    )
                });
                if let Ok(ext) = ext {
                    detail.push(ext);
                }
            }
            None => diagnostics.warning(
                format!("No changed sections for change '{}'", change.summary),
                Location::new(MODULE, "changes"),
            ),
        }
        if let Ok(ext) = factory::extension(
            json!({ "url": url::AMENDMENT_DETAIL, "extension": detail }),
            diagnostics,
        ) {
            children.push(ext);
        }
    }
}

/// `valueString` extension; empty values are reported and left out
fn string_extension(url: &str, value: &str, diagnostics: &mut Diagnostics) -> Option<Extension> {
    if value.is_empty() {
        diagnostics.warning(
            format!("Failed to create amendment extension '{}' with empty value", url),
            Location::new(MODULE, "string_extension"),
        );
        return None;
    }
    factory::extension(json!({ "url": url, "valueString": value }), diagnostics).ok()
}
