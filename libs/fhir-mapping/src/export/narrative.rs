//! Protocol narrative as Compositions

use super::ExportContext;
use crate::diagnostics::Location;
use crate::error::Result;
use crate::factory::{self, COMPOSITION};
use crate::narrative::{composition_sections, NarrativeArena};
use crate::profile::{CompositionGrouping, ProfileRules};
use crate::vocab::url;
use serde_json::json;
use usdm_fhir_models::{Composition, CompositionSection, Extension};

const MODULE: &str = "export.narrative";

/// Compositions for the document narrative, grouped the way the profile asks
pub(super) fn compositions(
    ctx: &mut ExportContext<'_>,
    rules: &ProfileRules,
) -> Result<Vec<Composition>> {
    let document = ctx.require_document()?;
    let arena = NarrativeArena::from_document(ctx.version, document);
    tracing::debug!(nodes = arena.len(), roots = arena.roots().len(), "Narrative arena built");

    match rules.composition_grouping {
        CompositionGrouping::Single => {
            let sections = composition_sections(
                &arena,
                arena.roots(),
                rules,
                ctx.resolver.as_ref(),
                &mut ctx.diagnostics,
            );
            let title = ctx.version.official_title_text();
            Ok(vec![composition(ctx, &title, sections)?])
        }
        CompositionGrouping::PerTopLevelSection => {
            let mut compositions = Vec::new();
            for &root in arena.roots() {
                let sections = composition_sections(
                    &arena,
                    &[root],
                    rules,
                    ctx.resolver.as_ref(),
                    &mut ctx.diagnostics,
                );
                if sections.is_empty() {
                    continue;
                }
                let node = arena.node(root);
                let title = if node.title.is_empty() {
                    node.number.clone()
                } else {
                    node.title.clone()
                };
                compositions.push(composition(ctx, &title, sections)?);
            }
            Ok(compositions)
        }
    }
}

fn composition(
    ctx: &mut ExportContext<'_>,
    title: &str,
    sections: Vec<CompositionSection>,
) -> Result<Composition> {
    let composition = COMPOSITION.build(
        json!({
            "resourceType": "Composition",
            "id": ctx.ids.next_id(),
            "status": "preliminary",
            "type": { "text": "EvidenceReport" },
            "date": ctx.timestamp,
            "author": [{ "display": "USDM" }],
            "title": title,
            "section": sections,
        }),
        &mut ctx.diagnostics,
    )?;
    ctx.diagnostics.debug(
        format!("Composition '{}' with {} sections", title, composition.section.len()),
        Location::new(MODULE, "composition"),
    );
    Ok(composition)
}

/// `narrative-elements` link from the ResearchStudy to one Composition
pub(super) fn narrative_element(
    ctx: &mut ExportContext<'_>,
    composition: &Composition,
) -> Option<Extension> {
    let reference = factory::reference_to(composition, &mut ctx.diagnostics).ok()?;
    factory::extension(
        json!({ "url": url::NARRATIVE_ELEMENTS, "valueReference": reference }),
        &mut ctx.diagnostics,
    )
    .ok()
}
