use super::NarrativeArena;
use crate::diagnostics::{Diagnostics, Location};
use crate::factory::COMPOSITION_SECTION;
use crate::profile::ProfileRules;
use crate::resolver::TextResolver;
use crate::utils::{fix_id, has_content, to_xhtml};
use serde_json::{json, Value};
use std::collections::HashSet;
use usdm_fhir_models::CompositionSection;

const MODULE: &str = "narrative.export";

/// Code text identifying a section: `section{number}-{slug of title}`
pub fn section_code_text(number: &str, title: &str) -> String {
    format!("section{}-{}", number, fix_id(title))
}

/// Section trees for the given root nodes, depth first.
///
/// Subtrees whose number or title is on the profile ignore-list are skipped.
/// A node without meaningful text still produces a section header.
pub fn composition_sections(
    arena: &NarrativeArena,
    roots: &[usize],
    rules: &ProfileRules,
    resolver: &dyn TextResolver,
    diagnostics: &mut Diagnostics,
) -> Vec<CompositionSection> {
    let mut visited = HashSet::new();
    roots
        .iter()
        .filter_map(|root| section(arena, *root, rules, resolver, &mut visited, diagnostics))
        .collect()
}

fn section(
    arena: &NarrativeArena,
    index: usize,
    rules: &ProfileRules,
    resolver: &dyn TextResolver,
    visited: &mut HashSet<usize>,
    diagnostics: &mut Diagnostics,
) -> Option<CompositionSection> {
    let node = arena.node(index);
    if !visited.insert(index) {
        diagnostics.warning(
            format!("Section '{}' reached twice, skipping", node.id),
            Location::new(MODULE, "section"),
        );
        return None;
    }
    if rules.ignores(&node.number, &node.title) {
        diagnostics.debug(
            format!("Ignoring section '{}' '{}'", node.number, node.title),
            Location::new(MODULE, "section"),
        );
        return None;
    }

    let children: Vec<CompositionSection> = node
        .children
        .iter()
        .filter_map(|child| section(arena, *child, rules, resolver, visited, diagnostics))
        .collect();

    let mut fields = json!({
        "code": { "text": section_code_text(&node.number, &node.title) },
        "section": children,
    });
    if !node.title.is_empty() {
        fields["title"] = Value::from(node.title.as_str());
    }
    let text = resolver.translate(&node.text, diagnostics);
    if has_content(&text) {
        fields["text"] = json!({ "status": "generated", "div": to_xhtml(&text) });
    }
    COMPOSITION_SECTION.build(fields, diagnostics).ok()
}
