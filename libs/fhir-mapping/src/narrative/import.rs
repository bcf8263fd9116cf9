use super::{NarrativeArena, SectionNode};
use crate::utils::from_xhtml;
use usdm_fhir_models::CompositionSection;

/// Section number recovered from a section code text.
///
/// `section1.2-objectives` gives `1.2`; text without a `-` separator gives
/// an empty number.
pub fn section_number(code_text: &str) -> String {
    let parts: Vec<&str> = code_text.split('-').collect();
    if parts.len() >= 2 {
        parts[0].replacen("section", "", 1)
    } else {
        String::new()
    }
}

/// Arena rebuilt from composition sections in depth-first order, then
/// double-linked in that order
pub fn from_sections(sections: &[CompositionSection]) -> NarrativeArena {
    let mut arena = NarrativeArena::default();
    for section in sections {
        let root = add(&mut arena, section);
        arena.push_root(root);
    }
    arena.double_link();
    arena
}

fn add(arena: &mut NarrativeArena, section: &CompositionSection) -> usize {
    let number = section_number(section.code_text());
    let title = section.title.clone().unwrap_or_default();
    let index = arena.push(SectionNode {
        id: format!("NarrativeContent_{}", arena.len() + 1),
        display_number: !number.is_empty(),
        display_title: !title.is_empty(),
        number,
        title,
        text: section
            .text
            .as_ref()
            .map(|t| from_xhtml(&t.div))
            .unwrap_or_default(),
        ..Default::default()
    });
    for child in &section.section {
        let child = add(arena, child);
        arena.add_child(index, child);
    }
    index
}
