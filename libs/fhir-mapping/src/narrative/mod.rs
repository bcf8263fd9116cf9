//! Narrative section assembler
//!
//! The study graph keeps protocol text as a linked list of content nodes with
//! id-based previous/next/child pointers. Both directions go through
//! [`NarrativeArena`], a flat vector of nodes whose relations are indices into
//! that vector.

mod export;
mod import;

pub use export::{composition_sections, section_code_text};
pub use import::{from_sections, section_number};

use std::collections::HashMap;
use usdm_model::{NarrativeContent, NarrativeContentItem, StudyDefinitionDocumentVersion, StudyVersion};

/// One narrative node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionNode {
    pub id: String,
    pub number: String,
    pub title: String,
    pub display_number: bool,
    pub display_title: bool,
    /// Body text as stored, before reference resolution
    pub text: String,
    pub children: Vec<usize>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NarrativeArena {
    nodes: Vec<SectionNode>,
    roots: Vec<usize>,
}

impl NarrativeArena {
    /// Arena over a document version, nodes in chain order
    pub fn from_document(
        version: &StudyVersion,
        document: &StudyDefinitionDocumentVersion,
    ) -> Self {
        let ordered = document.narrative_content_in_order();
        let positions: HashMap<&str, usize> = ordered
            .iter()
            .enumerate()
            .map(|(index, content)| (content.id.as_str(), index))
            .collect();

        let mut nodes: Vec<SectionNode> = ordered
            .iter()
            .map(|content| SectionNode {
                id: content.id.clone(),
                number: content.section_number.clone(),
                title: content.section_title.clone(),
                display_number: content.display_section_number,
                display_title: content.display_section_title,
                text: content
                    .content_item_id
                    .as_deref()
                    .and_then(|id| version.narrative_content_item(id))
                    .map(|item| item.text.clone())
                    .unwrap_or_default(),
                children: content
                    .child_ids
                    .iter()
                    .filter_map(|id| positions.get(id.as_str()).copied())
                    .collect(),
                previous: None,
                next: None,
            })
            .collect();
        for (index, content) in ordered.iter().enumerate() {
            nodes[index].previous = content
                .previous_id
                .as_deref()
                .and_then(|id| positions.get(id).copied());
            nodes[index].next = content
                .next_id
                .as_deref()
                .and_then(|id| positions.get(id).copied());
        }

        let roots = document
            .top_level_contents()
            .iter()
            .filter_map(|content| positions.get(content.id.as_str()).copied())
            .collect();
        Self { nodes, roots }
    }

    pub fn push(&mut self, node: SectionNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn push_root(&mut self, index: usize) {
        self.roots.push(index);
    }

    pub fn add_child(&mut self, parent: usize, child: usize) {
        self.nodes[parent].children.push(child);
    }

    pub fn node(&self, index: usize) -> &SectionNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[SectionNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Re-link previous/next in arena order, ignoring nesting
    pub fn double_link(&mut self) {
        let count = self.nodes.len();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.previous = index.checked_sub(1);
            node.next = (index + 1 < count).then_some(index + 1);
        }
    }

    /// Study graph content nodes and their content items
    pub fn to_contents(&self) -> (Vec<NarrativeContent>, Vec<NarrativeContentItem>) {
        let mut contents = Vec::with_capacity(self.nodes.len());
        let mut items = Vec::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            let n = index + 1;
            let item = NarrativeContentItem {
                id: format!("NarrativeContentItem_{}", n),
                name: format!("NCI-{}", n),
                text: node.text.clone(),
                dictionary_id: None,
            };
            contents.push(NarrativeContent {
                id: node.id.clone(),
                name: format!("NC-{}", n),
                section_number: node.number.clone(),
                section_title: node.title.clone(),
                display_section_number: node.display_number,
                display_section_title: node.display_title,
                content_item_id: Some(item.id.clone()),
                child_ids: node
                    .children
                    .iter()
                    .map(|c| self.nodes[*c].id.clone())
                    .collect(),
                previous_id: node.previous.map(|p| self.nodes[p].id.clone()),
                next_id: node.next.map(|p| self.nodes[p].id.clone()),
            });
            items.push(item);
        }
        (contents, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(super) fn version_and_document() -> (StudyVersion, StudyDefinitionDocumentVersion) {
        let version: StudyVersion = serde_json::from_value(json!({
            "id": "SV_1",
            "narrativeContentItems": [
                {"id": "NCI_1", "name": "NCI-1", "text": "<p>Intro</p>"},
                {"id": "NCI_2", "name": "NCI-2", "text": "<p>Background</p>"},
                {"id": "NCI_3", "name": "NCI-3", "text": "<p>&nbsp;</p>"},
                {"id": "NCI_4", "name": "NCI-4", "text": "<p>Design</p>"}
            ]
        }))
        .unwrap();
        let document: StudyDefinitionDocumentVersion = serde_json::from_value(json!({
            "id": "SDDV_1",
            "version": "1",
            "contents": [
                {"id": "NC_0", "sectionNumber": "", "sectionTitle": "Title Page", "displaySectionNumber": false, "nextId": "NC_1"},
                {"id": "NC_1", "sectionNumber": "1", "sectionTitle": "Introduction", "contentItemId": "NCI_1", "childIds": ["NC_2"], "previousId": "NC_0", "nextId": "NC_2"},
                {"id": "NC_2", "sectionNumber": "1.1", "sectionTitle": "Background", "contentItemId": "NCI_2", "previousId": "NC_1", "nextId": "NC_3"},
                {"id": "NC_3", "sectionNumber": "2", "sectionTitle": "Design", "contentItemId": "NCI_3", "childIds": ["NC_4"], "previousId": "NC_2", "nextId": "NC_4"},
                {"id": "NC_4", "sectionNumber": "2.1", "sectionTitle": "Overall Design", "contentItemId": "NCI_4", "previousId": "NC_3"}
            ]
        }))
        .unwrap();
        (version, document)
    }

    #[test]
    fn test_arena_from_document() {
        let (version, document) = version_and_document();
        let arena = NarrativeArena::from_document(&version, &document);
        assert_eq!(arena.len(), 5);
        assert_eq!(arena.roots(), &[0, 1, 3]);
        assert_eq!(arena.node(1).children, vec![2]);
        assert_eq!(arena.node(2).text, "<p>Background</p>");
        assert_eq!(arena.node(0).text, "");
        assert_eq!(arena.node(2).previous, Some(1));
        assert_eq!(arena.node(4).next, None);
    }

    #[test]
    fn test_double_link_and_contents() {
        let mut arena = NarrativeArena::default();
        let a = arena.push(SectionNode { id: "A".into(), ..Default::default() });
        let b = arena.push(SectionNode { id: "B".into(), ..Default::default() });
        let c = arena.push(SectionNode { id: "C".into(), ..Default::default() });
        arena.push_root(a);
        arena.add_child(a, b);
        arena.push_root(c);
        arena.double_link();

        let (contents, items) = arena.to_contents();
        assert_eq!(contents[0].previous_id, None);
        assert_eq!(contents[0].next_id.as_deref(), Some("B"));
        assert_eq!(contents[1].previous_id.as_deref(), Some("A"));
        assert_eq!(contents[2].next_id, None);
        assert_eq!(contents[0].child_ids, vec!["B"]);
        assert_eq!(contents[2].name, "NC-3");
        assert_eq!(items[2].id, "NarrativeContentItem_3");
        assert_eq!(contents[2].content_item_id.as_deref(), Some("NarrativeContentItem_3"));
    }
}
