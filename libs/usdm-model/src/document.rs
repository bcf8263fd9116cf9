//! Protocol documents and their narrative content tree

use super::code::Code;
use super::study::GovernanceDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyDefinitionDocument {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub template_name: String,

    #[serde(default)]
    pub versions: Vec<StudyDefinitionDocumentVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyDefinitionDocumentVersion {
    pub id: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Code>,

    #[serde(default)]
    pub contents: Vec<NarrativeContent>,

    #[serde(default)]
    pub date_values: Vec<GovernanceDate>,
}

impl StudyDefinitionDocumentVersion {
    pub fn content(&self, id: &str) -> Option<&NarrativeContent> {
        self.contents.iter().find(|c| c.id == id)
    }

    /// Top-level content nodes: those no other node lists as a child
    pub fn top_level_contents(&self) -> Vec<&NarrativeContent> {
        let children: HashSet<&str> = self
            .contents
            .iter()
            .flat_map(|c| c.child_ids.iter().map(String::as_str))
            .collect();
        self.narrative_content_in_order()
            .into_iter()
            .filter(|c| !children.contains(c.id.as_str()))
            .collect()
    }

    /// Content in previous/next chain order.
    ///
    /// Starts from the node without a `previousId` and follows `nextId`.
    /// A missing head, a cycle or a dangling link falls back to declaration order.
    pub fn narrative_content_in_order(&self) -> Vec<&NarrativeContent> {
        let Some(mut current) = self.contents.iter().find(|c| c.previous_id.is_none()) else {
            return self.contents.iter().collect();
        };
        let mut seen = HashSet::from([current.id.as_str()]);
        let mut ordered = vec![current];
        while let Some(next_id) = current.next_id.as_deref() {
            let Some(next) = self.content(next_id) else {
                break;
            };
            if !seen.insert(next.id.as_str()) {
                break;
            }
            ordered.push(next);
            current = next;
        }
        if ordered.len() == self.contents.len() {
            ordered
        } else {
            self.contents.iter().collect()
        }
    }
}

/// A node of the document's section tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeContent {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub section_number: String,

    #[serde(default)]
    pub section_title: String,

    #[serde(default = "default_true")]
    pub display_section_number: bool,

    #[serde(default = "default_true")]
    pub display_section_title: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_item_id: Option<String>,

    #[serde(default)]
    pub child_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn version(contents: serde_json::Value) -> StudyDefinitionDocumentVersion {
        serde_json::from_value(json!({"id": "dv-1", "version": "1", "contents": contents})).unwrap()
    }

    #[test]
    fn test_chain_order() {
        let v = version(json!([
            {"id": "n2", "sectionNumber": "2", "previousId": "n1"},
            {"id": "n1", "sectionNumber": "1", "nextId": "n2", "childIds": ["n3"]},
            {"id": "n3", "sectionNumber": "1.1", "previousId": "n1"}
        ]));
        // n2 has no next link back to n3, so the chain is incomplete
        let ids: Vec<_> = v.narrative_content_in_order().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["n2", "n1", "n3"]);

        let v = version(json!([
            {"id": "n2", "sectionNumber": "2", "previousId": "n1"},
            {"id": "n1", "sectionNumber": "1", "nextId": "n2"}
        ]));
        let ids: Vec<_> = v.narrative_content_in_order().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2"]);
    }

    #[test]
    fn test_cycle_stops_chain() {
        let v = version(json!([
            {"id": "n1", "nextId": "n2"},
            {"id": "n2", "previousId": "n1", "nextId": "n1"}
        ]));
        let ids: Vec<_> = v.narrative_content_in_order().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2"]);
    }

    #[test]
    fn test_top_level_contents() {
        let v = version(json!([
            {"id": "n1", "sectionNumber": "1", "childIds": ["n2"], "nextId": "n2"},
            {"id": "n2", "sectionNumber": "1.1", "previousId": "n1", "nextId": "n3"},
            {"id": "n3", "sectionNumber": "2", "previousId": "n2"}
        ]));
        let ids: Vec<_> = v.top_level_contents().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n3"]);
        assert!(v.content("n2").unwrap().display_section_number);
    }
}
