//! Narrative text resolution
//!
//! Narrative and criterion text in the study graph may embed
//! `<usdm:ref klass=".." id=".." attribute=".."/>` references to other
//! instances, whose values may in turn carry `<usdm:tag name=".."/>`
//! placeholders filled from the instance's syntax template dictionary.

use crate::diagnostics::{Diagnostics, Location};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use usdm_model::Study;

const MODULE: &str = "resolver.TagReferenceResolver";

/// Nesting limit for references that resolve to further references
const MAX_DEPTH: usize = 10;

/// Turns stored text into the text that goes on the wire
pub trait TextResolver {
    fn translate(&self, text: &str, diagnostics: &mut Diagnostics) -> String;
}

/// Leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl TextResolver for PassThrough {
    fn translate(&self, text: &str, _diagnostics: &mut Diagnostics) -> String {
        text.to_string()
    }
}

fn ref_pattern() -> &'static Regex {
    static REFS: OnceLock<Regex> = OnceLock::new();
    REFS.get_or_init(|| {
        Regex::new(r"<usdm:ref\b([^>]*?)\s*(?:/>|>\s*</usdm:ref>)")
            .expect("reference regex must compile")
    })
}

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| {
        Regex::new(r"<usdm:tag\b([^>]*?)\s*(?:/>|>\s*</usdm:tag>)")
            .expect("tag regex must compile")
    })
}

fn attribute_pattern() -> &'static Regex {
    static ATTRIBUTES: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTES.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("attribute regex must compile")
    })
}

fn attributes(raw: &str) -> HashMap<String, String> {
    attribute_pattern()
        .captures_iter(raw)
        .map(|c| {
            let value = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
            (c[1].to_string(), value.to_string())
        })
        .collect()
}

/// Resolves references against every identified instance of a study
#[derive(Debug, Clone)]
pub struct TagReferenceResolver {
    instances: HashMap<String, Value>,
}

impl TagReferenceResolver {
    pub fn new(study: &Study) -> Self {
        let mut instances = HashMap::new();
        if let Ok(value) = serde_json::to_value(study) {
            index(&value, &mut instances);
        }
        tracing::debug!(instances = instances.len(), "Indexed study instances");
        Self { instances }
    }

    fn resolve(&self, text: &str, depth: usize, diagnostics: &mut Diagnostics) -> String {
        ref_pattern()
            .replace_all(text, |caps: &Captures| {
                let attrs = attributes(&caps[1]);
                match self.resolve_reference(&attrs, depth, diagnostics) {
                    Ok(value) => value,
                    Err(reason) => {
                        diagnostics.error(
                            format!("Failed to translate reference '{}': {}", &caps[0], reason),
                            Location::new(MODULE, "translate"),
                        );
                        format!("Missing content: {}", reason)
                    }
                }
            })
            .into_owned()
    }

    fn resolve_reference(
        &self,
        attrs: &HashMap<String, String>,
        depth: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, String> {
        if depth >= MAX_DEPTH {
            return Err("reference nesting too deep".to_string());
        }
        let id = attrs.get("id").ok_or("missing id attribute")?;
        let attribute = attrs.get("attribute").ok_or("missing attribute")?;
        let instance = self
            .instances
            .get(id)
            .ok_or_else(|| format!("missing instance '{}'", id))?;
        let value = match instance.get(attribute.as_str()) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Err(format!("missing attribute '{}' on '{}'", attribute, id))
            }
            Some(other) => other.to_string(),
        };
        let value = self.resolve_tags(instance, &value, diagnostics);
        Ok(self.resolve(&value, depth + 1, diagnostics))
    }

    fn resolve_tags(&self, instance: &Value, text: &str, diagnostics: &mut Diagnostics) -> String {
        let dictionary = instance
            .get("dictionaryId")
            .and_then(Value::as_str)
            .and_then(|id| self.instances.get(id));
        tag_pattern()
            .replace_all(text, |caps: &Captures| {
                let attrs = attributes(&caps[1]);
                let name = attrs.get("name").map(String::as_str).unwrap_or_default();
                let Some(dictionary) = dictionary else {
                    diagnostics.error(
                        format!("Missing dictionary while resolving tag '{}'", name),
                        Location::new(MODULE, "resolve_tags"),
                    );
                    return "Missing content: missing dictionary".to_string();
                };
                let entry = dictionary
                    .get("parameterMaps")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .find(|m| m.get("tag").and_then(Value::as_str) == Some(name))
                    .and_then(|m| m.get("reference"))
                    .and_then(Value::as_str);
                match entry {
                    Some(reference) => reference.to_string(),
                    None => {
                        diagnostics.error(
                            format!("Missing dictionary entry for tag '{}'", name),
                            Location::new(MODULE, "resolve_tags"),
                        );
                        "Missing content: missing dictionary entry".to_string()
                    }
                }
            })
            .into_owned()
    }
}

impl TextResolver for TagReferenceResolver {
    fn translate(&self, text: &str, diagnostics: &mut Diagnostics) -> String {
        self.resolve(text, 0, diagnostics)
    }
}

/// Collect every object carrying a string `id`, keyed by that id
fn index(value: &Value, instances: &mut HashMap<String, Value>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("id") {
                if !id.is_empty() {
                    instances.entry(id.clone()).or_insert_with(|| value.clone());
                }
            }
            map.values().for_each(|v| index(v, instances));
        }
        Value::Array(items) => items.iter().for_each(|v| index(v, instances)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn study() -> Study {
        serde_json::from_value(json!({
            "id": "Study_1",
            "name": "PILOT",
            "versions": [{
                "id": "StudyVersion_1",
                "titles": [{"id": "StudyTitle_1", "text": "A Pilot Study", "type": {"code": "C207616", "decode": "Official Study Title"}}],
                "narrativeContentItems": [
                    {"id": "NCI_1", "name": "NCI-1", "text": "<p>Dose is <usdm:tag name=\"dose\"/>.</p>", "dictionaryId": "Dict_1"},
                    {"id": "NCI_2", "name": "NCI-2", "text": "<usdm:tag name=\"unknown\"/>", "dictionaryId": "Dict_1"},
                    {"id": "NCI_3", "name": "NCI-3", "text": "<usdm:tag name=\"dose\"/>"}
                ],
                "dictionaries": [{
                    "id": "Dict_1",
                    "name": "Dictionary",
                    "parameterMaps": [
                        {"tag": "dose", "reference": "<usdm:ref klass=\"StudyTitle\" id=\"StudyTitle_1\" attribute=\"text\"/>"}
                    ]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_pass_through() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(PassThrough.translate("<p>x</p>", &mut diagnostics), "<p>x</p>");
    }

    #[test]
    fn test_reference_resolution() {
        let resolver = TagReferenceResolver::new(&study());
        let mut diagnostics = Diagnostics::new();
        let text = resolver.translate(
            "<p>Title: <usdm:ref klass=\"StudyTitle\" id=\"StudyTitle_1\" attribute=\"text\"/></p>",
            &mut diagnostics,
        );
        assert_eq!(text, "<p>Title: A Pilot Study</p>");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_tag_through_dictionary() {
        let resolver = TagReferenceResolver::new(&study());
        let mut diagnostics = Diagnostics::new();
        let text = resolver.translate(
            "<usdm:ref klass='NarrativeContentItem' id='NCI_1' attribute='text'></usdm:ref>",
            &mut diagnostics,
        );
        assert_eq!(text, "<p>Dose is A Pilot Study.</p>");
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_missing_content() {
        let resolver = TagReferenceResolver::new(&study());
        let mut diagnostics = Diagnostics::new();
        let missing = resolver.translate(
            "<usdm:ref klass=\"X\" id=\"Nope\" attribute=\"text\"/>",
            &mut diagnostics,
        );
        assert_eq!(missing, "Missing content: missing instance 'Nope'");

        let entry = resolver.translate(
            "<usdm:ref klass=\"X\" id=\"NCI_2\" attribute=\"text\"/>",
            &mut diagnostics,
        );
        assert_eq!(entry, "Missing content: missing dictionary entry");

        let dictionary = resolver.translate(
            "<usdm:ref klass=\"X\" id=\"NCI_3\" attribute=\"text\"/>",
            &mut diagnostics,
        );
        assert_eq!(dictionary, "Missing content: missing dictionary");
        assert_eq!(diagnostics.error_count(), 3);
    }

    #[test]
    fn test_self_reference_is_depth_limited() {
        let study: Study = serde_json::from_value(json!({
            "name": "LOOP",
            "versions": [{
                "id": "SV_1",
                "narrativeContentItems": [
                    {"id": "Loop", "name": "Loop", "text": "<usdm:ref klass=\"N\" id=\"Loop\" attribute=\"text\"/>"}
                ]
            }]
        }))
        .unwrap();
        let resolver = TagReferenceResolver::new(&study);
        let mut diagnostics = Diagnostics::new();
        let text = resolver.translate(
            "<usdm:ref klass=\"N\" id=\"Loop\" attribute=\"text\"/>",
            &mut diagnostics,
        );
        assert_eq!(text, "Missing content: reference nesting too deep");
        assert_eq!(diagnostics.error_count(), 1);
    }
}
