//! Lookup tables over one parsed bundle

use serde_json::Value;
use std::collections::HashMap;
use usdm_fhir_models::{Bundle, Extension, Reference, Resource};

/// Bundle entries keyed by `(resourceType, id)` and by full url, built once
/// per import
#[derive(Debug, Default)]
pub struct BundleIndex<'b> {
    by_id: HashMap<&'b str, HashMap<&'b str, &'b Value>>,
    by_full_url: HashMap<&'b str, &'b Value>,
    by_type: HashMap<&'b str, Vec<&'b Value>>,
}

impl<'b> BundleIndex<'b> {
    pub fn new(bundle: &'b Bundle) -> Self {
        let mut index = Self::default();
        for entry in bundle.entries() {
            let Some(resource) = entry.resource.as_ref() else {
                continue;
            };
            let Some(resource_type) = entry.resource_type() else {
                continue;
            };
            index.by_type.entry(resource_type).or_default().push(resource);
            if let Some(id) = entry.resource_id() {
                index
                    .by_id
                    .entry(resource_type)
                    .or_default()
                    .entry(id)
                    .or_insert(resource);
            }
            if let Some(full_url) = entry.full_url.as_deref() {
                index.by_full_url.entry(full_url).or_insert(resource);
            }
        }
        tracing::debug!(
            resources = index.by_type.values().map(Vec::len).sum::<usize>(),
            types = index.by_type.len(),
            "Bundle indexed"
        );
        index
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Option<&'b Value> {
        self.by_id.get(resource_type)?.get(id).copied()
    }

    /// Number of indexed resources of `resource_type`
    pub fn count(&self, resource_type: &str) -> usize {
        self.by_type.get(resource_type).map_or(0, Vec::len)
    }

    /// First resource of type `R` in entry order
    pub fn first_of<R: Resource>(&self) -> Option<R> {
        self.by_type
            .get(R::RESOURCE_TYPE)?
            .iter()
            .find_map(|v| R::from_resource_value(v).ok())
    }

    /// Every resource of type `R` in entry order; unparseable entries are skipped
    pub fn all_of<R: Resource>(&self) -> Vec<R> {
        self.by_type
            .get(R::RESOURCE_TYPE)
            .into_iter()
            .flatten()
            .filter_map(|v| R::from_resource_value(v).ok())
            .collect()
    }

    /// Target of a `{Type}/{id}` or full url reference, typed as `R`
    pub fn resolve<R: Resource>(&self, reference: &Reference) -> Option<R> {
        let value = match reference.target() {
            Some((resource_type, id)) if resource_type == R::RESOURCE_TYPE => {
                self.get(resource_type, id)
            }
            _ => reference
                .reference
                .as_deref()
                .and_then(|r| self.by_full_url.get(r).copied()),
        }?;
        R::from_resource_value(value).ok()
    }
}

/// Extensions keyed by url, preserving the order of repeated urls
#[derive(Debug, Default)]
pub struct ExtensionIndex<'e> {
    by_url: HashMap<&'e str, Vec<&'e Extension>>,
}

impl<'e> ExtensionIndex<'e> {
    pub fn new(extensions: &'e [Extension]) -> Self {
        let mut by_url: HashMap<&str, Vec<&Extension>> = HashMap::new();
        for extension in extensions {
            by_url.entry(extension.url.as_str()).or_default().push(extension);
        }
        Self { by_url }
    }

    pub fn first(&self, url: &str) -> Option<&'e Extension> {
        self.by_url.get(url).and_then(|e| e.first()).copied()
    }

    pub fn all(&self, url: &str) -> &[&'e Extension] {
        self.by_url.get(url).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn string(&self, url: &str) -> Option<&'e str> {
        self.first(url).and_then(Extension::value_string)
    }

    pub fn code(&self, url: &str) -> Option<&'e str> {
        self.first(url).and_then(Extension::value_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use usdm_fhir_models::{Organization, ResearchStudy};

    fn bundle() -> Bundle {
        serde_json::from_value(json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": [
                {
                    "fullUrl": "urn:uuid:org-1",
                    "resource": {"resourceType": "Organization", "id": "org-1", "name": "ACME"},
                    "request": {"method": "PUT", "url": "Organization/org-1"}
                },
                {
                    "fullUrl": "urn:uuid:rs-1",
                    "resource": {"resourceType": "ResearchStudy", "id": "rs-1", "status": "active"},
                    "request": {"method": "PUT", "url": "ResearchStudy/rs-1"}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_lookup_by_type_and_id() {
        let bundle = bundle();
        let index = BundleIndex::new(&bundle);
        assert!(index.get("Organization", "org-1").is_some());
        assert!(index.get("Organization", "rs-1").is_none());
        assert_eq!(index.count("ResearchStudy"), 1);
        let rs: ResearchStudy = index.first_of().unwrap();
        assert_eq!(rs.id.as_deref(), Some("rs-1"));
    }

    #[test]
    fn test_resolve_reference() {
        let bundle = bundle();
        let index = BundleIndex::new(&bundle);
        let literal = Reference {
            reference: Some("Organization/org-1".to_string()),
            ..Default::default()
        };
        let org: Organization = index.resolve(&literal).unwrap();
        assert_eq!(org.name.as_deref(), Some("ACME"));

        let full_url = Reference {
            reference: Some("urn:uuid:org-1".to_string()),
            ..Default::default()
        };
        assert!(index.resolve::<Organization>(&full_url).is_some());

        let wrong_type = Reference {
            reference: Some("Organization/rs-1".to_string()),
            ..Default::default()
        };
        assert!(index.resolve::<Organization>(&wrong_type).is_none());
    }

    #[test]
    fn test_extension_index_keeps_repeats() {
        let extensions: Vec<Extension> = serde_json::from_value(json!([
            {"url": "country", "valueCode": "DNK"},
            {"url": "scope", "valueCode": "C217026"},
            {"url": "country", "valueCode": "FRA"}
        ]))
        .unwrap();
        let index = ExtensionIndex::new(&extensions);
        assert_eq!(index.all("country").len(), 2);
        assert_eq!(index.code("scope"), Some("C217026"));
        assert!(index.all("site").is_empty());
        assert_eq!(index.string("scope"), None);
    }
}
