//! FHIR Bundle model
//!
//! Transaction bundles carrying the protocol resources, one `PUT` entry per
//! resource.

use super::complex::Identifier;
use super::error::{Error, Result};
use super::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// FHIR Bundle resource
///
/// A container for a collection of resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - always "Bundle"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Persistent identifier for the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    /// Indicates the purpose of this bundle - how it was intended to be used
    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    /// When the bundle was assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Entry in the bundle - will have a resource or information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

/// Type of Bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    /// A set of resources composing a single coherent document
    Document,
    /// A transaction - intended to be processed atomically
    Transaction,
    /// A set of resources collected for a specific purpose
    Batch,
    /// A set of resources collected into a single package
    Collection,
}

/// Entry in the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// Full URL for the entry (relative to the base URL, or absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in this bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    /// How the entry is processed in a transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BundleEntryRequest>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Request details for a Bundle entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntryRequest {
    /// HTTP verb for the entry (GET | POST | PUT | PATCH | DELETE)
    pub method: String,

    /// URL for HTTP equivalent of this entry
    pub url: String,

    /// For conditional creates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_none_exist: Option<String>,
}

impl BundleEntry {
    /// An update entry: `PUT {Type}/{id}` carrying `resource`
    pub fn put<R: Resource>(resource: &R, full_url: impl Into<String>) -> Result<Self> {
        let url = resource.reference()?;
        Ok(Self {
            full_url: Some(full_url.into()),
            resource: Some(serde_json::to_value(resource)?),
            request: Some(BundleEntryRequest {
                method: "PUT".to_string(),
                url,
                if_none_exist: None,
            }),
            extensions: HashMap::new(),
        })
    }

    /// `resourceType` of the carried resource
    pub fn resource_type(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.get("resourceType"))
            .and_then(Value::as_str)
    }

    /// Logical id of the carried resource
    pub fn resource_id(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.get("id"))
            .and_then(Value::as_str)
    }
}

impl Bundle {
    /// Create a new Bundle with minimal required fields
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            id: None,
            identifier: None,
            bundle_type,
            timestamp: None,
            entry: None,
            extensions: HashMap::new(),
        }
    }

    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Convert to JSON Value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }

    /// Check if this is a transaction bundle
    pub fn is_transaction(&self) -> bool {
        matches!(self.bundle_type, BundleType::Transaction)
    }

    /// Get the number of entries in the bundle
    pub fn entry_count(&self) -> usize {
        self.entry.as_ref().map(|e| e.len()).unwrap_or(0)
    }

    /// Get entries as a slice
    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or(&[])
    }

    /// Add an entry to the bundle
    pub fn add_entry(&mut self, entry: BundleEntry) {
        self.entry.get_or_insert_with(Vec::new).push(entry);
    }

    /// Add `resource` as a `PUT` entry
    pub fn put<R: Resource>(&mut self, resource: &R, full_url: impl Into<String>) -> Result<()> {
        let entry = BundleEntry::put(resource, full_url)?;
        self.add_entry(entry);
        Ok(())
    }

    /// Resources carried by the entries, in entry order
    pub fn resources(&self) -> impl Iterator<Item = &Value> {
        self.entries().iter().filter_map(|e| e.resource.as_ref())
    }

    /// Typed resources of type `R`, in entry order. Entries that fail to
    /// parse are skipped.
    pub fn resources_of<R: Resource>(&self) -> Vec<R> {
        self.entries()
            .iter()
            .filter(|e| e.resource_type() == Some(R::RESOURCE_TYPE))
            .filter_map(|e| e.resource.as_ref())
            .filter_map(|v| R::from_resource_value(v).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r5::Organization;
    use serde_json::json;

    fn organization() -> Organization {
        serde_json::from_value(json!({
            "resourceType": "Organization",
            "id": "org-1",
            "name": "ACME"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_bundle() {
        let json = json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": [
                {
                    "fullUrl": "urn:uuid:org-1",
                    "resource": {
                        "resourceType": "Organization",
                        "id": "org-1",
                        "name": "ACME"
                    },
                    "request": {"method": "PUT", "url": "Organization/org-1"}
                }
            ]
        });

        let bundle: Bundle = serde_json::from_value(json).unwrap();
        assert_eq!(bundle.id, None);
        assert!(bundle.is_transaction());
        assert_eq!(bundle.entry_count(), 1);
        assert_eq!(bundle.entries()[0].resource_type(), Some("Organization"));
        assert_eq!(bundle.entries()[0].resource_id(), Some("org-1"));
    }

    #[test]
    fn test_serialize_bundle() {
        let bundle = Bundle::new(BundleType::Transaction);
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["resourceType"], "Bundle");
        assert_eq!(json["type"], "transaction");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_put_entry() {
        let mut bundle = Bundle::new(BundleType::Transaction);
        bundle.put(&organization(), "urn:uuid:org-1").unwrap();

        let entry = &bundle.entries()[0];
        let request = entry.request.as_ref().unwrap();
        assert_eq!(request.method, "PUT");
        assert_eq!(request.url, "Organization/org-1");
        assert_eq!(entry.full_url.as_deref(), Some("urn:uuid:org-1"));
    }

    #[test]
    fn test_put_requires_id() {
        let mut org = organization();
        org.id = None;
        let mut bundle = Bundle::new(BundleType::Transaction);
        assert!(matches!(
            bundle.put(&org, "urn:uuid:x"),
            Err(Error::MissingField(_))
        ));
        assert_eq!(bundle.entry_count(), 0);
    }

    #[test]
    fn test_resources_of() {
        let mut bundle = Bundle::new(BundleType::Transaction);
        bundle.put(&organization(), "urn:uuid:org-1").unwrap();
        bundle.add_entry(BundleEntry {
            full_url: None,
            resource: Some(json!({"resourceType": "Practitioner", "id": "p1"})),
            request: None,
            extensions: HashMap::new(),
        });

        let organizations: Vec<Organization> = bundle.resources_of();
        assert_eq!(organizations.len(), 1);
        assert_eq!(organizations[0].name.as_deref(), Some("ACME"));
        assert_eq!(bundle.resources().count(), 2);
    }
}
