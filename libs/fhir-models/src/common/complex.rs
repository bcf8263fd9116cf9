//! FHIR complex types and shared data structures
//!
//! Data types reused across the protocol resources. No validation beyond what
//! serde enforces on shape.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Coding - a reference to a code defined by a terminology system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_selected: Option<bool>,
}

impl Coding {
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    pub fn display(&self) -> &str {
        self.display.as_deref().unwrap_or_default()
    }
}

/// CodeableConcept - a concept that may be defined by one or more codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn first_coding(&self) -> Option<&Coding> {
        self.coding.first()
    }

    /// True when any coding carries `code`
    pub fn has_code(&self, code: &str) -> bool {
        self.coding.iter().any(|c| c.code.as_deref() == Some(code))
    }
}

/// Identifier - a business identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    /// True when the identifier type carries `code`
    pub fn is_type(&self, code: &str) -> bool {
        self.type_.as_ref().is_some_and(|t| t.has_code(code))
    }
}

/// Reference - a reference from one resource to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Split a literal `{Type}/{id}` reference
    pub fn target(&self) -> Option<(&str, &str)> {
        self.reference.as_deref()?.split_once('/')
    }
}

/// Address - a postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// HumanName - a name of a human
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

/// Human-readable XHTML summary of a resource or section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    /// generated | extensions | additional | empty
    pub status: String,

    pub div: String,
}

/// Metadata about a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
}

/// Contact point (phone, email, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>, // phone | fax | email | pager | url | sms | other

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Contact information, including an address (R5 `ExtendedContactDetail`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtendedContactDetail {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// FHIR Extension
///
/// Always carries a (possibly empty) nested `extension` list so that parents
/// can append children without checking. At most one `value[x]` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub url: String,
    pub extension: Vec<Extension>,
    pub value: Option<ExtensionValue>,
}

/// The `value[x]` choice of an extension
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    String(String),
    Code(String),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Reference(Reference),
    Identifier(Identifier),
    Date(String),
    Boolean(bool),
    Url(String),
    /// Any other `value[x]`, kept as the raw key and JSON value
    Other(String, Value),
}

impl ExtensionValue {
    /// JSON key of this choice, e.g. `valueString`
    pub fn key(&self) -> &str {
        match self {
            Self::String(_) => "valueString",
            Self::Code(_) => "valueCode",
            Self::Coding(_) => "valueCoding",
            Self::CodeableConcept(_) => "valueCodeableConcept",
            Self::Reference(_) => "valueReference",
            Self::Identifier(_) => "valueIdentifier",
            Self::Date(_) => "valueDate",
            Self::Boolean(_) => "valueBoolean",
            Self::Url(_) => "valueUrl",
            Self::Other(key, _) => key,
        }
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        match self {
            Self::String(v) | Self::Code(v) | Self::Date(v) | Self::Url(v) => {
                Ok(Value::String(v.clone()))
            }
            Self::Boolean(v) => Ok(Value::Bool(*v)),
            Self::Coding(v) => serde_json::to_value(v),
            Self::CodeableConcept(v) => serde_json::to_value(v),
            Self::Reference(v) => serde_json::to_value(v),
            Self::Identifier(v) => serde_json::to_value(v),
            Self::Other(_, v) => Ok(v.clone()),
        }
    }

    fn from_json(key: &str, value: Value) -> serde_json::Result<Self> {
        Ok(match key {
            "valueString" => Self::String(serde_json::from_value(value)?),
            "valueCode" => Self::Code(serde_json::from_value(value)?),
            "valueCoding" => Self::Coding(serde_json::from_value(value)?),
            "valueCodeableConcept" => Self::CodeableConcept(serde_json::from_value(value)?),
            "valueReference" => Self::Reference(serde_json::from_value(value)?),
            "valueIdentifier" => Self::Identifier(serde_json::from_value(value)?),
            "valueDate" => Self::Date(serde_json::from_value(value)?),
            "valueBoolean" => Self::Boolean(serde_json::from_value(value)?),
            "valueUrl" => Self::Url(serde_json::from_value(value)?),
            other => Self::Other(other.to_string(), value),
        })
    }
}

/// Wire form of an extension: the value choice lives among the flattened keys
#[derive(Serialize, Deserialize)]
struct RawExtension {
    url: String,

    #[serde(default)]
    extension: Vec<Extension>,

    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl Serialize for Extension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut rest = Map::new();
        if let Some(value) = &self.value {
            let json = value.to_json().map_err(S::Error::custom)?;
            rest.insert(value.key().to_string(), json);
        }
        RawExtension {
            url: self.url.clone(),
            extension: self.extension.clone(),
            rest,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Extension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawExtension::deserialize(deserializer)?;
        let mut values = raw.rest.into_iter().filter(|(k, _)| k.starts_with("value"));
        let value = match values.next() {
            Some((key, json)) => Some(ExtensionValue::from_json(&key, json).map_err(D::Error::custom)?),
            None => None,
        };
        if let Some((key, _)) = values.next() {
            return Err(D::Error::custom(format!(
                "extension '{}' has more than one value ('{}')",
                raw.url, key
            )));
        }
        Ok(Self {
            url: raw.url,
            extension: raw.extension,
            value,
        })
    }
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            extension: Vec::new(),
            value: Some(value),
        }
    }

    /// An extension that only carries nested extensions
    pub fn complex(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extension: Vec::new(),
            value: None,
        }
    }

    /// First nested extension with `url`
    pub fn child(&self, url: &str) -> Option<&Extension> {
        self.extension.iter().find(|e| e.url == url)
    }

    /// All nested extensions with `url`, in order
    pub fn children<'a>(&'a self, url: &'a str) -> impl Iterator<Item = &'a Extension> + 'a {
        self.extension.iter().filter(move |e| e.url == url)
    }

    pub fn value_string(&self) -> Option<&str> {
        match &self.value {
            Some(ExtensionValue::String(v)) => Some(v),
            _ => None,
        }
    }

    pub fn value_code(&self) -> Option<&str> {
        match &self.value {
            Some(ExtensionValue::Code(v)) => Some(v),
            _ => None,
        }
    }

    pub fn value_coding(&self) -> Option<&Coding> {
        match &self.value {
            Some(ExtensionValue::Coding(v)) => Some(v),
            _ => None,
        }
    }

    pub fn value_codeable_concept(&self) -> Option<&CodeableConcept> {
        match &self.value {
            Some(ExtensionValue::CodeableConcept(v)) => Some(v),
            _ => None,
        }
    }

    pub fn value_reference(&self) -> Option<&Reference> {
        match &self.value {
            Some(ExtensionValue::Reference(v)) => Some(v),
            _ => None,
        }
    }

    pub fn value_identifier(&self) -> Option<&Identifier> {
        match &self.value {
            Some(ExtensionValue::Identifier(v)) => Some(v),
            _ => None,
        }
    }
}

/// First extension in `extensions` with `url`
pub fn find_extension<'a>(extensions: &'a [Extension], url: &str) -> Option<&'a Extension> {
    extensions.iter().find(|e| e.url == url)
}
