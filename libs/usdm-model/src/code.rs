//! Coded values

use serde::{Deserialize, Serialize};

/// A code drawn from a terminology (CDISC CT, ISO 3166, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub code_system: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system_version: Option<String>,

    #[serde(default)]
    pub decode: String,
}

impl Code {
    /// Case-insensitive comparison against the decode text.
    pub fn decode_is(&self, decode: &str) -> bool {
        self.decode.eq_ignore_ascii_case(decode)
    }
}

/// A standard code together with sponsor-specific aliases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AliasCode {
    #[serde(default)]
    pub id: String,

    pub standard_code: Code,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standard_code_aliases: Vec<Code>,
}
