//! Resource identity shared by every top-level model

use super::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A top-level FHIR resource that can be placed in a Bundle
pub trait Resource: Serialize + DeserializeOwned {
    /// The `resourceType` discriminator
    const RESOURCE_TYPE: &'static str;

    /// Logical id of the resource
    fn id(&self) -> Option<&str>;

    /// Relative literal reference, `{Type}/{id}`
    fn reference(&self) -> Result<String> {
        let id = self
            .id()
            .ok_or_else(|| Error::MissingField(format!("{}.id", Self::RESOURCE_TYPE)))?;
        Ok(format!("{}/{}", Self::RESOURCE_TYPE, id))
    }

    /// Parse from a JSON value, checking the resource type first
    fn from_resource_value(value: &Value) -> Result<Self> {
        let found = value.get("resourceType").and_then(Value::as_str);
        if found != Some(Self::RESOURCE_TYPE) {
            return Err(Error::InvalidResource(format!(
                "expected {}, found {}",
                Self::RESOURCE_TYPE,
                found.unwrap_or("no resourceType")
            )));
        }
        serde_json::from_value(value.clone()).map_err(Error::from)
    }
}

/// Declares the serde default for a resource's `resourceType` field and the
/// [`Resource`] impl in one go.
#[macro_export]
macro_rules! fhir_resource {
    ($ty:ident, $default_fn:ident) => {
        fn $default_fn() -> String {
            <$ty as $crate::common::resource::Resource>::RESOURCE_TYPE.to_string()
        }

        impl $crate::common::resource::Resource for $ty {
            const RESOURCE_TYPE: &'static str = stringify!($ty);

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }
        }
    };
}
