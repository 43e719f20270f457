// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamic property value type.

use std::fmt;

/// The value of a single device property.
///
/// Shelly devices report values of mixed types over the same compact
/// payload encoding, so properties are dynamically typed. [`Null`] is the
/// "undefined" sentinel used as the implicit default for properties that
/// were defined without one.
///
/// Equality on `PropertyValue` is what drives change suppression: writing
/// a value equal to the stored one is a no-op and emits no events.
///
/// [`Null`]: PropertyValue::Null
///
/// # Examples
///
/// ```
/// use shellr_lib::types::PropertyValue;
///
/// let value = PropertyValue::from(42);
/// assert_eq!(value.as_int(), Some(42));
/// assert!(!value.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// No value. The default for undefined properties.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A signed integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
    /// A structured value (array or object) kept as raw JSON.
    Json(serde_json::Value),
}

impl PropertyValue {
    /// Returns `true` if this is the null sentinel.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a float.
    ///
    /// Integers are widened, so numeric properties can be read uniformly
    /// regardless of how the payload encoded them.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // i64 -> f64 widening is intentional
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a static name for the value's type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Json(_) => "json",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value}"),
            Self::Json(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            structured @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Json(structured)
            }
        }
    }
}

impl From<PropertyValue> for serde_json::Value {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Null => Self::Null,
            PropertyValue::Bool(b) => Self::Bool(b),
            PropertyValue::Int(i) => Self::from(i),
            // Non-finite floats have no JSON representation
            PropertyValue::Float(f) => serde_json::Number::from_f64(f).map_or(Self::Null, Self::Number),
            PropertyValue::String(s) => Self::String(s),
            PropertyValue::Json(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_null() {
        assert_eq!(PropertyValue::default(), PropertyValue::Null);
        assert!(PropertyValue::default().is_null());
    }

    #[test]
    fn accessors() {
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::from(5).as_int(), Some(5));
        assert_eq!(PropertyValue::from(21.5).as_float(), Some(21.5));
        assert_eq!(PropertyValue::from("on").as_str(), Some("on"));

        assert_eq!(PropertyValue::Null.as_bool(), None);
        assert_eq!(PropertyValue::from("on").as_int(), None);
    }

    #[test]
    fn as_float_widens_integers() {
        assert_eq!(PropertyValue::from(3).as_float(), Some(3.0));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(PropertyValue::from(None::<i64>), PropertyValue::Null);
        assert_eq!(PropertyValue::from(Some(7)), PropertyValue::Int(7));
    }

    #[test]
    fn equality_drives_suppression() {
        assert_eq!(PropertyValue::from(10), PropertyValue::from(10));
        assert_ne!(PropertyValue::from(10), PropertyValue::from(20));
        // Same number, different type: not equal
        assert_ne!(PropertyValue::Int(1), PropertyValue::Float(1.0));
    }

    #[test]
    fn type_names() {
        assert_eq!(PropertyValue::Null.type_name(), "null");
        assert_eq!(PropertyValue::from(1).type_name(), "integer");
        assert_eq!(PropertyValue::from("x").type_name(), "string");
    }

    #[test]
    fn display_format() {
        assert_eq!(PropertyValue::Null.to_string(), "null");
        assert_eq!(PropertyValue::from(42).to_string(), "42");
        assert_eq!(PropertyValue::from("kitchen").to_string(), "kitchen");
    }

    #[test]
    fn serialize_as_bare_json() {
        let json = serde_json::to_string(&PropertyValue::from("bar")).unwrap();
        assert_eq!(json, "\"bar\"");

        let json = serde_json::to_string(&PropertyValue::Null).unwrap();
        assert_eq!(json, "null");

        let json = serde_json::to_string(&PropertyValue::from(12)).unwrap();
        assert_eq!(json, "12");
    }

    #[test]
    fn deserialize_untagged() {
        let value: PropertyValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, PropertyValue::Bool(true));

        let value: PropertyValue = serde_json::from_str("null").unwrap();
        assert_eq!(value, PropertyValue::Null);

        let value: PropertyValue = serde_json::from_str("3").unwrap();
        assert_eq!(value, PropertyValue::Int(3));
    }

    #[test]
    fn json_value_round_trip() {
        let value = PropertyValue::from(serde_json::json!({"overpower": 0}));
        assert!(matches!(value, PropertyValue::Json(_)));

        let back: serde_json::Value = value.into();
        assert_eq!(back, serde_json::json!({"overpower": 0}));
    }

    #[test]
    fn huge_integers_become_floats() {
        let value = PropertyValue::from(serde_json::json!(u64::MAX));
        assert!(matches!(value, PropertyValue::Float(_)));
    }
}
