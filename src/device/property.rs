// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property declarations.

use std::fmt;
use std::sync::Arc;

use crate::error::ValueError;
use crate::types::PropertyValue;

/// A property validator.
///
/// Validators run on every write to their property, before storage. The
/// returned value is what gets stored and observed, so a validator can
/// normalize as well as reject. Validators must be pure: they run while
/// the device's state lock is held and must not re-enter the device.
pub type Validator =
    Arc<dyn Fn(PropertyValue) -> std::result::Result<PropertyValue, ValueError> + Send + Sync>;

/// Declaration of one device property.
///
/// Built with `with_*` methods and handed to
/// [`Device::define_property`](crate::Device::define_property). A bare
/// name converts directly, for properties with no ID, default, or
/// validator.
///
/// # Examples
///
/// ```
/// use shellr_lib::{Device, PropertySpec};
///
/// let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
///
/// // Payload-addressable relay state with a typed validator
/// device.define_property(
///     PropertySpec::new("switch")
///         .with_id(112)
///         .with_default(false)
///         .with_validator(|value| {
///             value.as_bool().map(Into::into).ok_or_else(|| {
///                 shellr_lib::ValueError::WrongType {
///                     expected: "boolean",
///                     actual: value.type_name(),
///                 }
///             })
///         }),
/// );
///
/// // Plain named property, defaults to null
/// device.define_property("mode");
/// ```
#[derive(Clone)]
pub struct PropertySpec {
    name: String,
    id: Option<u32>,
    default: PropertyValue,
    validator: Option<Validator>,
}

impl PropertySpec {
    /// Creates a spec for the named property with no ID, a null default,
    /// and no validator.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            default: PropertyValue::Null,
            validator: None,
        }
    }

    /// Associates the property with a payload ID.
    ///
    /// Only ID-bearing properties can be addressed by update payloads and
    /// appear in device iteration.
    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the default value.
    ///
    /// The default becomes the property's current value at definition
    /// time, stored as-is without passing through the validator.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default = value.into();
        self
    }

    /// Sets the validator.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(PropertyValue) -> std::result::Result<PropertyValue, ValueError>
            + Send
            + Sync
            + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the payload ID, if one was given.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Consumes the spec into its name and storage slot.
    pub(crate) fn into_slot(self) -> (String, PropertySlot) {
        let slot = PropertySlot {
            value: self.default.clone(),
            default: self.default,
            validator: self.validator,
            id: self.id,
        };
        (self.name, slot)
    }
}

impl From<&str> for PropertySpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PropertySpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("default", &self.default)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Storage for one defined property.
pub(crate) struct PropertySlot {
    /// Current value.
    pub value: PropertyValue,
    /// Declared default, kept for redefinition semantics.
    pub default: PropertyValue,
    /// Validator applied on every write.
    pub validator: Option<Validator>,
    /// Payload ID, when the property is payload-addressable.
    pub id: Option<u32>,
}
