// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use crate::types::PropertyValue;

/// Events emitted by a device.
///
/// A device emits an event for every observable state transition: liveness
/// flips and individual property changes. Host changes surface as a
/// property change for the `"host"` property, like any other field.
///
/// Events carry owned data so they can travel through the async
/// [`EventBus`](super::EventBus) in addition to the synchronous callback
/// registry.
///
/// # Examples
///
/// ```
/// use shellr_lib::event::DeviceEvent;
///
/// let event = DeviceEvent::property_changed("switch", true, false);
/// assert!(event.is_change());
/// assert_eq!(event.property(), Some("switch"));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DeviceEvent {
    /// The device transitioned to online.
    Online,

    /// The device transitioned to offline, either by assignment or
    /// because its liveness window elapsed.
    Offline,

    /// A property transitioned to a new value.
    PropertyChanged {
        /// The name of the property that changed.
        property: String,
        /// The value after the change.
        new_value: PropertyValue,
        /// The value before the change.
        old_value: PropertyValue,
    },
}

impl DeviceEvent {
    /// Creates a property change event.
    #[must_use]
    pub fn property_changed(
        property: impl Into<String>,
        new_value: impl Into<PropertyValue>,
        old_value: impl Into<PropertyValue>,
    ) -> Self {
        Self::PropertyChanged {
            property: property.into(),
            new_value: new_value.into(),
            old_value: old_value.into(),
        }
    }

    /// Returns `true` if this is an online/offline transition.
    #[must_use]
    pub fn is_liveness(&self) -> bool {
        matches!(self, Self::Online | Self::Offline)
    }

    /// Returns `true` if this is a property change.
    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self, Self::PropertyChanged { .. })
    }

    /// Returns the property name for change events.
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::PropertyChanged { property, .. } => Some(property),
            Self::Online | Self::Offline => None,
        }
    }
}
