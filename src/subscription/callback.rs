// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device event subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Internal registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::device::Device;
use crate::event::DeviceEvent;
use crate::types::PropertyValue;

/// Unique identifier for a subscription.
///
/// Returned when a callback is registered; pass it back to unsubscribe.
/// IDs are unique within a device's lifetime.
///
/// # Examples
///
/// ```ignore
/// let sub_id = device.on_online(|device| { /* ... */ });
///
/// // Later, unsubscribe
/// device.unsubscribe(sub_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for online/offline callbacks.
type LivenessCallback = Arc<dyn Fn(&Device) + Send + Sync>;

/// Type alias for general change callbacks (all properties).
type ChangeCallback = Arc<dyn Fn(&str, &PropertyValue, &PropertyValue, &Device) + Send + Sync>;

/// Type alias for per-property change callbacks.
type PropertyCallback = Arc<dyn Fn(&PropertyValue, &PropertyValue, &Device) + Send + Sync>;

/// Registry for managing device event callbacks.
///
/// This is an internal type used by devices to store and dispatch
/// callbacks. It uses thread-safe interior mutability via
/// `parking_lot::RwLock`, and delivery is synchronous: listeners run
/// inline with the call that caused the change, in the caller's thread.
///
/// Callback closures are released from the registry locks before being
/// invoked, so a listener may register or remove subscriptions from
/// within its own callback.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// Online transition callbacks.
    online_callbacks: RwLock<HashMap<SubscriptionId, LivenessCallback>>,
    /// Offline transition callbacks.
    offline_callbacks: RwLock<HashMap<SubscriptionId, LivenessCallback>>,
    /// General change callbacks (receive every property change).
    change_callbacks: RwLock<HashMap<SubscriptionId, ChangeCallback>>,
    /// Scoped change callbacks, keyed by property name.
    property_callbacks: RwLock<HashMap<String, HashMap<SubscriptionId, PropertyCallback>>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            online_callbacks: RwLock::new(HashMap::new()),
            offline_callbacks: RwLock::new(HashMap::new()),
            change_callbacks: RwLock::new(HashMap::new()),
            property_callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for online transitions.
    ///
    /// The callback receives the device that came online.
    pub fn on_online<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.online_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for offline transitions.
    pub fn on_offline<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.offline_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for all property changes.
    ///
    /// The callback receives the property name, the new value, the old
    /// value, and the device.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &PropertyValue, &PropertyValue, &Device) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.change_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for changes of one named property.
    ///
    /// The callback receives the new value, the old value, and the device.
    pub fn on_property_changed<F>(&self, property: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&PropertyValue, &PropertyValue, &Device) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.property_callbacks
            .write()
            .entry(property.to_string())
            .or_default()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if self.online_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.offline_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.change_callbacks.write().remove(&id).is_some() {
            return true;
        }
        let mut scoped = self.property_callbacks.write();
        for callbacks in scoped.values_mut() {
            if callbacks.remove(&id).is_some() {
                return true;
            }
        }
        false
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.online_callbacks.write().clear();
        self.offline_callbacks.write().clear();
        self.change_callbacks.write().clear();
        self.property_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches an event to all matching callbacks.
    ///
    /// Callbacks are invoked synchronously, in arbitrary order within each
    /// kind. For a property change, general `change` listeners run before
    /// the property's scoped listeners.
    pub fn dispatch(&self, device: &Device, event: &DeviceEvent) {
        match event {
            DeviceEvent::Online => {
                for callback in snapshot(&self.online_callbacks) {
                    callback(device);
                }
            }
            DeviceEvent::Offline => {
                for callback in snapshot(&self.offline_callbacks) {
                    callback(device);
                }
            }
            DeviceEvent::PropertyChanged {
                property,
                new_value,
                old_value,
            } => {
                for callback in snapshot(&self.change_callbacks) {
                    callback(property, new_value, old_value, device);
                }

                let scoped: Vec<_> = self
                    .property_callbacks
                    .read()
                    .get(property)
                    .map(|callbacks| callbacks.values().cloned().collect())
                    .unwrap_or_default();
                for callback in scoped {
                    callback(new_value, old_value, device);
                }
            }
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.online_callbacks.read().len()
            + self.offline_callbacks.read().len()
            + self.change_callbacks.read().len()
            + self
                .property_callbacks
                .read()
                .values()
                .map(HashMap::len)
                .sum::<usize>()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

/// Clones the callbacks of one kind out of their lock, so listeners run
/// with no registry lock held.
fn snapshot<C: Clone>(callbacks: &RwLock<HashMap<SubscriptionId, C>>) -> Vec<C> {
    callbacks.read().values().cloned().collect()
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
