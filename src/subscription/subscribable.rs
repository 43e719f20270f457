// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that emit device events.

use crate::device::Device;
use crate::subscription::SubscriptionId;
use crate::types::PropertyValue;

/// Trait for types that support event subscriptions.
///
/// Listeners run synchronously, inline with the call that caused the
/// transition. A listener that needs to do slow work should hand the event
/// off to a task (or use [`Device::subscribe`](crate::Device::subscribe)
/// and receive from the async event bus instead).
///
/// # Examples
///
/// ```
/// use shellr_lib::{Device, Subscribable};
///
/// let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
///
/// let sub_id = device.on_offline(|device| {
///     println!("{} went offline", device.id());
/// });
///
/// device.on_property_changed("switch", |new_value, _old_value, device| {
///     println!("{}: switch is now {new_value}", device.id());
/// });
///
/// // Unsubscribe when no longer needed
/// device.unsubscribe(sub_id);
/// ```
pub trait Subscribable {
    /// Subscribes to online transitions.
    ///
    /// The callback receives the device that came online.
    fn on_online<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static;

    /// Subscribes to offline transitions.
    ///
    /// The callback receives the device that went offline, whether by
    /// assignment or TTL expiry.
    fn on_offline<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static;

    /// Subscribes to all property changes.
    ///
    /// The callback receives the property name, the new value, the old
    /// value, and the device. Useful for logging or mirroring state.
    fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &PropertyValue, &PropertyValue, &Device) + Send + Sync + 'static;

    /// Subscribes to changes of one named property.
    ///
    /// The callback receives the new value, the old value, and the device.
    fn on_property_changed<F>(&self, property: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&PropertyValue, &PropertyValue, &Device) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
