// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime state of a single Shelly device.
//!
//! A [`Device`] owns a registry of dynamically-declared properties, a
//! TTL-derived liveness flag, and the routine that applies decoded
//! status updates arriving from transport code.
//!
//! The struct is a cheap-to-clone handle over shared state, so the owning
//! connection, event listeners, and the internal expiry timer can all hold
//! it. All mutation is serialized behind a per-device lock; event delivery
//! happens after the lock is released, so listeners may re-enter the
//! device.
//!
//! # Examples
//!
//! ```
//! use shellr_lib::{Device, PropertySpec, StatusUpdate, Subscribable};
//!
//! let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
//!
//! device.define_property(PropertySpec::new("switch").with_id(112).with_default(false));
//!
//! device.on_property_changed("switch", |new_value, _old_value, device| {
//!     println!("{}: switch is now {new_value}", device.id());
//! });
//!
//! device.update(&StatusUpdate::new().with_serial(1));
//! assert!(device.online());
//! ```

mod property;

pub use property::{PropertySpec, Validator};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::event::{DeviceEvent, EventBus};
use crate::status::{PayloadRecord, StatusUpdate};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::types::PropertyValue;

use property::PropertySlot;

/// A Shelly device's runtime state.
///
/// Constructed by the device-type factory with the identity triple
/// `(device_type, id, host)` and fed by transport code through
/// [`update`](Device::update). Owning code can also mutate state directly:
/// define properties, set values, flip liveness, arm the TTL.
///
/// A device starts online with no liveness window; it goes offline when
/// assigned, or when an armed TTL elapses without a refreshing update.
///
/// # Examples
///
/// ```
/// use shellr_lib::{Device, PropertySpec};
///
/// # fn main() -> shellr_lib::Result<()> {
/// let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
/// assert!(device.online());
/// assert_eq!(device.host(), "192.168.1.2");
///
/// device.define_property(PropertySpec::new("power").with_id(111).with_default(0));
/// device.set_property("power", 60)?;
/// assert_eq!(device.property("power").unwrap().as_int(), Some(60));
/// # Ok(())
/// # }
/// ```
pub struct Device {
    inner: Arc<DeviceInner>,
}

struct DeviceInner {
    /// Device-type identifier, e.g. `"SHSW-1"`. Opaque to this library.
    device_type: String,
    /// Device serial/identifier string.
    id: String,
    /// Mutable state, serialized behind one lock.
    state: Mutex<DeviceState>,
    /// Synchronous listeners.
    callbacks: CallbackRegistry,
    /// Async fan-out of the same events.
    bus: EventBus,
}

struct DeviceState {
    online: bool,
    ttl: Duration,
    last_serial: Option<u64>,
    slots: HashMap<String, PropertySlot>,
    ids: HashMap<u32, String>,
    /// Monotonic counter identifying the currently armed timer. A timer
    /// task whose generation no longer matches has been superseded and
    /// must not act.
    timer_generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl DeviceState {
    /// Flips the liveness flag, recording an event on actual transitions.
    fn transition_online(&mut self, online: bool, events: &mut Vec<DeviceEvent>) {
        if self.online == online {
            return;
        }
        self.online = online;
        events.push(if online {
            DeviceEvent::Online
        } else {
            DeviceEvent::Offline
        });
    }

    /// Runs the property set protocol: validate, suppress no-ops, store,
    /// record the change event.
    fn store(
        &mut self,
        name: &str,
        value: PropertyValue,
        events: &mut Vec<DeviceEvent>,
    ) -> Result<()> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))?;

        let candidate = match &slot.validator {
            Some(validator) => validator(value)?,
            None => value,
        };

        if candidate == slot.value {
            return Ok(());
        }

        let old_value = std::mem::replace(&mut slot.value, candidate.clone());
        events.push(DeviceEvent::PropertyChanged {
            property: name.to_string(),
            new_value: candidate,
            old_value,
        });
        Ok(())
    }
}

impl Device {
    /// Name of the implicit network-address property.
    ///
    /// Every device carries it from construction; it has no validator and
    /// no payload ID, and host changes emit ordinary change events under
    /// this name.
    pub const HOST: &'static str = "host";

    /// Creates a device from its identity triple.
    ///
    /// The device starts online with no liveness window and no declared
    /// properties beyond the implicit [`HOST`](Device::HOST). No events
    /// fire from construction.
    #[must_use]
    pub fn new(
        device_type: impl Into<String>,
        id: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        let host = PropertyValue::from(host.into());
        let mut slots = HashMap::new();
        slots.insert(
            Self::HOST.to_string(),
            PropertySlot {
                value: host.clone(),
                default: host,
                validator: None,
                id: None,
            },
        );

        Self {
            inner: Arc::new(DeviceInner {
                device_type: device_type.into(),
                id: id.into(),
                state: Mutex::new(DeviceState {
                    online: true,
                    ttl: Duration::ZERO,
                    last_serial: None,
                    slots,
                    ids: HashMap::new(),
                    timer_generation: 0,
                    timer: None,
                }),
                callbacks: CallbackRegistry::new(),
                bus: EventBus::new(),
            }),
        }
    }

    /// Returns the device-type identifier.
    #[must_use]
    pub fn device_type(&self) -> &str {
        &self.inner.device_type
    }

    /// Returns the device serial/identifier string.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Returns the current network address.
    #[must_use]
    pub fn host(&self) -> String {
        let state = self.inner.state.lock();
        match state.slots.get(Self::HOST).map(|slot| &slot.value) {
            Some(PropertyValue::String(host)) => host.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Sets the network address, emitting a change event for
    /// [`HOST`](Device::HOST) if the value differs.
    pub fn set_host(&self, host: impl Into<String>) -> Result<()> {
        self.set_property(Self::HOST, host.into())
    }

    /// Returns the liveness flag.
    #[must_use]
    pub fn online(&self) -> bool {
        self.inner.state.lock().online
    }

    /// Sets the liveness flag.
    ///
    /// A same-value assignment is a no-op. A transition emits exactly one
    /// [`Online`](DeviceEvent::Online) or [`Offline`](DeviceEvent::Offline)
    /// event.
    pub fn set_online(&self, online: bool) {
        let mut events = Vec::new();
        {
            let mut state = self.inner.state.lock();
            state.transition_online(online, &mut events);
        }
        self.emit(events);
    }

    /// Returns the liveness window. Zero means no automatic expiry.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.inner.state.lock().ttl
    }

    /// Sets the liveness window.
    ///
    /// Any assignment cancels the pending expiry timer. A nonzero value
    /// arms a fresh one-shot timer for the full window, even when the
    /// value is unchanged; when it elapses the device goes offline through
    /// the normal liveness protocol. Zero only cancels; it does not touch
    /// the liveness flag.
    ///
    /// A superseded timer has no observable effect, and a pending timer
    /// neither keeps a discarded device alive nor fires after it is
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics when called with a nonzero window outside a tokio runtime,
    /// since the expiry timer is a spawned task.
    pub fn set_ttl(&self, ttl: Duration) {
        let mut state = self.inner.state.lock();
        self.arm_ttl(&mut state, ttl);
    }

    /// Returns the serial of the last applied delta, if any update carried
    /// one yet.
    #[must_use]
    pub fn last_serial(&self) -> Option<u64> {
        self.inner.state.lock().last_serial
    }

    /// Defines (or redefines) a property.
    ///
    /// The declared default becomes the property's current value, stored
    /// as-is without passing through the validator. When the spec carries
    /// an ID, the ID is mapped to this property for payload addressing and
    /// iteration; a spec without an ID registers no mapping. Redefinition
    /// replaces the default, validator, and current value.
    ///
    /// No events fire from definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellr_lib::{Device, PropertySpec};
    ///
    /// let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
    ///
    /// device.define_property(PropertySpec::new("switch").with_id(112).with_default(false));
    /// device.define_property("mode"); // no ID, defaults to null
    ///
    /// assert_eq!(device.property("switch").unwrap().as_bool(), Some(false));
    /// assert!(device.property("mode").unwrap().is_null());
    /// ```
    pub fn define_property(&self, spec: impl Into<PropertySpec>) {
        let (name, slot) = spec.into().into_slot();
        let mut state = self.inner.state.lock();
        if let Some(id) = slot.id {
            state.ids.insert(id, name.clone());
        }
        state.slots.insert(name, slot);
    }

    /// Returns a property's current value, or `None` if the name was
    /// never defined.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.inner
            .state
            .lock()
            .slots
            .get(name)
            .map(|slot| slot.value.clone())
    }

    /// Sets a property's value.
    ///
    /// The value first passes through the property's validator, if one is
    /// registered; the validator's output is what gets stored. A failed
    /// validation aborts the write with no mutation and no events. Writing
    /// a value equal to the stored one is a silent no-op; an actual change
    /// emits one scoped and one general change event.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProperty`] when the name was never defined;
    /// [`Error::Value`] when the validator rejects the value.
    pub fn set_property(&self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let mut events = Vec::new();
        {
            let mut state = self.inner.state.lock();
            state.store(name, value.into(), &mut events)?;
        }
        self.emit(events);
        Ok(())
    }

    /// Returns a snapshot of all ID-bearing properties as `(name, value)`
    /// pairs.
    ///
    /// Properties defined without an ID (including the implicit host) are
    /// excluded. Order is unspecified. `&Device` also implements
    /// [`IntoIterator`] over the same snapshot.
    #[must_use]
    pub fn id_properties(&self) -> Vec<(String, PropertyValue)> {
        let state = self.inner.state.lock();
        state
            .ids
            .values()
            .filter_map(|name| {
                state
                    .slots
                    .get(name)
                    .map(|slot| (name.clone(), slot.value.clone()))
            })
            .collect()
    }

    /// Applies a decoded status update.
    ///
    /// Every call refreshes liveness: the device is forced online (a
    /// suppressed no-op when already online) and, when the message carries
    /// `validFor`, the TTL is re-armed to that many seconds. The
    /// host/property delta is applied only when the message carries a
    /// serial strictly greater than the last applied one (or the first
    /// ever); replayed and out-of-order serials refresh liveness without
    /// re-applying their delta.
    ///
    /// # Panics
    ///
    /// Panics when the message carries `validFor` outside a tokio runtime,
    /// since the expiry timer is a spawned task.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use std::time::Duration;
    /// use shellr_lib::{Device, StatusUpdate};
    ///
    /// let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
    /// device.set_online(false);
    ///
    /// device.update(&StatusUpdate::new().with_serial(1).with_valid_for(30));
    /// assert!(device.online());
    /// assert_eq!(device.ttl(), Duration::from_secs(30));
    /// # }
    /// ```
    pub fn update(&self, msg: &StatusUpdate) {
        tracing::trace!(device = %self.inner.id, serial = ?msg.serial, "applying status update");
        let mut events = Vec::new();
        {
            let mut state = self.inner.state.lock();
            state.transition_online(true, &mut events);

            if let Some(valid_for) = msg.valid_for {
                self.arm_ttl(&mut state, Duration::from_secs(valid_for));
            }

            if let Some(serial) = msg.serial {
                if state.last_serial.is_none_or(|last| serial > last) {
                    self.apply_delta(&mut state, msg, &msg.payload, &mut events);
                    state.last_serial = Some(serial);
                } else {
                    tracing::trace!(device = %self.inner.id, serial, "stale serial, skipping delta");
                }
            }
        }
        self.emit(events);
    }

    /// Applies the substantive delta of one update: the host change, if
    /// any, and the per-property payload records.
    ///
    /// Records addressing an unknown property ID are skipped silently;
    /// the payload format is forward-compatible by design. Normally
    /// invoked through [`update`](Device::update), which adds liveness
    /// refresh and serial dedup on top.
    pub fn apply_update(&self, msg: &StatusUpdate, payload: &[PayloadRecord]) {
        let mut events = Vec::new();
        {
            let mut state = self.inner.state.lock();
            self.apply_delta(&mut state, msg, payload, &mut events);
        }
        self.emit(events);
    }

    /// Subscribes to the device's async event stream.
    ///
    /// The receiver observes the same events, in the same order, as the
    /// synchronous listeners. See [`EventBus`] for lag semantics.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.inner.bus.subscribe()
    }

    fn apply_delta(
        &self,
        state: &mut DeviceState,
        msg: &StatusUpdate,
        payload: &[PayloadRecord],
        events: &mut Vec<DeviceEvent>,
    ) {
        if let Some(host) = &msg.host {
            if let Err(error) = state.store(Self::HOST, PropertyValue::from(host.as_str()), events)
            {
                tracing::warn!(device = %self.inner.id, %error, "host update rejected");
            }
        }

        for record in payload {
            let Some(id) = record.property_id() else {
                tracing::trace!(device = %self.inner.id, ?record, "payload record without a usable id");
                continue;
            };
            let Some(name) = state.ids.get(&id).cloned() else {
                tracing::trace!(device = %self.inner.id, id, "payload record for unknown property id");
                continue;
            };
            if let Err(error) = state.store(&name, record.value(), events) {
                tracing::warn!(
                    device = %self.inner.id,
                    property = %name,
                    %error,
                    "payload value rejected by validator"
                );
            }
        }
    }

    /// Cancels the pending timer and, for a nonzero window, arms a fresh
    /// one. Must be called with the state lock held.
    fn arm_ttl(&self, state: &mut DeviceState, ttl: Duration) {
        state.timer_generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.ttl = ttl;

        if ttl.is_zero() {
            tracing::trace!(device = %self.inner.id, "expiry timer cleared");
            return;
        }

        tracing::debug!(device = %self.inner.id, ?ttl, "arming expiry timer");
        let generation = state.timer_generation;
        // The task holds only a weak reference: a discarded device is not
        // kept alive by its own timer.
        let weak = Arc::downgrade(&self.inner);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                Device { inner }.expire(generation);
            }
        }));
    }

    /// Timer-fire path: marks the device offline unless the timer was
    /// superseded while this task was waking up.
    fn expire(&self, generation: u64) {
        let mut events = Vec::new();
        {
            let mut state = self.inner.state.lock();
            if state.timer_generation != generation {
                return;
            }
            state.timer = None;
            state.transition_online(false, &mut events);
        }
        if !events.is_empty() {
            tracing::debug!(device = %self.inner.id, "liveness window elapsed, device offline");
        }
        self.emit(events);
    }

    /// Delivers events collected under the state lock: synchronously to
    /// registered callbacks, then onto the async bus.
    fn emit(&self, events: Vec<DeviceEvent>) {
        for event in events {
            self.inner.callbacks.dispatch(self, &event);
            self.inner.bus.publish(event);
        }
    }
}

impl Clone for Device {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Device")
            .field("device_type", &self.inner.device_type)
            .field("id", &self.inner.id)
            .field("online", &state.online)
            .field("ttl", &state.ttl)
            .field("properties", &state.slots.len())
            .finish_non_exhaustive()
    }
}

impl Drop for DeviceInner {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().timer.take() {
            timer.abort();
        }
    }
}

impl IntoIterator for &Device {
    type Item = (String, PropertyValue);
    type IntoIter = std::vec::IntoIter<(String, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.id_properties().into_iter()
    }
}

impl Subscribable for Device {
    fn on_online<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_online(callback)
    }

    fn on_offline<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_offline(callback)
    }

    fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &PropertyValue, &PropertyValue, &Device) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_change(callback)
    }

    fn on_property_changed<F>(&self, property: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&PropertyValue, &PropertyValue, &Device) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_property_changed(property, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }
}
