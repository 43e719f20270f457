// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for device state transitions.
//!
//! Every observable transition of a [`Device`](crate::Device) produces a
//! [`DeviceEvent`]. Events are delivered twice: synchronously through the
//! [`CallbackRegistry`](crate::subscription::CallbackRegistry), inline with
//! the call that caused the change, and asynchronously through the
//! [`EventBus`] for tasks that prefer to `recv().await`.
//!
//! # Examples
//!
//! ```
//! use shellr_lib::event::{DeviceEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::Online);
//! ```

mod device_event;
mod event_bus;

pub use device_event::DeviceEvent;
pub use event_bus::EventBus;
