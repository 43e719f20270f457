// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ShellR` Lib - A Rust library to track the runtime state of Shelly devices.
//!
//! This library models a single networked device: its dynamically-declared
//! properties, its TTL-derived liveness flag, and the routine that applies
//! decoded CoIoT status updates. Transport code (CoAP/HTTP listeners, a
//! device registry) lives outside this crate; it decodes wire bytes into
//! [`StatusUpdate`] records and feeds them in, then reacts to the change
//! notifications that come back out.
//!
//! # Core Concepts
//!
//! - **Properties**: named, dynamically typed values declared at runtime
//!   with [`Device::define_property`]. A property may carry a numeric ID
//!   (making it addressable by compact update payloads), a default, and a
//!   validator that normalizes or rejects every write.
//! - **Liveness**: a device is online until told otherwise. Arming the TTL
//!   starts a one-shot window; if no refreshing update arrives in time the
//!   device transitions offline.
//! - **Updates**: [`Device::update`] refreshes liveness on every message
//!   and applies the host/property delta exactly once per serial.
//! - **Notifications**: listeners subscribe to online/offline transitions
//!   and to property changes, either synchronously via [`Subscribable`] or
//!   asynchronously via [`Device::subscribe`].
//!
//! # Quick Start
//!
//! ```
//! use shellr_lib::{Device, PropertySpec, PayloadRecord, StatusUpdate, Subscribable};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Normally produced by the device-type factory
//!     let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
//!
//!     device.define_property(PropertySpec::new("switch").with_id(112).with_default(false));
//!
//!     device.on_property_changed("switch", |new_value, _old_value, device| {
//!         println!("{}: switch is now {new_value}", device.id());
//!     });
//!     device.on_offline(|device| {
//!         println!("{} went offline", device.id());
//!     });
//!
//!     // Decoded by transport code; [channel, id, value]
//!     let msg = StatusUpdate::new()
//!         .with_serial(1)
//!         .with_valid_for(30)
//!         .with_payload(vec![PayloadRecord::new(vec![0.into(), 112.into(), true.into()])]);
//!
//!     device.update(&msg);
//!     assert_eq!(device.property("switch").unwrap().as_bool(), Some(true));
//! }
//! ```
//!
//! # Async Consumers
//!
//! Synchronous listeners run inline with the call that caused the change.
//! Tasks that prefer a stream can receive the same events from the
//! device's broadcast bus:
//!
//! ```
//! use shellr_lib::{Device, event::DeviceEvent};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let device = Device::new("SHSW-1", "ABC123", "192.168.1.2");
//!     let mut events = device.subscribe();
//!
//!     device.set_online(false);
//!     assert_eq!(events.recv().await.unwrap(), DeviceEvent::Offline);
//! }
//! ```

mod device;
pub mod error;
pub mod event;
pub mod status;
pub mod subscription;
pub mod types;

pub use device::{Device, PropertySpec, Validator};
pub use error::{Error, Result, ValueError};
pub use event::{DeviceEvent, EventBus};
pub use status::{PayloadRecord, StatusUpdate};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::PropertyValue;
