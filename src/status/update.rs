// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded status update messages.

use super::PayloadRecord;

/// An already-decoded status update for one device.
///
/// Transport code decodes each incoming CoIoT message into this shape and
/// hands it to [`Device::update`](crate::Device::update). Every field is
/// optional on the wire; an empty update still refreshes liveness.
///
/// # Examples
///
/// ```
/// use shellr_lib::status::StatusUpdate;
///
/// let msg = StatusUpdate::new()
///     .with_host("192.168.1.3")
///     .with_serial(123)
///     .with_valid_for(30);
/// assert_eq!(msg.valid_for, Some(30));
/// ```
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    /// The device's current network address, when the message carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Monotonically increasing message sequence number, used to suppress
    /// replayed or out-of-order deltas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<u64>,

    /// Liveness window in seconds. When present, the device's TTL is
    /// re-armed to this duration.
    #[serde(rename = "validFor", skip_serializing_if = "Option::is_none")]
    pub valid_for: Option<u64>,

    /// Per-property update records.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<PayloadRecord>,
}

impl StatusUpdate {
    /// Creates an empty status update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host field.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the serial field.
    #[must_use]
    pub fn with_serial(mut self, serial: u64) -> Self {
        self.serial = Some(serial);
        self
    }

    /// Sets the liveness window, in seconds.
    #[must_use]
    pub fn with_valid_for(mut self, seconds: u64) -> Self {
        self.valid_for = Some(seconds);
        self
    }

    /// Sets the property payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Vec<PayloadRecord>) -> Self {
        self.payload = payload;
        self
    }
}
