// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded status update messages.
//!
//! Wire decoding is out of scope for this library; transport code produces
//! a [`StatusUpdate`] (with its position-encoded [`PayloadRecord`]s) and
//! feeds it to [`Device::update`](crate::Device::update). The types here
//! deserialize directly from the JSON shape the protocol uses, so a
//! transport adapter can usually go from bytes to `StatusUpdate` with a
//! single `serde_json` call.

mod payload;
mod update;

pub use payload::PayloadRecord;
pub use update::StatusUpdate;
