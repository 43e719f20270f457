// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for device properties.
//!
//! Shelly device properties are dynamically typed: the same payload slot
//! can carry a boolean relay state, an integer power reading, or a string
//! firmware version. [`PropertyValue`] is the common representation for
//! all of them.

mod property_value;

pub use property_value::PropertyValue;
