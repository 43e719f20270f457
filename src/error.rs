// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ShellR` library.
//!
//! The failure surface of this library is intentionally small: property
//! writes can be rejected by a validator, and reads/writes can address a
//! property that was never defined. Everything else (unknown payload IDs,
//! stale serials) is tolerated silently by design of the protocol.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A property value was rejected during validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The named property has not been defined on this device.
    #[error("unknown property: {0}")]
    UnknownProperty(String),
}

/// Errors produced by property validators.
///
/// Validators transform a candidate value before it is stored. When the
/// candidate cannot be made acceptable, the validator reports one of these
/// and the write is abandoned without mutating the device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// The value has the wrong type for this property.
    #[error("expected a {expected} value, got {actual}")]
    WrongType {
        /// The type the property accepts.
        expected: &'static str,
        /// The type that was provided.
        actual: &'static str,
    },

    /// The value is invalid for a property-specific reason.
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
