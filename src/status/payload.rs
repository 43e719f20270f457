// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Position-encoded property records from a status payload.

use crate::types::PropertyValue;

/// One per-property record from a status payload.
///
/// CoIoT payloads address properties positionally instead of by name: a
/// record is a short ordered list whose final element is the new value and
/// whose second-to-last element is the numeric property ID. Leading
/// elements (the channel slot, in current firmware) are not interpreted
/// here and are ignored.
///
/// # Examples
///
/// ```
/// use shellr_lib::status::PayloadRecord;
///
/// // [channel, id, value]
/// let record = PayloadRecord::new(vec![0.into(), 112.into(), true.into()]);
/// assert_eq!(record.property_id(), Some(112));
/// assert_eq!(record.value().as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PayloadRecord(Vec<PropertyValue>);

impl PayloadRecord {
    /// Creates a record from its raw ordered elements.
    #[must_use]
    pub fn new(fields: Vec<PropertyValue>) -> Self {
        Self(fields)
    }

    /// Returns the property ID this record targets.
    ///
    /// `None` when the record is too short to carry an ID, or when the ID
    /// slot does not hold a non-negative integer. Such records are skipped
    /// during delta application.
    #[must_use]
    pub fn property_id(&self) -> Option<u32> {
        let slot = self.0.len().checked_sub(2)?;
        u32::try_from(self.0[slot].as_int()?).ok()
    }

    /// Returns the new value carried by this record.
    ///
    /// The value occupies the final position; an empty record yields
    /// [`PropertyValue::Null`].
    #[must_use]
    pub fn value(&self) -> PropertyValue {
        self.0.last().cloned().unwrap_or_default()
    }

    /// Returns the raw ordered elements.
    #[must_use]
    pub fn fields(&self) -> &[PropertyValue] {
        &self.0
    }
}

impl From<Vec<PropertyValue>> for PayloadRecord {
    fn from(fields: Vec<PropertyValue>) -> Self {
        Self(fields)
    }
}
