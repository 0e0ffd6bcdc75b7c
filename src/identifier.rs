/*
 * Copyright © 2023 Archer <archer@nefarious.dev>
 * Licensed under the Apache License, Version 2.0 (the "Licence");
 * you may not use this file except in compliance with the Licence.
 * You may obtain a copy of the Licence at
 *     https://www.apache.org/licenses/LICENSE-2.0
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the Licence is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the Licence for the specific language governing permissions and
 * limitations under the Licence.
 */

//! The [`Identifier`] type and its decoding accessors.

use crate::layout;
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

/// A 64-bit identifier minted by a [`Generator`](crate::Generator).
///
/// Identifiers are pure values: they're unique within their [sequencing domain](crate::SequencingDomain) and ordered
/// by the millisecond they were produced in. An identifier `a` that was produced before `b` in the same domain with
/// the same coordinates satisfies `a < b` as long as the system clock didn't move backwards. Identifiers with
/// different coordinates from the same millisecond are ordered by their coordinates instead.
///
/// Refer to the [`layout`](crate::layout) module for the exact bit layout.
///
/// # Example
///
/// ```
/// use snowdrift::Identifier;
///
/// let id = Identifier::from_raw((1 << 22) | (2 << 17) | (3 << 12) | 4).unwrap();
/// assert_eq!(1, id.timestamp_offset());
/// assert_eq!(2, id.datacenter_id());
/// assert_eq!(3, id.worker_id());
/// assert_eq!(4, id.sequence());
///
/// // Identifiers are displayed as decimal integers and can be parsed back
/// let parsed: Identifier = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "i64"))]
#[repr(transparent)]
pub struct Identifier {
    inner: i64,
}

impl Identifier {
    /// Returns the identifier for the given integer representation.
    ///
    /// If the sign bit is set, the integer can't have been produced by a generator and this returns
    /// [`Error::InvalidIdentifier`] instead.
    pub fn from_raw(input: i64) -> Result<Self> {
        if !layout::is_valid(input) {
            return Err(Error::InvalidIdentifier);
        }
        Ok(Self { inner: input })
    }

    /// Assembles an identifier from fields that the caller already validated.
    pub(crate) fn compose(timestamp_offset: u64, datacenter_id: u64, worker_id: u64, sequence: u64) -> Self {
        Self {
            inner: layout::compose(timestamp_offset, datacenter_id, worker_id, sequence),
        }
    }

    /// Returns the integer representation of this identifier.
    #[inline]
    pub fn get(&self) -> i64 {
        self.inner
    }

    /// Returns this identifier as an unsigned integer.
    ///
    /// The sign bit of an identifier is always `0`, so this conversion preserves both the value and the ordering.
    #[inline]
    pub fn get_u64(&self) -> u64 {
        self.inner as u64
    }

    /// Returns the number of milliseconds between [`EPOCH_MILLIS`](layout::EPOCH_MILLIS) and this identifier's birth.
    #[inline]
    pub fn timestamp_offset(&self) -> u64 {
        layout::timestamp_offset(self.get_u64())
    }

    /// Returns the number of milliseconds between the Unix epoch and this identifier's birth.
    #[inline]
    pub fn timestamp_millis(&self) -> u64 {
        // The offset has at most 41 bits, so this can't overflow
        layout::EPOCH_MILLIS + self.timestamp_offset()
    }

    /// Returns the timestamp of this identifier's birth.
    ///
    /// If the time can't be represented with a `SystemTime` instance on this platform, [`Error::TimestampOverflow`] is
    /// returned instead.
    pub fn timestamp(&self) -> Result<SystemTime> {
        SystemTime::UNIX_EPOCH
            .checked_add(Duration::from_millis(self.timestamp_millis()))
            .ok_or(Error::TimestampOverflow)
    }

    /// Returns the ID of the datacenter that produced this identifier.
    #[inline]
    pub fn datacenter_id(&self) -> u64 {
        layout::datacenter_id(self.get_u64())
    }

    /// Returns the ID of the worker that produced this identifier.
    #[inline]
    pub fn worker_id(&self) -> u64 {
        layout::worker_id(self.get_u64())
    }

    /// Returns this identifier's sequence number.
    ///
    /// A sequence number of `n` means that this is the `n + 1`th identifier its domain produced in this millisecond.
    #[inline]
    pub fn sequence(&self) -> u64 {
        layout::sequence(self.get_u64())
    }
}

impl Display for Identifier {
    /// Displays the identifier as a decimal-encoded integer.
    ///
    /// You can losslessly convert this method's output back into the same identifier using [`FromStr`].
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.parse::<i64>().map_err(|_| Error::InvalidIdentifier)?;
        Self::from_raw(raw)
    }
}

impl TryFrom<i64> for Identifier {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::from_raw(value)
    }
}

impl From<Identifier> for i64 {
    fn from(value: Identifier) -> Self {
        value.inner
    }
}

// Skip coverage: We don't test the coverage of our unit tests
#[cfg(test)]
mod tests {
    use crate::layout::{EPOCH_MILLIS, MAX_DATACENTER_ID, MAX_SEQUENCE, MAX_TIMESTAMP_OFFSET, MAX_WORKER_ID};
    use crate::{Error, Identifier};
    use std::time::{Duration, SystemTime};

    #[test]
    fn from_raw() {
        assert_eq!(0, Identifier::from_raw(0).unwrap().get());
        assert_eq!(i64::MAX, Identifier::from_raw(i64::MAX).unwrap().get());
        assert_eq!(Err(Error::InvalidIdentifier), Identifier::from_raw(-1));
        assert_eq!(Err(Error::InvalidIdentifier), Identifier::from_raw(i64::MIN));
        assert_eq!(Err(Error::InvalidIdentifier), Identifier::try_from(-42));
    }

    #[test]
    fn decode_fields() {
        let id = Identifier::compose(987_654_321, 30, 1, 4000);
        assert_eq!(987_654_321, id.timestamp_offset());
        assert_eq!(30, id.datacenter_id());
        assert_eq!(1, id.worker_id());
        assert_eq!(4000, id.sequence());
        assert_eq!(EPOCH_MILLIS + 987_654_321, id.timestamp_millis());
        assert_eq!(id.get() as u64, id.get_u64());

        let largest = Identifier::compose(MAX_TIMESTAMP_OFFSET, MAX_DATACENTER_ID, MAX_WORKER_ID, MAX_SEQUENCE);
        assert_eq!(i64::MAX, largest.get());
        assert_eq!(MAX_TIMESTAMP_OFFSET, largest.timestamp_offset());
    }

    #[test]
    fn timestamp() {
        assert_eq!(
            SystemTime::UNIX_EPOCH + Duration::from_millis(EPOCH_MILLIS),
            Identifier::from_raw(0).unwrap().timestamp().unwrap()
        );
        assert_eq!(
            SystemTime::UNIX_EPOCH + Duration::from_millis(EPOCH_MILLIS + 1500),
            Identifier::compose(1500, 0, 0, 0).timestamp().unwrap()
        );
    }

    #[test]
    fn ordering() {
        // The timestamp dominates the coordinates, which dominate the sequence number
        assert!(Identifier::compose(1, 0, 0, 0) > Identifier::compose(0, 31, 31, 4095));
        assert!(Identifier::compose(5, 0, 0, 1) > Identifier::compose(5, 0, 0, 0));
        assert!(Identifier::compose(5, 1, 0, 0) > Identifier::compose(5, 0, 31, 4095));
    }

    #[test]
    fn display_and_parse() {
        let id = Identifier::compose(1, 2, 3, 4);
        assert_eq!("4468740", id.to_string());
        assert_eq!(id, "4468740".parse().unwrap());
        assert_eq!(Err(Error::InvalidIdentifier), "-4468740".parse::<Identifier>());
        assert_eq!(Err(Error::InvalidIdentifier), "snow".parse::<Identifier>());
        assert_eq!(Err(Error::InvalidIdentifier), "".parse::<Identifier>());
        assert_eq!(4468740_i64, i64::from(id));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() {
        let id = Identifier::compose(1, 2, 3, 4);
        assert_eq!("4468740", serde_json::to_string(&id).unwrap());
        assert_eq!(id, serde_json::from_str::<Identifier>("4468740").unwrap());
        assert!(serde_json::from_str::<Identifier>("-1").is_err());
    }
}
// End skip coverage
