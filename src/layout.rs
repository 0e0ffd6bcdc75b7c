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

//! The bit layout of an [`Identifier`](crate::Identifier).
//!
//! Identifiers consist of a leading `0` bit, 41 bits for the number of milliseconds since [`EPOCH_MILLIS`], 5 bits
//! for the datacenter ID, 5 bits for the worker ID, and 12 bits for the sequence number (most significant first):
//!
//! ```text
//! [0][41 bits: epoch offset][5 bits: datacenter][5 bits: worker][12 bits: sequence]
//! ```
//!
//! The leading `0` bit guarantees that identifiers keep their ordering when stored as signed 64-bit integers.

/// The layout's epoch (`2024-01-01T00:00:00`), in milliseconds since the Unix epoch.
///
/// Note that this value is midnight in UTC+8, i.e. `2023-12-31T16:00:00Z`. Changing it would shift the timestamps of
/// every identifier that was already minted with this layout.
pub const EPOCH_MILLIS: u64 = 1704038400000;

/// The number of bits dedicated to the epoch offset.
pub const TIMESTAMP_BITS: u32 = 41;
/// The number of bits dedicated to the datacenter ID.
pub const DATACENTER_ID_BITS: u32 = 5;
/// The number of bits dedicated to the worker ID.
pub const WORKER_ID_BITS: u32 = 5;
/// The number of bits dedicated to the per-millisecond sequence number.
pub const SEQUENCE_BITS: u32 = 12;

/// The largest valid datacenter ID (`31`).
pub const MAX_DATACENTER_ID: u64 = (1 << DATACENTER_ID_BITS) - 1;
/// The largest valid worker ID (`31`).
pub const MAX_WORKER_ID: u64 = (1 << WORKER_ID_BITS) - 1;
/// The largest sequence number (`4095`). A generator can mint `MAX_SEQUENCE + 1` identifiers per millisecond.
pub const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;
/// The largest epoch offset that fits into an identifier.
pub const MAX_TIMESTAMP_OFFSET: u64 = (1 << TIMESTAMP_BITS) - 1;

pub(crate) const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
pub(crate) const DATACENTER_ID_SHIFT: u32 = WORKER_ID_SHIFT + WORKER_ID_BITS;
pub(crate) const TIMESTAMP_SHIFT: u32 = DATACENTER_ID_SHIFT + DATACENTER_ID_BITS;

const TIMESTAMP_MASK: u64 = MAX_TIMESTAMP_OFFSET << TIMESTAMP_SHIFT;
const DATACENTER_ID_MASK: u64 = MAX_DATACENTER_ID << DATACENTER_ID_SHIFT;
const WORKER_ID_MASK: u64 = MAX_WORKER_ID << WORKER_ID_SHIFT;
const SEQUENCE_MASK: u64 = MAX_SEQUENCE;

/// Combines the four fields into the integer representation of an identifier.
///
/// # Panics
///
/// Panics if any field exceeds its maximum. Generators validate every field before calling this, so a panic here is a
/// bug in the caller.
#[inline]
pub(crate) fn compose(timestamp_offset: u64, datacenter_id: u64, worker_id: u64, sequence: u64) -> i64 {
    assert!(
        timestamp_offset <= MAX_TIMESTAMP_OFFSET
            && datacenter_id <= MAX_DATACENTER_ID
            && worker_id <= MAX_WORKER_ID
            && sequence <= MAX_SEQUENCE
    );
    // `TIMESTAMP_SHIFT + TIMESTAMP_BITS` is 63, so the sign bit is always 0 and the cast is lossless
    ((timestamp_offset << TIMESTAMP_SHIFT)
        | (datacenter_id << DATACENTER_ID_SHIFT)
        | (worker_id << WORKER_ID_SHIFT)
        | sequence) as i64
}

#[inline]
pub(crate) fn timestamp_offset(input: u64) -> u64 {
    (input & TIMESTAMP_MASK) >> TIMESTAMP_SHIFT
}

#[inline]
pub(crate) fn datacenter_id(input: u64) -> u64 {
    (input & DATACENTER_ID_MASK) >> DATACENTER_ID_SHIFT
}

#[inline]
pub(crate) fn worker_id(input: u64) -> u64 {
    (input & WORKER_ID_MASK) >> WORKER_ID_SHIFT
}

#[inline]
pub(crate) fn sequence(input: u64) -> u64 {
    input & SEQUENCE_MASK
}

/// Returns whether the given integer could have been produced with this layout.
#[inline]
pub(crate) fn is_valid(input: i64) -> bool {
    // The only constant part is the leading 0
    input >= 0
}

// End skip coverage
