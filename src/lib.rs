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

//! This crate implements a distributed generator for 64-bit snowflake identifiers.
//!
//! Every process (or machine) that produces identifiers is assigned a distinct (datacenter, worker) coordinate pair.
//! Identifiers embed these coordinates together with a millisecond timestamp and a per-millisecond sequence number, so
//! independent processes can mint unique identifiers without any coordination service.
//!
//! The layout is fixed (most significant bit first):
//!
//! | bits  | width | field                                                  |
//! |-------|-------|--------------------------------------------------------|
//! | 63    | 1     | always `0`                                             |
//! | 62–22 | 41    | milliseconds since [`EPOCH_MILLIS`](layout::EPOCH_MILLIS) |
//! | 21–17 | 5     | datacenter ID (`0..=31`)                               |
//! | 16–12 | 5     | worker ID (`0..=31`)                                   |
//! | 11–0  | 12    | sequence number (`0..=4095`)                           |
//!
//! Within a process, all [`Generator`]s created with [`Generator::new`] share one [`SequencingDomain`]: a single
//! mutex-guarded pair of the last timestamp and the sequence number. This means that they never produce the same
//! identifier. Identifiers of one coordinate pair grow with every call. Across coordinate pairs, identifiers are only
//! ordered by the millisecond they were produced in. If the sequence numbers of a millisecond run out, the
//! domain waits for the next millisecond. If the clock moves backwards, generators refuse to produce identifiers.
//!
//! How coordinates are assigned to processes is up to your deployment. Coordinates aren't reassigned at runtime and
//! generator state isn't persisted across restarts.
//!
//! # Example
//!
//! ```
//! use snowdrift::{Generator, GeneratorConfig};
//!
//! // Usually, you'd read this from your configuration
//! let config = GeneratorConfig::new(3, 17);
//! let generator = Generator::from_config(&config);
//!
//! let first = generator.produce().unwrap();
//! let second = generator.produce().unwrap();
//! assert!(first < second);
//! assert_eq!(3, second.datacenter_id());
//! assert_eq!(17, second.worker_id());
//!
//! // Identifiers are plain signed integers that you can store in your database
//! let raw: i64 = second.get();
//! assert!(raw > 0);
//! ```
//!
//! # Logging
//!
//! Snowdrift reports clock problems and invalid coordinates through [`tracing`](https://docs.rs/tracing). It doesn't
//! install a subscriber; events only show up if your application does.

#![warn(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod clock;
mod config;
mod domain;
mod generator;
mod identifier;
pub mod layout;
mod sync;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GeneratorConfig;
pub use domain::{DomainState, SequencingDomain};
pub use generator::Generator;
pub use identifier::Identifier;

use layout::{MAX_DATACENTER_ID, MAX_WORKER_ID};
use std::fmt::{Display, Formatter};

/// Errors that can occur when producing or using an [`Identifier`].
///
/// Every error returned by [`Generator::produce`] poisons the generator. I.e., the generator returns the same error
/// for every later call, and you'll have to create a new generator once the cause is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An error that occurs if a generator's coordinates are negative or exceed their maximum.
    InvalidCoordinates {
        /// The datacenter ID the generator was created with.
        datacenter_id: i64,
        /// The worker ID the generator was created with.
        worker_id: i64,
    },
    /// An error that occurs if the clock reports a time before the last identifier of the domain.
    ///
    /// Producing an identifier now could create a duplicate or break the ordering of identifiers, so the generator
    /// fails instead.
    ClockMovedBackwards {
        /// The time of the domain's last identifier, in milliseconds since the Unix epoch.
        last_timestamp: u64,
        /// The clock's reading, in milliseconds since the Unix epoch.
        now: u64,
    },
    /// An error that occurs if the clock reports a time before [`EPOCH_MILLIS`](layout::EPOCH_MILLIS).
    ClockBeforeEpoch {
        /// The clock's reading, in milliseconds since the Unix epoch.
        now: u64,
    },
    /// An error that occurs if a timestamp exceeds the limits of the underlying data structure.
    ///
    /// Specifically, this error occurs once the epoch offset no longer fits into the identifier's 41 timestamp bits
    /// (in 2093), or if an identifier's timestamp can't be represented as a [`SystemTime`](std::time::SystemTime).
    TimestampOverflow,
    /// An error that occurs when attempting to load an invalid identifier.
    ///
    /// This error occurs when passing a negative integer (or a string that isn't a decimal integer) to
    /// [`Identifier::from_raw`] or its conversions.
    InvalidIdentifier,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidCoordinates {
                datacenter_id,
                worker_id,
            } => {
                write!(
                    f,
                    "coordinate out of range: got datacenter id {datacenter_id} and worker id {worker_id}, but the \
                     datacenter id must be within 0..={MAX_DATACENTER_ID} and the worker id within 0..={MAX_WORKER_ID}"
                )
            }
            Error::ClockMovedBackwards { last_timestamp, now } => {
                write!(
                    f,
                    "clock moved backward: the last identifier was produced at {last_timestamp} ms, but the clock \
                     reports {now} ms"
                )
            }
            Error::ClockBeforeEpoch { now } => {
                write!(
                    f,
                    "the clock reports {now} ms, which precedes the identifier epoch ({} ms)",
                    layout::EPOCH_MILLIS
                )
            }
            Error::TimestampOverflow => {
                write!(f, "the timestamp can't be represented by the underlying data structure")
            }
            Error::InvalidIdentifier => {
                write!(f, "the integer representation is not a valid identifier")
            }
        }
    }
}

impl std::error::Error for Error {}

/// The primary result type of Snowdrift.
pub type Result<T> = std::result::Result<T, Error>;

// End skip coverage
