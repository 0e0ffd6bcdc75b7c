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

//! The coordinates a [`Generator`](crate::Generator) embeds in every identifier.

use crate::layout::{MAX_DATACENTER_ID, MAX_WORKER_ID};
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The (datacenter, worker) coordinate pair of a generator.
///
/// How coordinates are assigned to processes is up to your deployment (e.g. a configuration file or your
/// orchestration tooling). Every process that produces identifiers concurrently must use a distinct pair. With the
/// `serde` feature, this type can be read straight from your configuration.
///
/// The fields are signed so that misconfigured (negative) values survive until they're validated and can be reported
/// as they were given.
///
/// # Example
///
/// ```
/// use snowdrift::GeneratorConfig;
///
/// assert!(GeneratorConfig::new(3, 31).validate().is_ok());
/// assert!(GeneratorConfig::new(32, 0).validate().is_err());
/// assert!(GeneratorConfig::new(0, -1).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct GeneratorConfig {
    /// The datacenter ID, within `0..=31`.
    pub datacenter_id: i64,
    /// The worker ID, within `0..=31`.
    pub worker_id: i64,
}

impl GeneratorConfig {
    /// Creates a configuration for the given coordinates without validating them.
    pub fn new(datacenter_id: i64, worker_id: i64) -> Self {
        Self {
            datacenter_id,
            worker_id,
        }
    }

    /// Checks that both coordinates are within their range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoordinates`] if either coordinate is negative or exceeds its maximum.
    pub fn validate(&self) -> Result<()> {
        self.coordinates().map(|_| ())
    }

    /// Returns the validated coordinates as they're stored in an identifier.
    pub(crate) fn coordinates(&self) -> Result<(u64, u64)> {
        let in_range = |value: i64, max: u64| u64::try_from(value).is_ok_and(|value| value <= max);
        if !in_range(self.datacenter_id, MAX_DATACENTER_ID) || !in_range(self.worker_id, MAX_WORKER_ID) {
            return Err(Error::InvalidCoordinates {
                datacenter_id: self.datacenter_id,
                worker_id: self.worker_id,
            });
        }
        Ok((self.datacenter_id as u64, self.worker_id as u64))
    }
}

// End skip coverage
