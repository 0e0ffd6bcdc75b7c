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

//! The thread-safe identifier [`Generator`].

use crate::sync::{self, Mutex};
use crate::{Clock, Error, GeneratorConfig, Identifier, Result, SequencingDomain, SystemClock};
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// A thread-safe identifier generator for one (datacenter, worker) coordinate pair.
///
/// Constructing a generator never fails. If the coordinates are out of range, the generator is *poisoned* instead: the
/// validation error is stored and every call to [`produce`](Self::produce) returns it. The same happens if the
/// generator's [domain](SequencingDomain) observes a clock that moved backwards. Once poisoned, a generator never
/// produces another identifier. Discard it and create a new one once the configuration or the clock is fixed.
///
/// Generators are meant to be shared. Wrap them in an [`Arc`] to produce identifiers from multiple threads.
///
/// # Example
///
/// ```
/// use snowdrift::Generator;
/// use std::sync::Arc;
/// use std::thread;
///
/// let generator = Arc::new(Generator::new(1, 7));
/// let res1 = {
///     let generator = generator.clone();
///     thread::spawn(move || {
///         let id = generator.produce().unwrap();
///         println!("Thread 1's identifier is {id}");
///         id
///     })
/// };
/// let res2 = {
///     let generator = generator.clone();
///     thread::spawn(move || {
///         let id = generator.produce().unwrap();
///         println!("Thread 2's identifier is {id}");
///         id
///     })
/// };
/// assert_ne!(res1.join().unwrap(), res2.join().unwrap());
///
/// // Invalid coordinates are reported when producing identifiers
/// let generator = Generator::new(32, 0);
/// assert!(generator.produce().is_err());
/// ```
#[derive(Debug)]
pub struct Generator<C = SystemClock>
where
    C: Clock,
{
    config: GeneratorConfig,
    // Only meaningful while `latched` is `None`
    datacenter_id: u64,
    worker_id: u64,
    domain: Arc<SequencingDomain<C>>,
    latched: Mutex<Option<Error>>,
}

#[cfg(not(loom))]
impl Generator<SystemClock> {
    /// Creates a generator for the given coordinates in the process-wide [global](SequencingDomain::global) domain.
    ///
    /// All generators created with this function share one sequence. I.e., they never produce the same identifier,
    /// but they also share the budget of 4096 identifiers per millisecond, regardless of their coordinates.
    ///
    /// If either coordinate is outside `0..=31`, the returned generator is poisoned with
    /// [`Error::InvalidCoordinates`].
    pub fn new(datacenter_id: i64, worker_id: i64) -> Self {
        Self::with_domain(datacenter_id, worker_id, SequencingDomain::global())
    }

    /// Creates a generator in the global domain from a [`GeneratorConfig`].
    ///
    /// This behaves exactly like [`new`](Self::new).
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.datacenter_id, config.worker_id)
    }
}

impl<C> Generator<C>
where
    C: Clock,
{
    /// Creates a generator for the given coordinates in the given domain.
    ///
    /// Generators in *different* domains don't coordinate with each other. Two such generators with the same
    /// coordinates can produce the same identifier, so prefer [`Generator::new`] unless you need a separate clock or
    /// a separate budget.
    pub fn with_domain(datacenter_id: i64, worker_id: i64, domain: Arc<SequencingDomain<C>>) -> Self {
        let config = GeneratorConfig::new(datacenter_id, worker_id);
        let (coordinates, latched) = match config.coordinates() {
            Ok(coordinates) => (coordinates, None),
            Err(error) => {
                warn!(datacenter_id, worker_id, %error, "created a generator with invalid coordinates");
                ((0, 0), Some(error))
            }
        };
        Self {
            config,
            datacenter_id: coordinates.0,
            worker_id: coordinates.1,
            domain,
            latched: Mutex::new(latched),
        }
    }

    /// Produces the next identifier.
    ///
    /// The identifier is unique within this generator's domain. Identifiers of the same coordinate pair are strictly
    /// increasing: for every identifier `b` produced *after* `a` by a generator with the same coordinates in the same
    /// domain, `a < b` (as long as the system clock doesn't move backwards). Across coordinate pairs, this only holds
    /// if `a` and `b` were produced in different milliseconds. Within one millisecond, the coordinates take precedence
    /// over the sequence number, so a generator with larger coordinates may produce the larger identifier first.
    ///
    /// If this domain already produced 4096 identifiers in the current millisecond, this blocks until the clock
    /// advances.
    ///
    /// # Errors
    ///
    /// If the generator was created with invalid coordinates, this returns [`Error::InvalidCoordinates`]. If the clock
    /// moved backwards since the domain's last identifier, this returns [`Error::ClockMovedBackwards`]. If the clock
    /// is before the identifier epoch or too far in the future to fit into an identifier, this returns
    /// [`Error::ClockBeforeEpoch`] or [`Error::TimestampOverflow`], respectively.
    ///
    /// All of these errors poison the generator: every later call returns the same error without touching the domain.
    #[instrument(
        level = "trace",
        skip(self),
        fields(datacenter_id = self.config.datacenter_id, worker_id = self.config.worker_id)
    )]
    pub fn produce(&self) -> Result<Identifier> {
        if let Some(error) = self.error() {
            return Err(error);
        }
        self.domain
            .next(self.datacenter_id, self.worker_id)
            .map_err(|error| {
                error!(%error, "poisoning the generator");
                // Another thread might have poisoned the generator in the meantime; keep the first error
                sync::lock(&self.latched).get_or_insert_with(|| error.clone());
                error
            })
    }

    /// Returns the datacenter ID this generator was created with.
    pub fn datacenter_id(&self) -> i64 {
        self.config.datacenter_id
    }

    /// Returns the worker ID this generator was created with.
    pub fn worker_id(&self) -> i64 {
        self.config.worker_id
    }

    /// Returns the configuration this generator was created with.
    pub fn config(&self) -> GeneratorConfig {
        self.config
    }

    /// Returns the domain this generator produces identifiers in.
    pub fn domain(&self) -> &Arc<SequencingDomain<C>> {
        &self.domain
    }

    /// Returns the error that poisoned this generator, if any.
    pub fn error(&self) -> Option<Error> {
        sync::lock(&self.latched).clone()
    }

    /// Returns whether this generator is poisoned, i.e. whether [`produce`](Self::produce) always fails.
    pub fn is_poisoned(&self) -> bool {
        sync::lock(&self.latched).is_some()
    }
}

// End skip coverage
