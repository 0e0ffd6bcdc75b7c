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

//! The shared sequencing state of all generators that must not produce duplicates relative to one another.

use crate::layout::{EPOCH_MILLIS, MAX_SEQUENCE, MAX_TIMESTAMP_OFFSET};
use crate::sync::{self, Mutex};
use crate::{Clock, Error, Identifier, Result, SystemClock};
#[cfg(not(loom))]
use lazy_static::lazy_static;
#[cfg(not(loom))]
use std::sync::Arc;
use tracing::{debug, warn};

#[cfg(not(loom))]
lazy_static! {
    static ref GLOBAL_DOMAIN: Arc<SequencingDomain<SystemClock>> = Arc::new(SequencingDomain::new(SystemClock));
}

/// A snapshot of a [`SequencingDomain`]'s mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DomainState {
    /// The clock reading (in milliseconds since the Unix epoch) of the last identifier the domain produced, or `0` if
    /// it didn't produce any identifier yet.
    pub last_timestamp: u64,
    /// The sequence number of the last identifier the domain produced.
    pub sequence: u64,
}

/// The state that all [generators](crate::Generator) sharing it use to produce unique identifiers.
///
/// A domain consists of the last emitted timestamp, the current sequence number, and the clock it samples. A single
/// mutex guards both values and is held for the entire production of an identifier (including the wait for the next
/// millisecond when the sequence numbers of the current millisecond are used up). Thus, at most one caller samples the
/// clock or advances the sequence at any time.
///
/// Generators sharing a domain never produce the same identifier, even if they're configured with different
/// coordinates. In turn, they share the domain's budget of 4096 identifiers per millisecond.
///
/// [`Generator::new`](crate::Generator::new) uses the process-wide [`global`](Self::global) domain. Create separate
/// domains with [`new`](Self::new) if you need an independent budget (e.g. in tests). Note that generators in
/// separate domains *can* produce duplicates if they share their coordinates.
///
/// # Example
///
/// ```
/// use snowdrift::{Generator, ManualClock, SequencingDomain};
/// use std::sync::Arc;
///
/// let clock = ManualClock::new(1_704_038_400_000 + 1000);
/// let domain = Arc::new(SequencingDomain::new(clock.clone()));
/// let first = Generator::with_domain(1, 2, domain.clone());
/// let second = Generator::with_domain(3, 4, domain.clone());
///
/// // Both generators advance the same sequence
/// assert_eq!(0, first.produce().unwrap().sequence());
/// assert_eq!(1, second.produce().unwrap().sequence());
/// assert_eq!(1, domain.state().sequence);
/// ```
#[derive(Debug)]
pub struct SequencingDomain<C = SystemClock>
where
    C: Clock,
{
    state: Mutex<DomainState>,
    clock: C,
}

#[cfg(not(loom))]
impl SequencingDomain<SystemClock> {
    /// Returns the process-wide domain backed by the system clock.
    ///
    /// Every generator created with [`Generator::new`](crate::Generator::new) shares this domain.
    pub fn global() -> Arc<Self> {
        GLOBAL_DOMAIN.clone()
    }
}

impl<C> SequencingDomain<C>
where
    C: Clock,
{
    /// Creates an empty domain that samples the given clock.
    pub fn new(clock: C) -> Self {
        Self {
            state: Mutex::new(DomainState::default()),
            clock,
        }
    }

    /// Returns the clock this domain samples.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns a snapshot of this domain's state.
    pub fn state(&self) -> DomainState {
        *sync::lock(&self.state)
    }

    /// Produces the next identifier for the given (already validated) coordinates.
    ///
    /// The state is only written once every check passed. I.e., if this returns an error, the domain's state is
    /// unchanged.
    pub(crate) fn next(&self, datacenter_id: u64, worker_id: u64) -> Result<Identifier> {
        let mut state = sync::lock(&self.state);
        // Sample the clock *after* we got the lock. A caller that waited for the lock would otherwise compare an
        // outdated reading with the state written by the previous holder.
        let mut now = self.clock.now_millis();
        if now < state.last_timestamp {
            warn!(
                last_timestamp = state.last_timestamp,
                now, "the clock moved backwards, refusing to produce an identifier"
            );
            return Err(Error::ClockMovedBackwards {
                last_timestamp: state.last_timestamp,
                now,
            });
        }
        if now < EPOCH_MILLIS {
            warn!(now, epoch = EPOCH_MILLIS, "the clock is before the identifier epoch");
            return Err(Error::ClockBeforeEpoch { now });
        }

        let sequence = if now == state.last_timestamp {
            let sequence = (state.sequence + 1) & MAX_SEQUENCE;
            if sequence == 0 {
                debug!(
                    last_timestamp = state.last_timestamp,
                    "sequence exhausted, waiting for the next millisecond"
                );
                now = self.wait_for_next_millis(state.last_timestamp);
            }
            sequence
        } else {
            0
        };

        let timestamp_offset = now - EPOCH_MILLIS;
        if timestamp_offset > MAX_TIMESTAMP_OFFSET {
            warn!(now, "the clock exceeds the largest timestamp an identifier can hold");
            return Err(Error::TimestampOverflow);
        }

        state.last_timestamp = now;
        state.sequence = sequence;
        Ok(Identifier::compose(timestamp_offset, datacenter_id, worker_id, sequence))
    }

    /// Re-samples the clock until it's past `last_timestamp` and returns the new reading.
    fn wait_for_next_millis(&self, last_timestamp: u64) -> u64 {
        let mut now = self.clock.now_millis();
        while now <= last_timestamp {
            sync::spin_loop();
            now = self.clock.now_millis();
        }
        now
    }
}

impl<C> Default for SequencingDomain<C>
where
    C: Clock + Default,
{
    fn default() -> Self {
        Self::new(C::default())
    }
}

// End skip coverage
