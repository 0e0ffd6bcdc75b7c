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

//! Time sources for [sequencing domains](crate::SequencingDomain).

use crate::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// A source of wall-clock time with millisecond precision.
///
/// Sequencing domains sample their clock once per produced identifier and repeatedly while waiting for the next
/// millisecond, so implementations should be cheap. The returned value doesn't have to be monotonic. Domains detect
/// clocks that move backwards and refuse to produce identifiers afterwards.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// The system's wall clock.
///
/// Times before the Unix epoch are reported as `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|time| u64::try_from(time.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// A clock that only moves when it's told to.
///
/// Clones share the same reading, so a test can keep one handle to move time while a domain owns another. This is
/// useful to simulate clock regressions or several identifiers in the same millisecond.
///
/// Note that a domain that exhausted the sequence numbers of a millisecond waits until the clock advances. If nothing
/// advances a `ManualClock` in that case, the producing thread spins forever.
///
/// # Example
///
/// ```
/// use snowdrift::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_704_038_400_000);
/// let handle = clock.clone();
/// handle.advance(5);
/// assert_eq!(1_704_038_400_005, clock.now_millis());
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock that reads `millis` milliseconds since the Unix epoch.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Sets the current reading. Setting a smaller value than before simulates a clock regression.
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Moves the clock forward by `millis` milliseconds.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Returns the current reading.
    pub fn get(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_millis(&self) -> u64 {
        self.get()
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    #[inline]
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

// End skip coverage
