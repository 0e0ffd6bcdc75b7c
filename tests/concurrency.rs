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

use snowdrift::layout::EPOCH_MILLIS;
use snowdrift::{Clock, Generator, SequencingDomain, SystemClock};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 1000;

#[test]
fn one_generator_many_callers() {
    let generator = Arc::new(Generator::new(10, 10));
    let barrier = Arc::new(Barrier::new(THREADS));
    let before = SystemClock.now_millis() - EPOCH_MILLIS;

    let threads: Vec<_> = (0..THREADS)
        .map(|_| {
            let generator = generator.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                generator.produce().unwrap()
            })
        })
        .collect();
    let ids: Vec<_> = threads.into_iter().map(|thread| thread.join().unwrap()).collect();
    let after = SystemClock.now_millis() - EPOCH_MILLIS;

    let set: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(THREADS, set.len());
    for id in ids {
        assert!(id.get() > 0);
        assert_eq!(10, id.datacenter_id());
        assert_eq!(10, id.worker_id());
        assert!(
            (before..=after).contains(&id.timestamp_offset()),
            "{} isn't within {before}..={after}",
            id.timestamp_offset()
        );
    }
    assert!(!generator.is_poisoned());
}

#[test]
fn generators_sharing_a_domain() {
    const GENERATORS: usize = 8;
    const IDS: usize = 5_000;

    let domain = Arc::new(SequencingDomain::new(SystemClock));
    let threads: Vec<_> = (0..GENERATORS)
        .map(|worker_id| {
            let generator = Generator::with_domain(1, worker_id as i64, domain.clone());
            thread::spawn(move || {
                let ids: Vec<_> = (0..IDS).map(|_| generator.produce().unwrap()).collect();
                // Identifiers of a single caller are strictly increasing
                assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
                ids
            })
        })
        .collect();

    let mut set = HashSet::with_capacity(GENERATORS * IDS);
    let mut slots = HashSet::with_capacity(GENERATORS * IDS);
    for id in threads.into_iter().flat_map(|thread| thread.join().unwrap()) {
        assert!(set.insert(id));
        // The domain is shared, so even the (timestamp, sequence) pairs are unique across coordinates
        assert!(slots.insert((id.timestamp_offset(), id.sequence())));
    }
    assert_eq!(GENERATORS * IDS, set.len());
}

#[test]
fn invalid_generator_under_contention() {
    let generator = Arc::new(Generator::new(-1, 0));
    let threads: Vec<_> = (0..16)
        .map(|_| {
            let generator = generator.clone();
            thread::spawn(move || generator.produce())
        })
        .collect();
    for thread in threads {
        assert!(matches!(
            thread.join().unwrap(),
            Err(snowdrift::Error::InvalidCoordinates {
                datacenter_id: -1,
                worker_id: 0
            })
        ));
    }
}
