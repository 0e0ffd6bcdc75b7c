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

//! A benchmark of identifier production with and without contention on the sequencing domain.
//!
//! A domain can produce at most 4096 identifiers per millisecond, so the throughput measured here is bounded by the
//! wait for the next millisecond on fast machines.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parking_lot::{Condvar, Mutex};
use snowdrift::{Generator, SequencingDomain, SystemClock};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const THREADS: i64 = 10;

fn bench_contended(iters: u64) -> Duration {
    // Use a fresh domain for every sample, so earlier samples can't exhaust the current millisecond
    let domain = Arc::new(SequencingDomain::new(SystemClock));
    let start_benchmark = Arc::new((Mutex::new(false), Condvar::new()));
    // Start one thread per worker ID that waits for the benchmark to start
    let threads = (0..THREADS)
        .map(|worker_id| {
            let generator = Generator::with_domain(0, worker_id, domain.clone());
            let start = start_benchmark.clone();
            thread::spawn(move || {
                let (start_benchmark, cvar) = &*start;
                let mut started = start_benchmark.lock();
                // Wait for the benchmark to start and immediately release the lock
                if !*started {
                    cvar.wait(&mut started);
                }
                drop(started);
                for _ in 0..iters {
                    let _ = black_box(generator.produce().unwrap());
                }
            })
        })
        .collect::<Vec<_>>();
    let (start_benchmark, cvar) = &*start_benchmark;
    let mut start_benchmark = start_benchmark.lock();

    let start = Instant::now();
    *start_benchmark = true;
    drop(start_benchmark);
    cvar.notify_all();
    for thread in threads {
        thread.join().unwrap();
    }
    start.elapsed()
}

fn contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("Generator");
    group.bench_function("produce (10 threads)", |b| b.iter_custom(bench_contended));
}

fn sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("Generator (sequential)");
    let generator = Generator::with_domain(0, 0, Arc::new(SequencingDomain::new(SystemClock)));
    group.bench_function("produce", |b| b.iter(|| black_box(generator.produce())));
    let generator = Generator::new(0, 0);
    group.bench_function("produce (global domain)", |b| b.iter(|| black_box(generator.produce())));
}

criterion_group!(benches, contended, sequential);
criterion_main!(benches);
