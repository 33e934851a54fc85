/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::sync::mpsc;
use std::thread;

use blockmux::{Frame, MultiTrackSorter, OutdatedPolicy, SorterConfig, TrackSink};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const FRAMES_PER_TRACK: i64 = 1_000;

struct Discard(u64);

impl TrackSink for Discard {
    fn write_frame(&mut self, frame: Frame) -> blockmux::Result<()> {
        self.0 += black_box(frame).payload.len() as u64;
        Ok(())
    }
}

/// Two producer threads, the second track running 5 ticks ahead of the first.
fn two_track_session(lookahead: usize) {
    let (tx0, rx0) = mpsc::sync_channel::<Frame>(0);
    let (tx1, rx1) = mpsc::sync_channel::<Frame>(0);
    let producer = thread::spawn(move || {
        for i in 0..FRAMES_PER_TRACK {
            let _ = tx0.send(Frame::new(0, false, i, vec![1, 2, 3, 4]));
            let _ = tx1.send(Frame::new(1, false, i + 5, vec![2, 3, 4, 5]));
        }
    });

    let config = SorterConfig::new(2, lookahead, OutdatedPolicy::Drop).unwrap();
    let mut sink = Discard(0);
    MultiTrackSorter::new(config)
        .unwrap()
        .intercept(vec![rx0, rx1], &mut sink)
        .unwrap();
    producer.join().unwrap();
}

fn bench_sorter(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_track_sorter");
    group.throughput(Throughput::Elements(2 * FRAMES_PER_TRACK as u64));
    for lookahead in [0usize, 2, 16] {
        group.bench_with_input(
            BenchmarkId::new("two_tracks", lookahead),
            &lookahead,
            |b, &lookahead| b.iter(|| two_track_session(lookahead)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_sorter);
criterion_main!(benches);
