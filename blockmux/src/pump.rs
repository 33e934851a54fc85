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

//! One `std::thread` per track moving frames from its source to the sorter.

use std::sync::mpsc::SyncSender;
use std::thread::{self, Scope, ScopedJoinHandle};

use log::debug;

use crate::frame::Frame;
use crate::track::TrackSource;

/// A message sent from a pump thread to the sorter.
#[derive(Debug)]
pub(crate) enum PumpEvent {
    /// The next frame of a track.
    Frame { track: usize, frame: Frame },
    /// The track's source is exhausted. Sent exactly once per pump.
    Finished { track: usize },
}

/// Owns the source while the pump thread runs.
///
/// The events channel is a rendezvous channel, so the frame in hand is the only
/// one buffered: the source is not read again until the sorter took it.
struct Pump<S: TrackSource> {
    track: usize,
    source: S,
    events: SyncSender<PumpEvent>,
}

impl<S: TrackSource> Pump<S> {
    fn run(mut self) {
        while let Some(frame) = self.source.next_frame() {
            let event = PumpEvent::Frame {
                track: self.track,
                frame,
            };
            if self.events.send(event).is_err() {
                debug!("[PUMP {}] Sorter hung up", self.track);
                return;
            }
        }
    }
}

// Also runs while unwinding from a panicking source, so the sorter never waits
// on a track that will not report again.
impl<S: TrackSource> Drop for Pump<S> {
    fn drop(&mut self) {
        debug!("[PUMP {}] Stopped", self.track);
        let _ = self.events.send(PumpEvent::Finished { track: self.track });
    }
}

pub(crate) struct TrackPump<'scope> {
    track: usize,
    handle: ScopedJoinHandle<'scope, ()>,
}

impl<'scope> TrackPump<'scope> {
    pub(crate) fn spawn<'env, S>(
        scope: &'scope Scope<'scope, 'env>,
        track: usize,
        source: S,
        events: SyncSender<PumpEvent>,
    ) -> Self
    where
        S: TrackSource + 'scope,
    {
        let pump = Pump {
            track,
            source,
            events,
        };
        let handle = scope.spawn(move || pump.run());
        Self { track, handle }
    }

    pub(crate) fn track(&self) -> usize {
        self.track
    }

    pub(crate) fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn test_pump_forwards_then_finishes() {
        let (tx, rx) = mpsc::sync_channel(0);
        let frames = vec![
            Frame::new(3, true, 1, vec![1]),
            Frame::new(3, false, 2, vec![2]),
        ];

        thread::scope(|scope| {
            let pump = TrackPump::spawn(scope, 3, frames.into_iter(), tx);
            assert_eq!(pump.track(), 3);

            let mut timestamps = Vec::new();
            loop {
                match rx.recv().unwrap() {
                    PumpEvent::Frame { track, frame } => {
                        assert_eq!(track, 3);
                        timestamps.push(frame.timestamp);
                    }
                    PumpEvent::Finished { track } => {
                        assert_eq!(track, 3);
                        break;
                    }
                }
            }
            assert_eq!(timestamps, vec![1, 2]);
            assert!(pump.join().is_ok());
        });
    }

    #[test]
    fn test_pump_holds_one_frame_until_taken() {
        struct Counting {
            frames: std::vec::IntoIter<Frame>,
            reads: Arc<AtomicUsize>,
        }
        impl TrackSource for Counting {
            fn next_frame(&mut self) -> Option<Frame> {
                self.reads.fetch_add(1, Ordering::SeqCst);
                self.frames.next()
            }
        }

        let reads = Arc::new(AtomicUsize::new(0));
        let source = Counting {
            frames: (0..4)
                .map(|ts| Frame::new(0, false, ts, Vec::new()))
                .collect::<Vec<_>>()
                .into_iter(),
            reads: reads.clone(),
        };

        let (tx, rx) = mpsc::sync_channel(0);
        thread::scope(|scope| {
            let pump = TrackPump::spawn(scope, 0, source, tx);

            // Nobody took the first frame yet, so the source must not be read again.
            thread::sleep(Duration::from_millis(20));
            assert_eq!(reads.load(Ordering::SeqCst), 1);

            let mut received = 0;
            while let Ok(event) = rx.recv() {
                if let PumpEvent::Frame { .. } = event {
                    received += 1;
                }
            }
            assert_eq!(received, 4);
            assert_eq!(reads.load(Ordering::SeqCst), 5);
            pump.join().unwrap();
        });
    }

    #[test]
    fn test_panicking_source_still_reports_finished() {
        struct Exploding;
        impl TrackSource for Exploding {
            fn next_frame(&mut self) -> Option<Frame> {
                panic!("source failed");
            }
        }

        let (tx, rx) = mpsc::sync_channel(0);
        thread::scope(|scope| {
            let pump = TrackPump::spawn(scope, 1, Exploding, tx);
            assert!(matches!(rx.recv(), Ok(PumpEvent::Finished { track: 1 })));
            assert!(pump.join().is_err());
        });
    }
}
