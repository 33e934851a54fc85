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

//! The multi-track sorter, which interleaves independently produced tracks into
//! one approximately timestamp-ordered block stream.

use std::panic;
use std::sync::mpsc;
use std::thread;

use log::{info, warn};

use crate::config::SorterConfig;
use crate::frame::Frame;
use crate::merge::{Admission, MergeState};
use crate::pump::{PumpEvent, TrackPump};
use crate::statistics::InterceptStats;
use crate::track::{TrackSink, TrackSource};
use crate::{BlockMuxError, Result};

/// Merges N per-track frame streams into a single output.
///
/// A sorter is built from a validated [`SorterConfig`] and driven exactly once by
/// [`MultiTrackSorter::intercept`].
#[derive(Debug, Clone)]
pub struct MultiTrackSorter {
    config: SorterConfig,
}

impl MultiTrackSorter {
    pub fn new(config: SorterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SorterConfig {
        &self.config
    }

    /// Run the session to completion.
    ///
    /// Starts one pump thread per source and writes frames to `sink` on the calling
    /// thread until every source is exhausted. Blocks until then; there is no
    /// timeout and no way to stop early other than closing all sources.
    ///
    /// Fails only before anything starts, when the number of sources does not match
    /// the configured track count. Outdated frames are resolved by the configured
    /// policy and sink failures are logged and counted; neither stops the merge.
    /// A panic in a source is re-raised here once the other tracks drained. A panic
    /// in the sink unwinds out of this call after the pumps stopped.
    ///
    /// Tracks are identified by their position in `sources`, not by
    /// [`Frame::track_number`]: frames with equal timestamps are written in
    /// ascending source order. Pass sources sorted by track number to get ties
    /// broken by track number.
    pub fn intercept<S, K>(self, sources: Vec<S>, sink: &mut K) -> Result<InterceptStats>
    where
        S: TrackSource,
        K: TrackSink + ?Sized,
    {
        if sources.len() != self.config.track_count {
            return Err(BlockMuxError::TrackCountMismatch {
                expected: self.config.track_count,
                actual: sources.len(),
            });
        }

        let mut merge = MergeState::new(&self.config);
        let mut sink_errors = 0u64;
        let (events_tx, events) = mpsc::sync_channel(0);

        let panicked = thread::scope(|scope| {
            // Dropped on unwind, which hangs up on pumps blocked in send.
            let events = events;
            let pumps: Vec<TrackPump> = sources
                .into_iter()
                .enumerate()
                .map(|(track, source)| TrackPump::spawn(scope, track, source, events_tx.clone()))
                .collect();
            drop(events_tx);

            let mut live = pumps.len();
            while live > 0 {
                let Ok(event) = events.recv() else {
                    break;
                };
                match event {
                    PumpEvent::Frame { track, frame } => {
                        if let Admission::WriteNow(frame) = merge.admit(track, frame) {
                            write(sink, frame, &mut sink_errors);
                        }
                    }
                    PumpEvent::Finished { track } => {
                        merge.finish(track);
                        live -= 1;
                    }
                }
                while let Some(frame) = merge.pop_ready() {
                    write(sink, frame, &mut sink_errors);
                }
            }

            let mut panicked = None;
            for pump in pumps {
                let track = pump.track();
                if let Err(payload) = pump.join() {
                    warn!("Track {} pump panicked", track);
                    if panicked.is_none() {
                        panicked = Some(payload);
                    }
                }
            }
            panicked
        });

        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }

        let mut stats = merge.into_stats();
        stats.sink_errors = sink_errors;
        info!(
            "Intercept finished: {} received, {} emitted, {} outdated dropped, {} outdated written, {} sink errors",
            stats.frames_received,
            stats.frames_emitted,
            stats.outdated_dropped,
            stats.outdated_written,
            stats.sink_errors
        );
        Ok(stats)
    }
}

fn write<K: TrackSink + ?Sized>(sink: &mut K, frame: Frame, errors: &mut u64) {
    let (track, timestamp) = (frame.track_number, frame.timestamp);
    if let Err(e) = sink.write_frame(frame) {
        warn!("Failed to write frame track={} ts={}: {}", track, timestamp, e);
        *errors += 1;
    }
}
