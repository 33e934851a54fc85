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

//! The selection rules of the multi-track sorter, free of any threading.
//!
//! [`MergeState`] is fed one event at a time (a frame delivered by a track, or a
//! track running dry) and hands back the frames that may be written. The sorter
//! drives it from its pump events; tests and simulations can drive it directly
//! with a scripted arrival order.
//!
//! The rules:
//!
//! - While every unfinished track has a frame pending, the earliest pending frame
//!   is always safe to write, since no track can produce anything earlier.
//! - If an unfinished track has nothing pending, the merge waits for it, but only
//!   while at most `lookahead` frames are pending on the other tracks. One more and
//!   the track is delinquent: the earliest pending frame is written without it.
//! - A frame that then arrives behind the watermark is outdated and goes to the
//!   [`OutdatedPolicy`].

use std::collections::VecDeque;

use log::{debug, trace};

use crate::config::SorterConfig;
use crate::frame::Frame;
use crate::policy::OutdatedPolicy;
use crate::statistics::InterceptStats;

/// Outcome of offering a frame to the merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The frame waits for its turn in timestamp order.
    Queued,
    /// The frame was outdated and discarded.
    Dropped,
    /// The frame was outdated and must be written immediately.
    WriteNow(Frame),
}

#[derive(Debug, Default)]
struct TrackState {
    pending: VecDeque<Frame>,
    finished: bool,
    /// Frames emitted from other tracks since this track last had a frame emitted.
    delinquency: u64,
    /// Output moved on while this track was being waited for.
    overtaken: bool,
}

impl TrackState {
    fn is_waiting(&self) -> bool {
        !self.finished && self.pending.is_empty()
    }
}

/// Merge rules for a fixed set of tracks, addressed by index `0..track_count`.
#[derive(Debug)]
pub struct MergeState {
    tracks: Vec<TrackState>,
    lookahead: usize,
    policy: OutdatedPolicy,
    watermark: Option<i64>,
    pending: usize,
    stats: InterceptStats,
}

impl MergeState {
    pub fn new(config: &SorterConfig) -> Self {
        Self {
            tracks: (0..config.track_count)
                .map(|_| TrackState::default())
                .collect(),
            lookahead: config.lookahead,
            policy: config.policy,
            watermark: None,
            pending: 0,
            stats: InterceptStats::new(config.track_count),
        }
    }

    /// Offer the next frame of `track`.
    ///
    /// # Panics
    ///
    /// Panics if `track` is not below the configured track count.
    pub fn admit(&mut self, track: usize, frame: Frame) -> Admission {
        self.stats.frame_received(track);

        if self.is_outdated(track, frame.timestamp) {
            debug!(
                "Outdated frame on track {}: ts={} watermark={:?} policy={}",
                track, frame.timestamp, self.watermark, self.policy
            );
            return match self.policy.resolve(frame) {
                Some(frame) => {
                    self.stats.outdated_written(track);
                    Admission::WriteNow(frame)
                }
                None => {
                    self.stats.outdated_dropped(track);
                    Admission::Dropped
                }
            };
        }

        let state = &mut self.tracks[track];
        state.overtaken = false;
        state.pending.push_back(frame);
        self.pending += 1;
        self.stats.pending(self.pending);
        Admission::Queued
    }

    /// Record that `track` will deliver no more frames.
    ///
    /// # Panics
    ///
    /// Panics if `track` is not below the configured track count.
    pub fn finish(&mut self, track: usize) {
        debug!(
            "Track {} finished with {} frames pending",
            track,
            self.tracks[track].pending.len()
        );
        self.tracks[track].finished = true;
    }

    /// Take the next frame that may be written in order, if any. Equal timestamps
    /// go to the lower track index.
    pub fn pop_ready(&mut self) -> Option<Frame> {
        let (track, _) = self
            .tracks
            .iter()
            .enumerate()
            .filter_map(|(i, state)| state.pending.front().map(|f| (i, f.timestamp)))
            .min_by_key(|&(i, timestamp)| (timestamp, i))?;

        let waiting = self.tracks.iter().filter(|s| s.is_waiting()).count();
        if waiting > 0 {
            if self.pending <= self.lookahead {
                return None;
            }
            debug!(
                "{} track(s) delinquent with {} frames pending ahead, lookahead {}",
                waiting, self.pending, self.lookahead
            );
        }

        let frame = self.tracks[track].pending.pop_front()?;
        self.pending -= 1;
        self.watermark = Some(frame.timestamp);

        for (i, state) in self.tracks.iter_mut().enumerate() {
            if i == track {
                state.delinquency = 0;
            } else if !state.finished {
                state.delinquency += 1;
                self.stats.delinquency(i, state.delinquency);
                if state.pending.is_empty() {
                    state.overtaken = true;
                }
            }
        }

        trace!(
            "Emit track {} ts={} keyframe={}",
            track,
            frame.timestamp,
            frame.keyframe
        );
        self.stats.frame_emitted(track);
        Some(frame)
    }

    /// A frame is outdated once the output passed its timestamp. Equal timestamps
    /// only count for a track the output moved on without.
    fn is_outdated(&self, track: usize, timestamp: i64) -> bool {
        match self.watermark {
            Some(watermark) => {
                timestamp < watermark || (timestamp == watermark && self.tracks[track].overtaken)
            }
            None => false,
        }
    }

    /// Every track finished and nothing is left to write.
    pub fn is_complete(&self) -> bool {
        self.pending == 0 && self.tracks.iter().all(|s| s.finished)
    }

    pub fn watermark(&self) -> Option<i64> {
        self.watermark
    }

    pub fn pending_len(&self) -> usize {
        self.pending
    }

    /// Frames emitted from other tracks since `track` last had one emitted.
    ///
    /// # Panics
    ///
    /// Panics if `track` is not below the configured track count.
    pub fn delinquency(&self, track: usize) -> u64 {
        self.tracks[track].delinquency
    }

    pub fn stats(&self) -> &InterceptStats {
        &self.stats
    }

    pub fn into_stats(self) -> InterceptStats {
        self.stats
    }
}
