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

use serde::Serialize;

/// Counters for one track of a sorter session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackStats {
    /// Frames delivered by the track's pump
    pub received: u64,
    /// Frames written to the sink in order
    pub emitted: u64,
    /// Outdated frames discarded
    pub outdated_dropped: u64,
    /// Outdated frames written out of order
    pub outdated_written: u64,
    /// Largest number of frames emitted from other tracks while this track held back
    pub max_delinquency: u64,
}

/// Counters for a whole sorter session, returned by `intercept`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterceptStats {
    pub frames_received: u64,
    pub frames_emitted: u64,
    pub outdated_dropped: u64,
    pub outdated_written: u64,
    /// Sink writes that failed
    pub sink_errors: u64,
    /// Most frames ever pending inside the sorter at once
    pub peak_pending: usize,
    pub tracks: Vec<TrackStats>,
}

impl InterceptStats {
    pub fn new(track_count: usize) -> Self {
        Self {
            tracks: vec![TrackStats::default(); track_count],
            ..Default::default()
        }
    }

    pub fn frame_received(&mut self, track: usize) {
        self.frames_received += 1;
        self.tracks[track].received += 1;
    }

    pub fn frame_emitted(&mut self, track: usize) {
        self.frames_emitted += 1;
        self.tracks[track].emitted += 1;
    }

    pub fn outdated_dropped(&mut self, track: usize) {
        self.outdated_dropped += 1;
        self.tracks[track].outdated_dropped += 1;
    }

    pub fn outdated_written(&mut self, track: usize) {
        self.outdated_written += 1;
        self.tracks[track].outdated_written += 1;
    }

    pub fn delinquency(&mut self, track: usize, count: u64) {
        let stats = &mut self.tracks[track];
        stats.max_delinquency = stats.max_delinquency.max(count);
    }

    pub fn pending(&mut self, pending: usize) {
        self.peak_pending = self.peak_pending.max(pending);
    }

    /// Every received frame has been written or discarded exactly once
    pub fn is_balanced(&self) -> bool {
        self.frames_received == self.frames_emitted + self.outdated_dropped + self.outdated_written
    }
}
