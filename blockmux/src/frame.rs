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

//! Contains the unit of data exchanged between producers, the sorter and the block writer.

use serde::{Deserialize, Serialize};

/// An encoded frame on its way to becoming a container block.
///
/// Producers guarantee that the timestamps of one track never decrease. Nothing
/// is promised across tracks; restoring that order is the sorter's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// The track this frame belongs to. Becomes the block's track number.
    pub track_number: u64,
    /// Whether decoding can start at this frame.
    #[serde(default)]
    pub keyframe: bool,
    /// Presentation time in container timecode units.
    pub timestamp: i64,
    /// The encoded payload, opaque to the sorter.
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(track_number: u64, keyframe: bool, timestamp: i64, payload: Vec<u8>) -> Self {
        Self {
            track_number,
            keyframe,
            timestamp,
            payload,
        }
    }

    /// Get the size of the payload in bytes
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }
}
