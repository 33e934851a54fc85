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

use thiserror::Error;

/// Result type for blockmux operations
pub type Result<T> = std::result::Result<T, BlockMuxError>;

/// Errors that can occur while setting up or feeding a sorter session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockMuxError {
    #[error("Invalid track count: {0} (at least one track is required)")]
    InvalidTrackCount(usize),

    #[error("Track count mismatch: sorter expects {expected} sources, got {actual}")]
    TrackCountMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Sink is closed")]
    SinkClosed,

    #[error("Sink write failed: {0}")]
    SinkWrite(String),
}
