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

use serde::{Deserialize, Serialize};

use crate::policy::OutdatedPolicy;
use crate::{BlockMuxError, Result};

/// Lookahead used when nothing else is configured.
pub const DEFAULT_LOOKAHEAD: usize = 16;

/// Configuration for a multi-track sorter session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    /// Number of track sources the session will be driven with
    pub track_count: usize,
    /// How many frames may queue up on other tracks while a track has nothing
    /// pending before that track stops being waited for (0 = never wait)
    pub lookahead: usize,
    /// Fate of frames that arrive behind the output
    pub policy: OutdatedPolicy,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            track_count: 1,
            lookahead: DEFAULT_LOOKAHEAD,
            policy: OutdatedPolicy::Drop,
        }
    }
}

impl SorterConfig {
    /// Create a validated configuration
    pub fn new(track_count: usize, lookahead: usize, policy: OutdatedPolicy) -> Result<Self> {
        let config = Self {
            track_count,
            lookahead,
            policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration for `track_count` tracks with the default lookahead and policy
    pub fn with_tracks(track_count: usize) -> Result<Self> {
        Self::new(track_count, DEFAULT_LOOKAHEAD, OutdatedPolicy::default())
    }

    /// Parse a JSON document and validate the result
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BlockMuxError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.track_count < 1 {
            return Err(BlockMuxError::InvalidTrackCount(self.track_count));
        }
        Ok(())
    }
}
