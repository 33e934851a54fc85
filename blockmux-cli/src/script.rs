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

//! Track scripts: per-track frame lists with optional arrival offsets.
//!
//! ```json
//! {
//!   "lookahead": 2,
//!   "policy": "drop",
//!   "tracks": [
//!     [{ "timestamp": 10 }, { "timestamp": 16, "at_ms": 50 }],
//!     [{ "timestamp": 9, "at_ms": 25, "keyframe": true, "payload": [1, 2] }]
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use blockmux::{Frame, OutdatedPolicy, SorterConfig};
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Script has no tracks")]
    NoTracks,

    #[error(transparent)]
    Config(#[from] blockmux::BlockMuxError),
}

/// One scripted frame. `at_ms` is the offset from session start at which the
/// producer hands the frame over.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptFrame {
    pub timestamp: i64,
    #[serde(default)]
    pub keyframe: bool,
    #[serde(default)]
    pub payload: Vec<u8>,
    #[serde(default)]
    pub at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub lookahead: Option<usize>,
    #[serde(default)]
    pub policy: Option<OutdatedPolicy>,
    pub tracks: Vec<Vec<ScriptFrame>>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ScriptError> {
        let script: Script = serde_json::from_str(text)?;
        if script.tracks.is_empty() {
            return Err(ScriptError::NoTracks);
        }
        script.check_track_order();
        Ok(script)
    }

    /// Producers are expected to hand frames over in timestamp order per track.
    fn check_track_order(&self) {
        for (track, frames) in self.tracks.iter().enumerate() {
            if let Some(i) = frames
                .windows(2)
                .position(|w| w[1].timestamp < w[0].timestamp)
            {
                warn!(
                    "Track {} goes back in time at frame {} ({} -> {})",
                    track,
                    i + 1,
                    frames[i].timestamp,
                    frames[i + 1].timestamp
                );
            }
        }
    }

    /// Sorter configuration for this script, command line overrides first.
    pub fn sorter_config(
        &self,
        lookahead: Option<usize>,
        policy: Option<OutdatedPolicy>,
    ) -> Result<SorterConfig, ScriptError> {
        let defaults = SorterConfig::default();
        Ok(SorterConfig::new(
            self.tracks.len(),
            lookahead.or(self.lookahead).unwrap_or(defaults.lookahead),
            policy.or(self.policy).unwrap_or(defaults.policy),
        )?)
    }

    pub fn frame_count(&self) -> usize {
        self.tracks.iter().map(Vec::len).sum()
    }

    /// Start one producer thread per track. Each one feeds a rendezvous channel,
    /// sleeping until a frame's `at_ms` offset unless `paced` is false.
    pub fn spawn_producers(self, paced: bool) -> (Vec<Receiver<Frame>>, Vec<JoinHandle<()>>) {
        let start = Instant::now();
        self.tracks
            .into_iter()
            .enumerate()
            .map(|(track, frames)| {
                let (tx, rx) = mpsc::sync_channel::<Frame>(0);
                let handle = thread::spawn(move || {
                    for f in frames {
                        if paced {
                            let due = start + Duration::from_millis(f.at_ms);
                            let now = Instant::now();
                            if due > now {
                                thread::sleep(due - now);
                            }
                        }
                        let frame = Frame::new(track as u64, f.keyframe, f.timestamp, f.payload);
                        if tx.send(frame).is_err() {
                            debug!("Track {} producer: sorter hung up", track);
                            return;
                        }
                    }
                    debug!("Track {} producer: done", track);
                });
                (rx, handle)
            })
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BURST: &str = r#"{
        "lookahead": 2,
        "policy": "drop",
        "tracks": [
            [{ "timestamp": 10 }, { "timestamp": 11, "keyframe": true }],
            [{ "timestamp": 9, "at_ms": 25, "payload": [1, 2, 3] }]
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script = Script::from_json_str(BURST).unwrap();
        assert_eq!(script.tracks.len(), 2);
        assert_eq!(script.frame_count(), 3);
        assert_eq!(script.lookahead, Some(2));
        assert_eq!(script.policy, Some(OutdatedPolicy::Drop));
        assert_eq!(
            script.tracks[1][0],
            ScriptFrame {
                timestamp: 9,
                keyframe: false,
                payload: vec![1, 2, 3],
                at_ms: 25,
            }
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let script = Script::from_json_str(BURST).unwrap();
        let config = script
            .sorter_config(Some(8), Some(OutdatedPolicy::Write))
            .unwrap();
        assert_eq!(config.track_count, 2);
        assert_eq!(config.lookahead, 8);
        assert_eq!(config.policy, OutdatedPolicy::Write);

        let config = script.sorter_config(None, None).unwrap();
        assert_eq!(config.lookahead, 2);
        assert_eq!(config.policy, OutdatedPolicy::Drop);
    }

    #[test]
    fn test_defaults_when_script_is_silent() {
        let script = Script::from_json_str(r#"{ "tracks": [[], []] }"#).unwrap();
        let config = script.sorter_config(None, None).unwrap();
        assert_eq!(config.lookahead, blockmux::DEFAULT_LOOKAHEAD);
        assert_eq!(config.policy, OutdatedPolicy::Drop);
    }

    #[test]
    fn test_rejects_empty_and_malformed_scripts() {
        assert!(matches!(
            Script::from_json_str(r#"{ "tracks": [] }"#),
            Err(ScriptError::NoTracks)
        ));
        assert!(matches!(
            Script::from_json_str(r#"{ "tracks": [[{ "at_ms": 3 }]] }"#),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn test_producers_tag_track_numbers() {
        let script = Script::from_json_str(BURST).unwrap();
        let (receivers, handles) = script.spawn_producers(false);
        let tracks: Vec<Vec<Frame>> = receivers.into_iter().map(|rx| rx.iter().collect()).collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracks[0].len(), 2);
        assert!(tracks[0].iter().all(|f| f.track_number == 0));
        assert_eq!(tracks[1], vec![Frame::new(1, false, 9, vec![1, 2, 3])]);
    }
}
