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

//! Multi-track block interleaving for WebM/Matroska style containers.
//!
//! Encoders produce frames per track, each at its own pace. A container wants
//! blocks in one stream, roughly ordered by timestamp across all tracks. The
//! [`MultiTrackSorter`] sits between the two: one pump thread per track feeds a
//! bounded-lookahead k-way merge, and frames that show up after the output moved
//! past them are dropped or written out of order, per [`OutdatedPolicy`].
//!
//! ```
//! use blockmux::{Frame, MultiTrackSorter, OutdatedPolicy, SorterConfig};
//!
//! let audio = vec![Frame::new(0, true, 0, vec![1]), Frame::new(0, true, 20, vec![2])];
//! let video = vec![Frame::new(1, true, 0, vec![3]), Frame::new(1, false, 33, vec![4])];
//!
//! let config = SorterConfig::new(2, 4, OutdatedPolicy::Drop)?;
//! let mut blocks: Vec<Frame> = Vec::new();
//! let stats = MultiTrackSorter::new(config)?
//!     .intercept(vec![audio.into_iter(), video.into_iter()], &mut blocks)?;
//!
//! let order: Vec<(u64, i64)> = blocks.iter().map(|f| (f.track_number, f.timestamp)).collect();
//! assert_eq!(order, vec![(0, 0), (1, 0), (0, 20), (1, 33)]);
//! assert_eq!(stats.frames_emitted, 4);
//! # Ok::<(), blockmux::BlockMuxError>(())
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod merge;
pub mod policy;
mod pump;
pub mod sorter;
pub mod statistics;
pub mod track;

pub use config::{SorterConfig, DEFAULT_LOOKAHEAD};
pub use error::{BlockMuxError, Result};
pub use frame::Frame;
pub use merge::{Admission, MergeState};
pub use policy::OutdatedPolicy;
pub use sorter::MultiTrackSorter;
pub use statistics::{InterceptStats, TrackStats};
pub use track::{TrackSink, TrackSource};
