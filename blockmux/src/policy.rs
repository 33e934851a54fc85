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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// What the sorter does with a frame that arrives after the output has moved past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutdatedPolicy {
    /// Discard the frame. It never reaches the sink.
    #[default]
    Drop,
    /// Forward the frame right away, out of timestamp order.
    Write,
}

impl OutdatedPolicy {
    /// Decide the fate of an outdated frame: `Some` means write it now, `None` means it is gone.
    pub fn resolve(self, frame: Frame) -> Option<Frame> {
        match self {
            OutdatedPolicy::Drop => None,
            OutdatedPolicy::Write => Some(frame),
        }
    }
}

impl fmt::Display for OutdatedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutdatedPolicy::Drop => write!(f, "drop"),
            OutdatedPolicy::Write => write!(f, "write"),
        }
    }
}

impl FromStr for OutdatedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "drop" | "drop-outdated" => Ok(OutdatedPolicy::Drop),
            "write" | "write-outdated" => Ok(OutdatedPolicy::Write),
            _ => Err(format!("Unknown outdated-frame policy: {}", s)),
        }
    }
}
