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

use std::io::Write;

use blockmux::{BlockMuxError, Frame, TrackSink};

/// Writes every emitted block as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TrackSink for JsonLinesSink<W> {
    fn write_frame(&mut self, frame: Frame) -> blockmux::Result<()> {
        let line =
            serde_json::to_string(&frame).map_err(|e| BlockMuxError::SinkWrite(e.to_string()))?;
        writeln!(self.out, "{}", line).map_err(|e| BlockMuxError::SinkWrite(e.to_string()))
    }
}
