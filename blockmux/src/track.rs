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

//! Per-track inputs and the shared output of a sorter session.

use std::sync::mpsc::{Receiver, Sender, SyncSender};

use crate::frame::Frame;
use crate::{BlockMuxError, Result};

/// A stream of frames for one track.
///
/// `next_frame` may block until the producer delivers. Returning `None` ends the
/// track; the sorter never calls it again after that.
pub trait TrackSource: Send {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// The single ordered output of a sorter session, usually the block writer.
///
/// Writing may block, which stalls the whole pipeline until the consumer catches up.
pub trait TrackSink {
    fn write_frame(&mut self, frame: Frame) -> Result<()>;
}

impl TrackSource for Receiver<Frame> {
    fn next_frame(&mut self) -> Option<Frame> {
        self.recv().ok()
    }
}

impl TrackSource for std::vec::IntoIter<Frame> {
    fn next_frame(&mut self) -> Option<Frame> {
        self.next()
    }
}

impl<T: TrackSource + ?Sized> TrackSource for Box<T> {
    fn next_frame(&mut self) -> Option<Frame> {
        (**self).next_frame()
    }
}

impl TrackSink for Vec<Frame> {
    fn write_frame(&mut self, frame: Frame) -> Result<()> {
        self.push(frame);
        Ok(())
    }
}

impl TrackSink for Sender<Frame> {
    fn write_frame(&mut self, frame: Frame) -> Result<()> {
        self.send(frame).map_err(|_| BlockMuxError::SinkClosed)
    }
}

impl TrackSink for SyncSender<Frame> {
    fn write_frame(&mut self, frame: Frame) -> Result<()> {
        self.send(frame).map_err(|_| BlockMuxError::SinkClosed)
    }
}

impl<S: TrackSink + ?Sized> TrackSink for &mut S {
    fn write_frame(&mut self, frame: Frame) -> Result<()> {
        (**self).write_frame(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_receiver_source_ends_on_disconnect() {
        let (tx, mut rx) = mpsc::channel();
        tx.send(Frame::new(0, true, 1, vec![1])).unwrap();
        drop(tx);

        assert_eq!(rx.next_frame().map(|f| f.timestamp), Some(1));
        assert_eq!(rx.next_frame(), None);
    }

    #[test]
    fn test_boxed_sources_mix() {
        let (tx, rx) = mpsc::channel();
        tx.send(Frame::new(1, false, 5, Vec::new())).unwrap();
        drop(tx);

        let mut sources: Vec<Box<dyn TrackSource>> = vec![
            Box::new(vec![Frame::new(0, false, 3, Vec::new())].into_iter()),
            Box::new(rx),
        ];
        assert_eq!(sources[0].next_frame().map(|f| f.timestamp), Some(3));
        assert_eq!(sources[1].next_frame().map(|f| f.timestamp), Some(5));
        assert!(sources.iter_mut().all(|s| s.next_frame().is_none()));
    }

    #[test]
    fn test_channel_sink_reports_closed() {
        let (mut tx, rx) = mpsc::channel::<Frame>();
        tx.write_frame(Frame::new(0, false, 0, Vec::new())).unwrap();
        drop(rx);
        assert_eq!(
            tx.write_frame(Frame::new(0, false, 1, Vec::new())),
            Err(BlockMuxError::SinkClosed)
        );
    }

    #[test]
    fn test_vec_sink_through_reference() {
        fn write_one<S: TrackSink>(mut sink: S) {
            sink.write_frame(Frame::new(2, false, 9, Vec::new())).unwrap();
        }

        let mut out: Vec<Frame> = Vec::new();
        write_one(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].track_number, 2);
    }
}
