//! Effect-stage contract between a host pipeline and its transform stages
//!
//! A host negotiates a stream format with each stage, then pushes chunks of
//! interleaved f32 samples through them one call at a time. Stages keep
//! their own state between calls; no call may block.

use std::fmt;

/// Highest channel count a stage is expected to handle
pub const MAX_CHANNELS: u16 = 10;

/// Negotiated format of an interleaved sample stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Channels per frame
    pub channels: u16,

    /// Frames per second
    pub rate: u32,
}

impl StreamFormat {
    pub fn new(channels: u16, rate: u32) -> Self {
        Self { channels, rate }
    }

    /// Channel count as an index type
    pub fn channel_count(&self) -> usize {
        self.channels as usize
    }

    /// Whole frames contained in `samples` interleaved samples
    pub fn frames(&self, samples: usize) -> usize {
        samples / self.channel_count().max(1)
    }

    /// Interleaved samples covering `seconds` of audio, truncated to whole frames
    ///
    /// Negative or non-finite durations yield zero.
    pub fn samples_for(&self, seconds: f64) -> usize {
        let frames = self.rate as f64 * seconds;
        if !frames.is_finite() || frames <= 0.0 {
            return 0;
        }
        self.channel_count() * frames as usize
    }

    /// Milliseconds of audio held in `frames` frames, truncated
    pub fn frames_to_ms(&self, frames: usize) -> i64 {
        if self.rate == 0 {
            return 0;
        }
        frames as i64 * 1000 / self.rate as i64
    }

    /// Format is usable by a stage
    pub fn is_valid(&self) -> bool {
        self.channels > 0 && self.channels <= MAX_CHANNELS && self.rate > 0
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ch @ {}Hz", self.channels, self.rate)
    }
}

/// A transform stage in the host's audio pipeline
///
/// Calls arrive strictly one at a time in the order
/// `start → (process | flush)* → finish`, possibly repeated per track, with
/// `adjust_delay` interleaved for position reporting.
///
/// Slices returned by `process` and `finish` borrow either the input chunk
/// or the stage's own output buffer and stay valid until the next call.
pub trait Effect {
    /// Human-readable stage name
    fn name(&self) -> &'static str;

    /// Position in the host's chain; lower runs earlier
    fn order(&self) -> i32;

    /// Adopt a newly negotiated format. A stage may rewrite the format to
    /// the one it will emit.
    fn start(&mut self, format: &mut StreamFormat);

    /// Consume one chunk and return whatever audio is ready downstream
    fn process<'a>(&'a mut self, data: &'a mut Vec<f32>) -> &'a [f32];

    /// Discard or retain buffered audio on a seek or stop.
    ///
    /// Returns true when buffered audio was fully dropped, in which case the
    /// host must reset downstream buffering as well.
    fn flush(&mut self, force: bool) -> bool;

    /// Consume the last chunk of a track and return what is ready downstream
    fn finish<'a>(&'a mut self, data: &'a mut Vec<f32>, end_of_playlist: bool) -> &'a [f32];

    /// Add this stage's buffered latency (ms) to `delay`
    fn adjust_delay(&self, delay: i32) -> i32;

    /// Tear down the stream session
    fn cleanup(&mut self);
}
