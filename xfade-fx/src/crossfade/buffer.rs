//! Overlap buffer and output emission
//!
//! The overlap buffer holds interleaved samples that have been accepted by
//! the crossfade stage but not yet released downstream. Trailing audio is
//! appended at the tail; during a fade-in the next stream's leading audio is
//! summed into it from the head; ready audio leaves from the head.
//!
//! All lengths here are in interleaved samples. Callers keep them at whole
//! frames so the buffer never holds a partial frame.

use crate::effect::StreamFormat;
use tracing::trace;

/// Interleaved samples retained for a future crossfade
#[derive(Debug, Clone, Default)]
pub struct OverlapBuffer {
    samples: Vec<f32>,
}

impl OverlapBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length in interleaved samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Move all of `data` onto the tail, leaving `data` empty
    pub fn append(&mut self, data: &mut Vec<f32>) {
        self.samples.append(data);
    }

    /// Extend the tail with `count` samples of silence
    pub fn pad_silence(&mut self, count: usize) {
        self.samples.resize(self.samples.len() + count, 0.0);
    }

    /// Sum `data` into the buffer starting at sample `offset`
    ///
    /// Positions beyond the current tail are ignored.
    pub fn mix_at(&mut self, offset: usize, data: &[f32]) {
        let Some(target) = self.samples.get_mut(offset..) else {
            return;
        };
        for (dst, src) in target.iter_mut().zip(data) {
            *dst += *src;
        }
    }

    /// Drop everything past the first `len` samples
    pub fn truncate(&mut self, len: usize) {
        self.samples.truncate(len);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Replace the contents wholesale (after reformatting)
    pub fn replace(&mut self, samples: Vec<f32>) {
        self.samples = samples;
    }

    /// Move the first `count` samples onto the end of `output`
    pub fn drain_front_into(&mut self, count: usize, output: &mut Vec<f32>) {
        let count = count.min(self.samples.len());
        output.extend(self.samples.drain(..count));
    }
}

/// How eagerly buffered audio above the backlog target is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitRule {
    /// Release any surplus at all
    Exact,

    /// Release only once the surplus reaches half a second, so steady-state
    /// playback moves audio in sizeable batches
    Hysteresis,
}

/// Release the head of `buffer` that exceeds `buffer_needed` samples
///
/// Emitted samples are appended to `output` in order. Only whole frames are
/// released. Returns the number of samples emitted.
pub fn output_data_as_ready(
    buffer: &mut OverlapBuffer,
    format: StreamFormat,
    buffer_needed: usize,
    rule: EmitRule,
    output: &mut Vec<f32>,
) -> usize {
    let channels = format.channel_count().max(1);
    let Some(surplus) = buffer.len().checked_sub(buffer_needed) else {
        return 0;
    };
    let copy = surplus - surplus % channels;

    let ready = match rule {
        EmitRule::Exact => copy > 0,
        EmitRule::Hysteresis => copy > 0 && copy >= channels * (format.rate as usize / 2),
    };
    if !ready {
        return 0;
    }

    buffer.drain_front_into(copy, output);
    trace!(
        "Emitted {} frames ({:?}), {} frames retained",
        copy / channels,
        rule,
        buffer.len() / channels
    );
    copy
}
