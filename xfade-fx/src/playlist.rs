//! Playlist host
//!
//! Drives one effect stage over a sequence of tracks the way a player's
//! audio path would: negotiate the format, push fixed-size chunks, and end
//! each track either naturally (`finish`) or with a manual change (`flush`).
//! Whatever the stage emits is handed to a [`Sink`].

use crate::effect::{Effect, StreamFormat};
use crate::error::{Error, Result};
use tracing::{debug, info};

/// Default chunk duration pushed per call
pub const DEFAULT_CHUNK_MS: u32 = 20;

/// Decoded audio for one playlist entry
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Label used in logs (usually the file name)
    pub label: String,
    pub format: StreamFormat,
    /// Interleaved samples
    pub samples: Vec<f32>,
}

impl Track {
    pub fn new(label: impl Into<String>, format: StreamFormat, samples: Vec<f32>) -> Self {
        Self {
            label: label.into(),
            format,
            samples,
        }
    }

    pub fn frames(&self) -> usize {
        self.format.frames(self.samples.len())
    }
}

/// Destination for audio leaving the last stage
pub trait Sink {
    /// Accept `samples` emitted in `format`
    fn write(&mut self, format: StreamFormat, samples: &[f32]) -> Result<()>;

    /// Flush and close the destination
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink that records every sample and format switch
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub samples: Vec<f32>,
    /// Formats in the order they were first seen
    pub formats: Vec<StreamFormat>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for VecSink {
    fn write(&mut self, format: StreamFormat, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }
        if self.formats.last() != Some(&format) {
            self.formats.push(format);
        }
        self.samples.extend_from_slice(samples);
        Ok(())
    }
}

/// Totals gathered over one playlist run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub tracks: usize,
    pub frames_in: usize,
    pub frames_out: usize,
    /// Tracks cut short by a manual change
    pub manual_changes: usize,
    /// Flushes after which downstream buffering had to be reset
    pub downstream_resets: usize,
    /// Largest latency reported through `adjust_delay`
    pub max_delay_ms: i32,
}

/// Feeds a playlist through a single effect stage
pub struct PlaylistRunner<E: Effect> {
    effect: E,
    chunk_ms: u32,
    manual_change_after: Option<f64>,
}

impl<E: Effect> PlaylistRunner<E> {
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            chunk_ms: DEFAULT_CHUNK_MS,
            manual_change_after: None,
        }
    }

    /// Duration of each chunk pushed through the stage
    pub fn with_chunk_ms(mut self, chunk_ms: u32) -> Self {
        self.chunk_ms = chunk_ms.max(1);
        self
    }

    /// Cut every track but the last after `seconds`, as a listener skipping
    /// ahead would
    pub fn with_manual_change_after(mut self, seconds: Option<f64>) -> Self {
        self.manual_change_after = seconds.filter(|s| s.is_finite() && *s >= 0.0);
        self
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn into_effect(self) -> E {
        self.effect
    }

    /// Play every track in order, writing stage output to `sink`
    pub fn run(&mut self, tracks: &[Track], sink: &mut dyn Sink) -> Result<RunStats> {
        let mut stats = RunStats::default();

        for (index, track) in tracks.iter().enumerate() {
            let last = index + 1 == tracks.len();
            self.play_track(track, last, sink, &mut stats)?;
            stats.tracks += 1;
        }

        self.effect.cleanup();
        info!(
            "Playlist done: {} tracks, {} frames in, {} frames out",
            stats.tracks, stats.frames_in, stats.frames_out
        );
        Ok(stats)
    }

    fn play_track(
        &mut self,
        track: &Track,
        last: bool,
        sink: &mut dyn Sink,
        stats: &mut RunStats,
    ) -> Result<()> {
        if !track.format.is_valid() {
            return Err(Error::UnsupportedFormat(format!(
                "{}: {}",
                track.label, track.format
            )));
        }

        let mut format = track.format;
        self.effect.start(&mut format);
        if format != track.format {
            // A stage that rewrites the format would need a converter in
            // front of it; this host feeds tracks as decoded
            return Err(Error::UnsupportedFormat(format!(
                "{} asked for {} but {} is {}",
                self.effect.name(),
                format,
                track.label,
                track.format
            )));
        }

        let cut_at = match self.manual_change_after {
            Some(seconds) if !last => format.samples_for(seconds).min(track.samples.len()),
            _ => track.samples.len(),
        };
        let manual_change = cut_at < track.samples.len();
        let played = &track.samples[..cut_at];

        debug!(
            "Playing {} ({}, {} frames{})",
            track.label,
            format,
            format.frames(played.len()),
            if manual_change { ", manual change" } else { "" }
        );

        let chunk_frames = ((format.rate as u64 * self.chunk_ms as u64 / 1000) as usize).max(1);
        let chunk_samples = chunk_frames * format.channel_count();
        let chunk_count = played.len().div_ceil(chunk_samples);

        for (number, chunk) in played.chunks(chunk_samples).enumerate() {
            let final_chunk = number + 1 == chunk_count;
            let mut data = chunk.to_vec();
            stats.frames_in += format.frames(data.len());

            let out = if final_chunk && !manual_change {
                self.effect.finish(&mut data, last)
            } else {
                self.effect.process(&mut data)
            };
            stats.frames_out += format.frames(out.len());
            sink.write(format, out)?;

            stats.max_delay_ms = stats.max_delay_ms.max(self.effect.adjust_delay(0));
        }

        if manual_change {
            stats.manual_changes += 1;
            if self.effect.flush(false) {
                stats.downstream_resets += 1;
                debug!("{} dropped its buffer; downstream reset", self.effect.name());
            }
        } else if chunk_count == 0 {
            let mut empty = Vec::new();
            let out = self.effect.finish(&mut empty, last);
            stats.frames_out += format.frames(out.len());
            sink.write(format, out)?;
        }

        Ok(())
    }
}
