//! Audio test signal generation
//!
//! Signals are deterministic so expected crossfade output can be computed
//! exactly from the same inputs.

use hound::{WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;
use xfade_fx::StreamFormat;

/// Standard test sample rate (44.1 kHz)
pub const TEST_SAMPLE_RATE: u32 = 44100;

/// Same value on every channel of every frame
pub fn constant_samples(format: StreamFormat, frames: usize, value: f32) -> Vec<f32> {
    vec![value; frames * format.channel_count()]
}

/// Distinct, small values so misplaced or reordered samples are visible
///
/// Sample `n` is `(n + offset) / 1e6`.
pub fn numbered_samples(format: StreamFormat, frames: usize, offset: usize) -> Vec<f32> {
    (0..frames * format.channel_count())
        .map(|n| (n + offset) as f32 / 1.0e6)
        .collect()
}

/// Sine wave on every channel
///
/// # Arguments
/// * `frequency_hz` - Sine wave frequency in Hz (e.g., 440.0 for A4)
/// * `amplitude` - Amplitude 0.0-1.0 (0.5 recommended to avoid clipping)
pub fn sine_samples(
    format: StreamFormat,
    frames: usize,
    frequency_hz: f32,
    amplitude: f32,
) -> Vec<f32> {
    let mut samples = Vec::with_capacity(frames * format.channel_count());
    for frame in 0..frames {
        let t = frame as f32 / format.rate as f32;
        let value = amplitude * (2.0 * PI * frequency_hz * t).sin();
        samples.extend(std::iter::repeat(value).take(format.channel_count()));
    }
    samples
}

/// Write a 16-bit sine WAV file
///
/// # Returns
/// * `Ok(())` - File created successfully
/// * `Err` - I/O or encoding error
pub fn write_sine_wav<P: AsRef<Path>>(
    path: P,
    format: StreamFormat,
    duration_ms: u64,
    frequency_hz: f32,
    amplitude: f32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: format.channels,
        sample_rate: format.rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;

    let total_frames = (format.rate as u64 * duration_ms / 1000) as usize;
    for sample in sine_samples(format, total_frames, frequency_hz, amplitude) {
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }

    writer.finalize()?;
    Ok(())
}
