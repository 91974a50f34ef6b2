//! WAV input and output for the playlist host
//!
//! Integer PCM (8 to 32 bit) and 32-bit float files are read into
//! interleaved f32 in [-1.0, 1.0]. Output is always 32-bit float so the
//! summed crossfade never clips on the way out.

use crate::effect::{StreamFormat, MAX_CHANNELS};
use crate::error::{Error, Result};
use crate::playlist::{Sink, Track};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decode a WAV file into a playlist track
pub fn read_track(path: &Path) -> Result<Track> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.channels > MAX_CHANNELS {
        return Err(Error::UnsupportedFormat(format!(
            "{}: {} channels",
            path.display(),
            spec.channels
        )));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        (format, bits) => {
            return Err(Error::UnsupportedFormat(format!(
                "{}: {}-bit {:?}",
                path.display(),
                bits,
                format
            )))
        }
    };

    let format = StreamFormat::new(spec.channels, spec.sample_rate);
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!(
        "Read {} ({}, {} frames)",
        label,
        format,
        format.frames(samples.len())
    );
    Ok(Track::new(label, format, samples))
}

/// Sink writing 32-bit float WAV
///
/// The file is created on the first non-empty write, in that write's
/// format. Audio arriving later in any other format is rejected.
pub struct WavSink {
    path: PathBuf,
    format: Option<StreamFormat>,
    writer: Option<WavWriter<BufWriter<File>>>,
    frames_written: usize,
}

impl WavSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            writer: None,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl Sink for WavSink {
    fn write(&mut self, format: StreamFormat, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        match self.format {
            Some(open) if open != format => {
                return Err(Error::FormatChange(format!(
                    "{} opened as {}, got {}",
                    self.path.display(),
                    open,
                    format
                )));
            }
            Some(_) => {}
            None => {
                let spec = WavSpec {
                    channels: format.channels,
                    sample_rate: format.rate,
                    bits_per_sample: 32,
                    sample_format: SampleFormat::Float,
                };
                self.writer = Some(WavWriter::create(&self.path, spec)?);
                self.format = Some(format);
                debug!("Opened {} as {}", self.path.display(), format);
            }
        }

        if let Some(writer) = self.writer.as_mut() {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        self.frames_written += format.frames(samples.len());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
            debug!(
                "Closed {} after {} frames",
                self.path.display(),
                self.frames_written
            );
        }
        Ok(())
    }
}
