//! Remapping retained audio when the stream format changes mid-session
//!
//! Only the overlap buffer goes through here, and only on the rare path
//! where consecutive streams differ in channel count or rate. Channels are
//! picked by nearest index (duplicated, never mixed down) and frames by
//! zero-order hold, so the cost stays linear in the buffer length.

use crate::effect::StreamFormat;
use tracing::debug;

/// Source channel for each output channel, keyed by (from, to) counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMap {
    /// Same count on both sides
    Identity,

    /// Mono source: every output channel reads channel 0
    Duplicate,

    /// Mono target: keep the first source channel
    FirstChannel,

    /// Output channel `c` reads source channel `c × from / to`
    Nearest(Vec<usize>),
}

impl ChannelMap {
    pub fn for_pair(from: usize, to: usize) -> Self {
        match (from, to) {
            (a, b) if a == b => ChannelMap::Identity,
            (1, _) => ChannelMap::Duplicate,
            (_, 1) => ChannelMap::FirstChannel,
            (a, b) => ChannelMap::Nearest((0..b).map(|c| c * a / b).collect()),
        }
    }

    /// Source channel feeding output channel `channel`
    pub fn source(&self, channel: usize) -> usize {
        match self {
            ChannelMap::Identity => channel,
            ChannelMap::Duplicate | ChannelMap::FirstChannel => 0,
            ChannelMap::Nearest(map) => map[channel],
        }
    }
}

/// Remap interleaved `samples` from one format to another
///
/// The result holds `frames × to.rate / from.rate` frames (truncated), each
/// copied from source frame `f × from.rate / to.rate`. Degenerate formats
/// yield an empty buffer.
pub fn reformat(samples: &[f32], from: StreamFormat, to: StreamFormat) -> Vec<f32> {
    if from == to {
        return samples.to_vec();
    }
    if from.channels == 0 || from.rate == 0 || to.channels == 0 || to.rate == 0 {
        return Vec::new();
    }

    let from_channels = from.channel_count();
    let to_channels = to.channel_count();
    let old_frames = samples.len() / from_channels;
    let new_frames = (old_frames as u64 * to.rate as u64 / from.rate as u64) as usize;
    let map = ChannelMap::for_pair(from_channels, to_channels);

    let mut remapped = Vec::with_capacity(new_frames * to_channels);
    for frame in 0..new_frames {
        let source_frame = (frame as u64 * from.rate as u64 / to.rate as u64) as usize;
        let base = source_frame * from_channels;
        remapped.extend((0..to_channels).map(|c| samples[base + map.source(c)]));
    }

    debug!(
        "Reformatted overlap buffer {} -> {}: {} -> {} frames",
        from, to, old_frames, new_frames
    );
    remapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_map_lookup() {
        assert_eq!(ChannelMap::for_pair(2, 2), ChannelMap::Identity);
        assert_eq!(ChannelMap::for_pair(1, 6), ChannelMap::Duplicate);
        assert_eq!(ChannelMap::for_pair(6, 1), ChannelMap::FirstChannel);
        assert_eq!(ChannelMap::for_pair(2, 4), ChannelMap::Nearest(vec![0, 0, 1, 1]));
        assert_eq!(ChannelMap::for_pair(6, 2), ChannelMap::Nearest(vec![0, 3]));
    }

    #[test]
    fn test_stereo_to_mono_keeps_left() {
        let samples = [0.1, 0.9, 0.2, 0.8];
        let out = reformat(&samples, StreamFormat::new(2, 100), StreamFormat::new(1, 100));
        assert_eq!(out, vec![0.1, 0.2]);
    }

    #[test]
    fn test_mono_to_stereo_duplicates() {
        let samples = [0.1, 0.2];
        let out = reformat(&samples, StreamFormat::new(1, 100), StreamFormat::new(2, 100));
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_upsample_holds_frames() {
        let samples = [1.0, 2.0, 3.0];
        let out = reformat(&samples, StreamFormat::new(1, 100), StreamFormat::new(1, 200));
        assert_eq!(out, vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_downsample_drops_frames() {
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = reformat(&samples, StreamFormat::new(1, 200), StreamFormat::new(1, 100));
        assert_eq!(out, vec![1.0, 3.0]);
    }

    #[test]
    fn test_rate_and_channels_together() {
        let samples = [1.0, -1.0, 2.0, -2.0];
        let out = reformat(&samples, StreamFormat::new(2, 100), StreamFormat::new(4, 200));
        assert_eq!(
            out,
            vec![
                1.0, 1.0, -1.0, -1.0, //
                1.0, 1.0, -1.0, -1.0, //
                2.0, 2.0, -2.0, -2.0, //
                2.0, 2.0, -2.0, -2.0,
            ]
        );
    }

    #[test]
    fn test_empty_and_degenerate_inputs() {
        let stereo = StreamFormat::new(2, 44100);
        assert!(reformat(&[], stereo, StreamFormat::new(1, 48000)).is_empty());
        assert!(reformat(&[1.0, 1.0], stereo, StreamFormat::new(2, 0)).is_empty());
        // Too short to survive the downsample
        assert!(reformat(&[1.0, 1.0], stereo, StreamFormat::new(2, 22050)).is_empty());
    }
}
