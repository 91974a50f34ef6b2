//! Crossfade effect stage
//!
//! Smooths automatic track changes and manual seeks by holding back the
//! tail of the outgoing stream, fading it out, and summing the incoming
//! stream's leading audio into it under a matching fade-in.
//!
//! # Session lifecycle
//!
//! `start` opens a session (or reformats the live one), `process` and
//! `finish` move audio through it, `flush` handles seeks, and `cleanup`
//! drops it. Between calls all state lives in [`Session`]; nothing is
//! shared outside the effect.
//!
//! ```text
//!   OFF --start--> RUNNING | FLUSHED (manual overlap enabled)
//!   FINISHED | FLUSHED --process--> FADEIN --(buffer covered)--> RUNNING
//!   FADEIN | RUNNING --finish--> FINISHED (automatic) | OFF
//!   FINISHED | FLUSHED --finish(end of playlist)--> OFF
//!   any --flush(force)--> RUNNING,  --flush--> FLUSHED (manual overlap enabled)
//! ```
//!
//! # Backlog target
//!
//! Each call recomputes how much audio must stay buffered for the next
//! crossfade. `Flushed` ignores the automatic overlap and `Finished`
//! ignores the manual overlap; every other state honours both.

mod buffer;
mod reformat;
mod state;

pub use buffer::{output_data_as_ready, EmitRule, OverlapBuffer};
pub use reformat::{reformat, ChannelMap};
pub use state::CrossfadeState;

use crate::effect::{Effect, StreamFormat};
use tracing::debug;
use xfade_common::{CrossfadeSettings, FadeCurve};

/// Chain position: after the resampler and channel mixer
pub const CROSSFADE_ORDER: i32 = 5;

/// Live crossfade context for one negotiated stream
#[derive(Debug, Clone)]
pub struct Session {
    state: CrossfadeState,
    format: StreamFormat,
    buffer: OverlapBuffer,
    /// Sample offset into `buffer` up to which incoming audio has been mixed
    fadein_point: usize,
}

impl Session {
    fn new(format: StreamFormat) -> Self {
        Self {
            state: CrossfadeState::Off,
            format,
            buffer: OverlapBuffer::new(),
            fadein_point: 0,
        }
    }

    pub fn state(&self) -> CrossfadeState {
        self.state
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    pub fn buffer(&self) -> &OverlapBuffer {
        &self.buffer
    }

    /// Frames currently held back from downstream
    pub fn buffered_frames(&self) -> usize {
        self.format.frames(self.buffer.len())
    }

    /// Frames of the buffer already blended with incoming audio
    pub fn fadein_frames(&self) -> usize {
        self.format.frames(self.fadein_point)
    }

    fn transition(&mut self, next: CrossfadeState) {
        if self.state != next {
            debug!(
                "Crossfade {} -> {} ({} frames buffered)",
                self.state,
                next,
                self.buffered_frames()
            );
            self.state = next;
        }
    }

    fn buffer_needed(&self, settings: &CrossfadeSettings) -> usize {
        buffer_needed_for_state(settings, self.state, self.format)
    }

    fn emit(&mut self, buffer_needed: usize, rule: EmitRule, output: &mut Vec<f32>) -> usize {
        output_data_as_ready(&mut self.buffer, self.format, buffer_needed, rule, output)
    }

    /// Ramp the whole retained tail down to silence and open the fade-in
    fn run_fadeout(&mut self, curve: FadeCurve) {
        curve.apply(self.buffer.as_mut_slice(), 1.0, 0.0);
        self.fadein_point = 0;
        self.transition(CrossfadeState::FadeIn);
    }

    /// Sum the head of `data` into the faded-out buffer
    ///
    /// Consumed samples are removed from the front of `data`. Once the whole
    /// buffer has been covered the session returns to `Running`.
    fn run_fadein(&mut self, data: &mut Vec<f32>, curve: FadeCurve, no_fade_in: bool) {
        let length = self.buffer.len();

        if self.fadein_point < length {
            let copy = data.len().min(length - self.fadein_point);
            let a = self.fadein_point as f32 / length as f32;
            let b = (self.fadein_point + copy) as f32 / length as f32;

            if !no_fade_in {
                curve.apply(&mut data[..copy], a, b);
            }

            self.buffer.mix_at(self.fadein_point, &data[..copy]);
            data.drain(..copy);
            self.fadein_point += copy;
        }

        if self.fadein_point == length {
            self.transition(CrossfadeState::Running);
        }
    }
}

/// Samples that must stay buffered in `state` for the next crossfade
pub fn buffer_needed_for_state(
    settings: &CrossfadeSettings,
    state: CrossfadeState,
    format: StreamFormat,
) -> usize {
    let mut overlap = 0.0;

    if state != CrossfadeState::Flushed && settings.automatic {
        overlap = settings.length;
    }

    if state != CrossfadeState::Finished && settings.manual {
        overlap = f64::max(overlap, settings.manual_length);
    }

    format.samples_for(overlap)
}

/// The crossfade effect stage
#[derive(Debug, Clone)]
pub struct Crossfade {
    settings: CrossfadeSettings,
    session: Option<Session>,
    output: Vec<f32>,
}

impl Crossfade {
    pub fn new(settings: CrossfadeSettings) -> Self {
        Self {
            settings,
            session: None,
            output: Vec::new(),
        }
    }

    pub fn settings(&self) -> &CrossfadeSettings {
        &self.settings
    }

    /// Replace the settings; takes effect from the next call
    pub fn set_settings(&mut self, settings: CrossfadeSettings) {
        self.settings = settings;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current state; `Off` when no session is open
    pub fn state(&self) -> CrossfadeState {
        self.session
            .as_ref()
            .map_or(CrossfadeState::Off, |session| session.state)
    }

    /// Frames accepted but not yet emitted
    pub fn buffered_frames(&self) -> usize {
        self.session.as_ref().map_or(0, Session::buffered_frames)
    }
}

impl Default for Crossfade {
    fn default() -> Self {
        Self::new(CrossfadeSettings::default())
    }
}

impl Effect for Crossfade {
    fn name(&self) -> &'static str {
        "Crossfade"
    }

    fn order(&self) -> i32 {
        CROSSFADE_ORDER
    }

    fn start(&mut self, format: &mut StreamFormat) {
        let Self {
            settings, session, ..
        } = self;

        if let Some(live) = session
            .as_mut()
            .filter(|live| live.state != CrossfadeState::Off)
        {
            if live.format != *format {
                let remapped = reformat(live.buffer.as_slice(), live.format, *format);
                live.buffer.replace(remapped);

                // Keep the fade-in cursor on the same instant, in whole frames
                let mixed_frames = live.format.frames(live.fadein_point) as u64;
                let moved = (mixed_frames * format.rate as u64)
                    .checked_div(live.format.rate as u64)
                    .unwrap_or(0);
                live.fadein_point =
                    (moved as usize * format.channel_count()).min(live.buffer.len());
            }
            live.format = *format;
            return;
        }

        // Off leaves nothing behind in the buffer, so a fresh session is
        // equivalent to the old one
        let mut fresh = Session::new(*format);
        if settings.manual {
            fresh.transition(CrossfadeState::Flushed);
            let needed = fresh.buffer_needed(settings);
            fresh.buffer.pad_silence(needed);
        } else {
            fresh.transition(CrossfadeState::Running);
        }
        debug!("Crossfade session started at {}", format);
        *session = Some(fresh);
    }

    fn process<'a>(&'a mut self, data: &'a mut Vec<f32>) -> &'a [f32] {
        let Self {
            settings,
            session,
            output,
        } = self;
        let Some(live) = session
            .as_mut()
            .filter(|live| live.state != CrossfadeState::Off)
        else {
            return data.as_slice();
        };

        output.clear();
        let curve = FadeCurve::from_settings(settings);

        if live.state.awaiting_fadeout() {
            live.run_fadeout(curve);
        }

        if live.state == CrossfadeState::FadeIn {
            live.run_fadein(data, curve, settings.no_fade_in);
        }

        if live.state == CrossfadeState::Running {
            live.buffer.append(data);
            let needed = live.buffer_needed(settings);
            live.emit(needed, EmitRule::Hysteresis, output);
        }

        output.as_slice()
    }

    fn flush(&mut self, force: bool) -> bool {
        let Self {
            settings, session, ..
        } = self;
        let Some(live) = session.as_mut() else {
            return true;
        };

        if live.state == CrossfadeState::Off && !force {
            return true;
        }

        if !force && settings.manual {
            live.transition(CrossfadeState::Flushed);
            let needed = live.buffer_needed(settings);
            live.buffer.truncate(needed);
            live.fadein_point = live.fadein_point.min(live.buffer.len());
            return false;
        }

        live.transition(CrossfadeState::Running);
        live.buffer.clear();
        live.fadein_point = 0;
        true
    }

    fn finish<'a>(&'a mut self, data: &'a mut Vec<f32>, end_of_playlist: bool) -> &'a [f32] {
        let Self {
            settings,
            session,
            output,
        } = self;
        let Some(live) = session
            .as_mut()
            .filter(|live| live.state != CrossfadeState::Off)
        else {
            return data.as_slice();
        };

        output.clear();
        let curve = FadeCurve::from_settings(settings);

        if live.state == CrossfadeState::FadeIn {
            live.run_fadein(data, curve, settings.no_fade_in);
        }

        match live.state {
            CrossfadeState::Running => {
                live.buffer.append(data);
                let needed = live.buffer_needed(settings);
                live.emit(needed, EmitRule::Hysteresis, output);
            }
            CrossfadeState::Finished | CrossfadeState::Flushed => {
                live.buffer.append(data);
                let needed = live.buffer_needed(settings);
                live.emit(needed, EmitRule::Exact, output);
            }
            CrossfadeState::FadeIn => {}
            CrossfadeState::Off => unreachable!("finish on a bypassed session"),
        }

        if matches!(live.state, CrossfadeState::FadeIn | CrossfadeState::Running) {
            if settings.automatic {
                live.transition(CrossfadeState::Finished);
                let needed = live.buffer_needed(settings);
                live.emit(needed, EmitRule::Exact, output);
            } else {
                live.transition(CrossfadeState::Off);
                live.emit(0, EmitRule::Exact, output);
            }
        }

        if end_of_playlist && live.state.awaiting_fadeout() {
            curve.apply(live.buffer.as_mut_slice(), 1.0, 0.0);
            live.transition(CrossfadeState::Off);
            live.emit(0, EmitRule::Exact, output);
        }

        output.as_slice()
    }

    fn adjust_delay(&self, delay: i32) -> i32 {
        let Some(live) = &self.session else {
            return delay;
        };
        let buffered_ms = live.format.frames_to_ms(live.buffered_frames());
        delay.saturating_add(i32::try_from(buffered_ms).unwrap_or(i32::MAX))
    }

    fn cleanup(&mut self) {
        if self.session.take().is_some() {
            debug!("Crossfade session closed");
        }
        self.output.clear();
    }
}
