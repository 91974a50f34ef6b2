//! Crossfade session states

use std::fmt;

/// Where the crossfade session is in its track/seek cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossfadeState {
    /// Bypass: chunks pass straight through, nothing is buffered
    #[default]
    Off,

    /// Blending the faded-out buffer with the next stream's leading audio
    FadeIn,

    /// Steady accumulation and emission
    Running,

    /// Track ended; buffer holds the automatic overlap awaiting fade-out
    Finished,

    /// Seek or manual change; buffer holds the manual overlap awaiting fade-out
    Flushed,
}

impl CrossfadeState {
    /// Buffer is holding a tail that the next chunk will fade out
    pub fn awaiting_fadeout(self) -> bool {
        matches!(self, CrossfadeState::Finished | CrossfadeState::Flushed)
    }
}

impl fmt::Display for CrossfadeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrossfadeState::Off => "off",
            CrossfadeState::FadeIn => "fade-in",
            CrossfadeState::Running => "running",
            CrossfadeState::Finished => "finished",
            CrossfadeState::Flushed => "flushed",
        };
        f.write_str(name)
    }
}
