//! # xfade effect library (xfade-fx)
//!
//! Real-time crossfade stage for a streaming audio pipeline, plus a small
//! playlist host that drives effect stages over WAV files.
//!
//! **Architecture:** the host calls `start` / `process` / `flush` / `finish`
//! on each [`Effect`] one call at a time; the [`Crossfade`] stage keeps the
//! trailing audio of each stream and blends it into the next.

pub mod crossfade;
pub mod effect;
pub mod error;
pub mod playlist;
pub mod wav;

pub use crossfade::{Crossfade, CrossfadeState};
pub use effect::{Effect, StreamFormat};
pub use error::{Error, Result};
