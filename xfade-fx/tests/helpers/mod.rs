//! Test helper modules for xfade integration tests
//!
//! Provides deterministic audio for driving the crossfade stage:
//! - In-memory sample generators (sine, numbered ramps, constants)
//! - WAV file generation for playlist round trips

#![allow(dead_code, unused_imports)]

pub mod audio_generator;

pub use audio_generator::{
    constant_samples, numbered_samples, sine_samples, write_sine_wav, TEST_SAMPLE_RATE,
};
