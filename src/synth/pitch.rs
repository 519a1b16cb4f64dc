//! Frequency tables for the two tuning systems.
//!
//! Indices are a caller contract: passing a pitch class or interval outside
//! `0..12` panics on the table lookup.

/// Number of semitone positions in an octave.
pub const PITCH_CLASSES: usize = 12;

/// Octave-0 reference frequencies in Hz, C through B.
pub const BASE_PITCHES: [f64; PITCH_CLASSES] = [
    16.35, 17.32, 18.35, 19.45, 20.60, 21.83, 23.12, 24.50, 25.96, 27.50, 29.14, 30.87,
];

/// Just-intonation ratios from unison up to the major seventh.
pub const JUST_RATIOS: [f64; PITCH_CLASSES] = [
    1.0,
    25.0 / 24.0,
    9.0 / 8.0,
    6.0 / 5.0,
    5.0 / 4.0,
    4.0 / 3.0,
    45.0 / 32.0,
    3.0 / 2.0,
    8.0 / 5.0,
    5.0 / 3.0,
    9.0 / 5.0,
    15.0 / 8.0,
];

pub const NOTE_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

fn octave_multiplier(octave: i32) -> f64 {
    2.0_f64.powi(octave + 1)
}

/// Frequency of `interval` above `fundamental` in just intonation.
pub fn frequency_just(fundamental: usize, interval: usize, octave: i32) -> f64 {
    BASE_PITCHES[fundamental] * octave_multiplier(octave) * JUST_RATIOS[interval]
}

/// Equal-tempered frequency of `pitch_class` in `octave`.
pub fn frequency_equal(pitch_class: usize, octave: i32) -> f64 {
    BASE_PITCHES[pitch_class] * octave_multiplier(octave)
}
