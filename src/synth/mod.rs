pub mod config;
pub mod core;
pub mod envelope;
pub mod error;
pub mod event;
pub mod key;
pub mod keyboard;
pub mod pitch;
pub mod timbre;
pub mod waveform;

pub use self::config::{ConfigWatcher, SynthConfig};
pub use self::core::SynthEngine;
pub use self::envelope::{EnvelopeRates, EnvelopeStage, CUTOFF_AMPLITUDE};
pub use self::error::SynthError;
pub use self::event::SynthEvent;
pub use self::key::Key;
pub use self::keyboard::{Keyboard, KEY_COUNT};
pub use self::timbre::{Overtone, Timbre, FULL_SCALE, HARMONIC_ATTENUATION};
pub use self::waveform::WaveformKind;
