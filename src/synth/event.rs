use super::envelope::EnvelopeRates;
use super::timbre::Timbre;

/// Everything an input adapter can ask of the synth.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthEvent {
    NoteOn { key: usize, velocity: f64 },
    NoteOff { key: usize },
    FootPedal(bool),
    RetuneJust { fundamental: usize },
    RetuneEqual,
    SetTimbre(Timbre),
    SetEnvelopeRates(EnvelopeRates),
}
