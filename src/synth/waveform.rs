use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Unipolar overtone shapes. Every variant evaluates into `[0, 1]`, so a
/// sounding key always biases the mix positive.
///
/// The single-letter aliases are the waveform codes of the legacy config
/// format (`s` sine, `t` triangle, `S` square).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    #[serde(alias = "s")]
    Sine,
    #[serde(alias = "t")]
    Triangle,
    #[serde(alias = "S")]
    Square,
}

impl WaveformKind {
    pub fn evaluate(self, phase: f64) -> f64 {
        match self {
            WaveformKind::Sine => 0.5 + 0.5 * phase.sin(),
            WaveformKind::Triangle => 0.5 + 0.5 * phase.cos().asin() / FRAC_PI_2,
            // round() goes half away from zero, so sin(x) == 0 lands on 1
            WaveformKind::Square => (0.5 + 0.5 * phase.sin()).round(),
        }
    }
}
