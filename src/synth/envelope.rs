use serde::{Deserialize, Serialize};

/// Amplitude below which a key is silent and drops out of the mix.
pub const CUTOFF_AMPLITUDE: f64 = 0.001;

/// Per-sample multiplicative envelope rates.
///
/// `attack` is expected above 1, `decay` inside (0, 1) and `sustain` at or just
/// below 1. None of this is enforced: a rate outside its range simply gives a key
/// that never finishes attacking or never decays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeRates {
    pub attack: f64,
    pub sustain: f64,
    pub decay: f64,
}

impl EnvelopeRates {
    pub fn new(attack: f64, sustain: f64, decay: f64) -> Self {
        Self {
            attack,
            sustain,
            decay,
        }
    }

    /// Human readable complaints about rates that will misbehave.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.attack <= 1.0 {
            warnings.push(format!("attack rate {} will never rise", self.attack));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            warnings.push(format!("decay rate {} will never fall", self.decay));
        }
        if self.sustain > 1.0 {
            warnings.push(format!("sustain rate {} grows while held", self.sustain));
        }
        warnings
    }
}

impl Default for EnvelopeRates {
    fn default() -> Self {
        Self {
            attack: 1.002,
            sustain: 0.99999,
            decay: 0.9998,
        }
    }
}

/// Where a key sits in its envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Idle,
    Attacking,
    Sustaining,
    Releasing,
}

impl EnvelopeStage {
    pub fn is_active(self) -> bool {
        self != EnvelopeStage::Idle
    }
}
