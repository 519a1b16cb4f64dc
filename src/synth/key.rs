use super::envelope::{EnvelopeRates, EnvelopeStage, CUTOFF_AMPLITUDE};

/// One chromatic note slot and its envelope.
///
/// The amplitude moves geometrically: every produced frame multiplies it by
/// `amplitude_delta`, which is captured from the keyboard rates whenever the key
/// changes stage.
#[derive(Debug, Clone, Copy)]
pub struct Key {
    frequency: f64,
    amplitude: f64,
    initial_amplitude: f64,
    amplitude_delta: f64,
    key_down: bool,
    stage: EnvelopeStage,
}

impl Key {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn initial_amplitude(&self) -> f64 {
        self.initial_amplitude
    }

    pub fn amplitude_delta(&self) -> f64 {
        self.amplitude_delta
    }

    pub fn is_key_down(&self) -> bool {
        self.key_down
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage.is_active()
    }

    pub(crate) fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Restart the attack from the floor, whatever the key was doing.
    pub(crate) fn press(&mut self, velocity: f64, rates: &EnvelopeRates) {
        self.key_down = true;
        self.stage = EnvelopeStage::Attacking;
        self.initial_amplitude = velocity;
        self.amplitude_delta = rates.attack;
        self.amplitude = CUTOFF_AMPLITUDE;
    }

    /// With the pedal down the key keeps its current rate. An idle key stays
    /// idle; only a press brings it back.
    pub(crate) fn release(&mut self, foot_pedal: bool, rates: &EnvelopeRates) {
        self.key_down = false;

        if !foot_pedal {
            self.amplitude_delta = rates.decay;
            if self.is_active() {
                self.stage = EnvelopeStage::Releasing;
            }
        }
    }

    /// Step the envelope by one frame.
    pub(crate) fn advance(&mut self, foot_pedal: bool, rates: &EnvelopeRates) {
        if self.amplitude > self.initial_amplitude {
            self.amplitude_delta = rates.sustain;
            self.stage = EnvelopeStage::Sustaining;
        }

        self.amplitude *= self.amplitude_delta;

        if self.amplitude <= CUTOFF_AMPLITUDE {
            self.stage = EnvelopeStage::Idle;
        }

        if !self.key_down && !foot_pedal && self.is_active() {
            self.release(foot_pedal, rates);
        }
    }

    #[cfg(test)]
    pub(crate) fn force_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }
}

impl Default for Key {
    fn default() -> Self {
        Self {
            frequency: 0.0,
            amplitude: CUTOFF_AMPLITUDE,
            initial_amplitude: 0.0,
            amplitude_delta: 1.0,
            key_down: false,
            stage: EnvelopeStage::Idle,
        }
    }
}
