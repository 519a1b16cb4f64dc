use super::envelope::EnvelopeRates;
use super::error::SynthError;
use super::key::Key;
use super::pitch::{frequency_equal, frequency_just, PITCH_CLASSES};
use tracing::debug;

/// Eight octaves of twelve keys.
pub const KEY_COUNT: usize = 96;

/// Fixed bank of keys, indexed `octave * 12 + pitch_class`. A new keyboard is
/// tuned to just intonation over C so every key has a pitch.
pub struct Keyboard {
    keys: [Key; KEY_COUNT],
    rates: EnvelopeRates,
    foot_pedal: bool,
}

impl Keyboard {
    pub fn new(rates: EnvelopeRates) -> Self {
        let mut keyboard = Self {
            keys: [Key::new(); KEY_COUNT],
            rates,
            foot_pedal: false,
        };
        keyboard.retune_just(0);
        keyboard
    }

    /// Octave of `index` once its pitch class has been remapped. Keys below the
    /// remapped pitch class belong to the octave under the bottom of the board.
    fn octave_of(index: usize, pitch_class: usize) -> i32 {
        let (index, pitch_class) = (index as i32, pitch_class as i32);
        let mut octave = (index - pitch_class) / 12;
        if index < pitch_class {
            octave -= 1;
        }
        octave
    }

    /// Retune every key as a just interval above `fundamental`.
    pub fn apply_just_tuning(&mut self, fundamental: usize) -> Result<(), SynthError> {
        if fundamental >= PITCH_CLASSES {
            return Err(SynthError::FundamentalOutOfRange(fundamental));
        }
        self.retune_just(fundamental);
        debug!(fundamental, "applied just tuning");
        Ok(())
    }

    fn retune_just(&mut self, fundamental: usize) {
        for (index, key) in self.keys.iter_mut().enumerate() {
            let pitch_class = (index + PITCH_CLASSES - fundamental) % PITCH_CLASSES;
            let octave = Self::octave_of(index, pitch_class);
            key.set_frequency(frequency_just(fundamental, pitch_class, octave));
        }
    }

    pub fn apply_equal_tuning(&mut self) {
        for (index, key) in self.keys.iter_mut().enumerate() {
            let pitch_class = index % PITCH_CLASSES;
            let octave = Self::octave_of(index, pitch_class);
            key.set_frequency(frequency_equal(pitch_class, octave));
        }
        debug!("applied equal temperament");
    }

    pub fn note_on(&mut self, index: usize, velocity: f64) -> Result<(), SynthError> {
        let rates = self.rates;
        self.key_mut(index)?.press(velocity, &rates);
        Ok(())
    }

    pub fn note_off(&mut self, index: usize) -> Result<(), SynthError> {
        let (rates, foot_pedal) = (self.rates, self.foot_pedal);
        self.key_mut(index)?.release(foot_pedal, &rates);
        Ok(())
    }

    /// Advance the envelope of every sounding key by one frame.
    pub fn advance_active(&mut self) {
        let (rates, foot_pedal) = (self.rates, self.foot_pedal);
        for key in self.keys.iter_mut().filter(|key| key.is_active()) {
            key.advance(foot_pedal, &rates);
        }
    }

    pub fn set_foot_pedal(&mut self, held: bool) {
        self.foot_pedal = held;
    }

    pub fn foot_pedal(&self) -> bool {
        self.foot_pedal
    }

    pub fn set_envelope_rates(&mut self, rates: EnvelopeRates) {
        self.rates = rates;
    }

    pub fn envelope_rates(&self) -> EnvelopeRates {
        self.rates
    }

    pub fn key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn active_keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter().filter(|key| key.is_active())
    }

    fn key_mut(&mut self, index: usize) -> Result<&mut Key, SynthError> {
        self.keys
            .get_mut(index)
            .ok_or(SynthError::KeyOutOfRange(index))
    }

    #[cfg(test)]
    pub(crate) fn force_amplitude(&mut self, index: usize, amplitude: f64) {
        self.keys[index].force_amplitude(amplitude);
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new(EnvelopeRates::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::envelope::{EnvelopeStage, CUTOFF_AMPLITUDE};
    use crate::synth::pitch::BASE_PITCHES;

    fn frequencies(keyboard: &Keyboard) -> Vec<f64> {
        keyboard.keys().iter().map(Key::frequency).collect()
    }

    #[test]
    fn just_tuning_is_idempotent() {
        for fundamental in 0..PITCH_CLASSES {
            let mut keyboard = Keyboard::default();
            keyboard.apply_just_tuning(fundamental).unwrap();
            let first = frequencies(&keyboard);
            keyboard.apply_just_tuning(fundamental).unwrap();
            assert_eq!(first, frequencies(&keyboard));
        }
    }

    #[test]
    fn just_tuning_on_c_matches_table() {
        let mut keyboard = Keyboard::default();
        keyboard.apply_just_tuning(0).unwrap();
        // C in octave 4 is key 48
        assert_eq!(keyboard.key(48).unwrap().frequency(), BASE_PITCHES[0] * 32.0);
        let fifth = keyboard.key(55).unwrap().frequency();
        assert!((fifth - BASE_PITCHES[0] * 32.0 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn low_keys_drop_an_octave_under_remap() {
        let mut keyboard = Keyboard::default();
        keyboard.apply_just_tuning(3).unwrap();
        // Key 0 (C) is a major sixth above D#, one octave below the board.
        let expected = BASE_PITCHES[3] * 5.0 / 3.0;
        assert!((keyboard.key(0).unwrap().frequency() - expected).abs() < 1e-9);
    }

    #[test]
    fn just_keys_stay_near_equal_temperament() {
        let mut equal = Keyboard::default();
        equal.apply_equal_tuning();
        let quarter_tone = 2.0_f64.powf(1.0 / 24.0);

        for fundamental in 0..PITCH_CLASSES {
            let mut just = Keyboard::default();
            just.apply_just_tuning(fundamental).unwrap();
            for index in 0..KEY_COUNT {
                let ratio = just.key(index).unwrap().frequency()
                    / equal.key(index).unwrap().frequency();
                assert!(
                    ratio < quarter_tone && ratio > 1.0 / quarter_tone,
                    "key {index} under fundamental {fundamental} is off by ratio {ratio}"
                );
            }
        }
    }

    #[test]
    fn rejects_bad_indices() {
        let mut keyboard = Keyboard::default();
        assert!(matches!(
            keyboard.note_on(KEY_COUNT, 1.0),
            Err(SynthError::KeyOutOfRange(96))
        ));
        assert!(matches!(
            keyboard.note_off(200),
            Err(SynthError::KeyOutOfRange(200))
        ));
        assert!(matches!(
            keyboard.apply_just_tuning(12),
            Err(SynthError::FundamentalOutOfRange(12))
        ));
    }

    #[test]
    fn retune_leaves_envelope_alone() {
        let mut keyboard = Keyboard::default();
        keyboard.apply_equal_tuning();
        keyboard.note_on(60, 0.7).unwrap();
        keyboard.advance_active();
        let before = *keyboard.key(60).unwrap();

        keyboard.apply_just_tuning(5).unwrap();
        let after = keyboard.key(60).unwrap();
        assert_eq!(after.amplitude(), before.amplitude());
        assert_eq!(after.stage(), before.stage());
        assert_eq!(after.is_key_down(), before.is_key_down());
        assert_ne!(after.frequency(), before.frequency());
    }

    #[test]
    fn foot_pedal_controls_release_rate() {
        let rates = EnvelopeRates::new(1.01, 0.9999, 0.99);
        let mut keyboard = Keyboard::new(rates);

        keyboard.set_foot_pedal(true);
        keyboard.note_on(10, 1.0).unwrap();
        let before = keyboard.key(10).unwrap().amplitude_delta();
        keyboard.note_off(10).unwrap();
        assert_eq!(keyboard.key(10).unwrap().amplitude_delta(), before);

        keyboard.set_foot_pedal(false);
        keyboard.note_on(11, 1.0).unwrap();
        keyboard.note_off(11).unwrap();
        assert_eq!(keyboard.key(11).unwrap().amplitude_delta(), rates.decay);
    }

    #[test]
    fn lifting_pedal_releases_held_keys() {
        let mut keyboard = Keyboard::new(EnvelopeRates::new(1.01, 0.9999, 0.99));
        keyboard.set_foot_pedal(true);
        keyboard.note_on(20, 1.0).unwrap();
        keyboard.note_off(20).unwrap();
        for _ in 0..50 {
            keyboard.advance_active();
        }
        assert_eq!(keyboard.key(20).unwrap().stage(), EnvelopeStage::Attacking);

        keyboard.set_foot_pedal(false);
        keyboard.advance_active();
        assert_eq!(keyboard.key(20).unwrap().stage(), EnvelopeStage::Releasing);
    }

    #[test]
    fn rate_change_does_not_touch_in_flight_keys() {
        let mut keyboard = Keyboard::new(EnvelopeRates::new(1.01, 0.9999, 0.99));
        keyboard.note_on(30, 1.0).unwrap();
        keyboard.set_envelope_rates(EnvelopeRates::new(1.5, 0.9, 0.5));
        assert_eq!(keyboard.key(30).unwrap().amplitude_delta(), 1.01);

        keyboard.note_off(30).unwrap();
        assert_eq!(keyboard.key(30).unwrap().amplitude_delta(), 0.5);
    }

    #[test]
    fn note_off_on_silent_key_stays_silent() {
        // sustain above 1 would let a stray active key grow forever
        let mut keyboard = Keyboard::new(EnvelopeRates::new(1.01, 1.5, 0.99));
        for octave in 1..=6 {
            keyboard.note_off(octave * PITCH_CLASSES).unwrap();
        }
        assert_eq!(keyboard.active_keys().count(), 0);

        keyboard.advance_active();
        assert_eq!(keyboard.active_keys().count(), 0);
        assert_eq!(keyboard.key(12).unwrap().amplitude(), CUTOFF_AMPLITUDE);
    }

    #[test]
    fn only_active_keys_advance() {
        let mut keyboard = Keyboard::default();
        keyboard.note_on(5, 1.0).unwrap();
        keyboard.advance_active();
        assert!(keyboard.key(5).unwrap().amplitude() > CUTOFF_AMPLITUDE);
        assert_eq!(keyboard.key(6).unwrap().amplitude(), CUTOFF_AMPLITUDE);
        assert_eq!(keyboard.active_keys().count(), 1);
    }
}
