use super::error::SynthError;
use super::waveform::WaveformKind;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Largest magnitude of a signed 16-bit sample.
pub const FULL_SCALE: f64 = 32767.0;

/// Gain applied before each successive overtone. It compounds, so the n-th
/// overtone in the list sits at `HARMONIC_ATTENUATION^n` of full scale.
pub const HARMONIC_ATTENUATION: f64 = 0.125;

/// A harmonic component, `ratio` times the key frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overtone {
    pub ratio: f64,
    pub waveform: WaveformKind,
}

impl Overtone {
    pub fn new(ratio: f64, waveform: WaveformKind) -> Self {
        Self { ratio, waveform }
    }
}

/// Ordered list of overtones. Order is audible: each entry is quieter than
/// the one before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Overtone>", into = "Vec<Overtone>")]
pub struct Timbre {
    overtones: Vec<Overtone>,
}

impl Timbre {
    pub fn new(overtones: Vec<Overtone>) -> Result<Self, SynthError> {
        if let Some((index, overtone)) = overtones
            .iter()
            .enumerate()
            .find(|(_, overtone)| !overtone.ratio.is_finite() || overtone.ratio < 0.0)
        {
            return Err(SynthError::InvalidTimbre(format!(
                "overtone {} has ratio {}",
                index, overtone.ratio
            )));
        }
        Ok(Self { overtones })
    }

    pub fn overtones(&self) -> &[Overtone] {
        &self.overtones
    }

    pub fn is_empty(&self) -> bool {
        self.overtones.is_empty()
    }

    /// One key's 16-bit contribution at `sample_time`.
    ///
    /// `amplitude` is the key's envelope level; anything above 1 plays at full
    /// scale. The sum is truncated toward zero, never clamped.
    pub fn mix(&self, sample_time: u64, frequency: f64, amplitude: f64, sample_rate: u32) -> i16 {
        let ticks_per_cycle = sample_rate as f64 / frequency;
        let cycles = sample_time as f64 / ticks_per_cycle;
        let phase = TAU * cycles;

        let mut level = FULL_SCALE * amplitude.min(1.0);
        let mut value = 0.0;

        for overtone in &self.overtones {
            level *= HARMONIC_ATTENUATION;
            value += level * overtone.waveform.evaluate(phase * overtone.ratio);
        }

        value as i16
    }
}

impl Default for Timbre {
    fn default() -> Self {
        Self {
            overtones: vec![
                Overtone::new(1.0, WaveformKind::Square),
                Overtone::new(2.0, WaveformKind::Square),
                Overtone::new(3.0, WaveformKind::Sine),
            ],
        }
    }
}

impl TryFrom<Vec<Overtone>> for Timbre {
    type Error = SynthError;

    fn try_from(overtones: Vec<Overtone>) -> Result<Self, Self::Error> {
        Self::new(overtones)
    }
}

impl From<Timbre> for Vec<Overtone> {
    fn from(timbre: Timbre) -> Self {
        timbre.overtones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timbre_is_silent() {
        let timbre = Timbre::new(Vec::new()).unwrap();
        assert!(timbre.is_empty());
        assert_eq!(timbre.mix(123, 440.0, 1.0, 44100), 0);
    }

    #[test]
    fn attenuation_compounds_per_overtone() {
        // At phase zero a square overtone reads 1, so each entry adds its level.
        let square = |ratio| Overtone::new(ratio, WaveformKind::Square);
        let one = Timbre::new(vec![square(1.0)]).unwrap();
        let three = Timbre::new(vec![square(1.0), square(2.0), square(3.0)]).unwrap();

        let expected_one = FULL_SCALE * 0.125;
        let expected_three = FULL_SCALE * (0.125 + 0.125 * 0.125 + 0.125 * 0.125 * 0.125);
        assert_eq!(one.mix(0, 440.0, 1.0, 44100), expected_one as i16);
        assert_eq!(three.mix(0, 440.0, 1.0, 44100), expected_three as i16);
    }

    #[test]
    fn order_changes_the_mix() {
        let forward = Timbre::new(vec![
            Overtone::new(1.0, WaveformKind::Square),
            Overtone::new(1.0, WaveformKind::Sine),
        ])
        .unwrap();
        let reversed = Timbre::new(vec![
            Overtone::new(1.0, WaveformKind::Sine),
            Overtone::new(1.0, WaveformKind::Square),
        ])
        .unwrap();
        assert_ne!(
            forward.mix(0, 440.0, 1.0, 44100),
            reversed.mix(0, 440.0, 1.0, 44100)
        );
    }

    #[test]
    fn amplitude_caps_at_full_scale() {
        let timbre = Timbre::default();
        for time in 0..200 {
            assert_eq!(
                timbre.mix(time, 261.0, 1.0, 44100),
                timbre.mix(time, 261.0, 3.5, 44100)
            );
        }
    }

    #[test]
    fn rejects_bad_ratios() {
        assert!(Timbre::new(vec![Overtone::new(-1.0, WaveformKind::Sine)]).is_err());
        assert!(Timbre::new(vec![Overtone::new(f64::NAN, WaveformKind::Sine)]).is_err());
        let parsed: Result<Timbre, _> =
            serde_json::from_str(r#"[{"ratio": -2.0, "waveform": "sine"}]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn deserializes_as_a_plain_list() {
        let timbre: Timbre = serde_json::from_str(
            r#"[{"ratio": 1.0, "waveform": "S"}, {"ratio": 2.0, "waveform": "S"}, {"ratio": 3.0, "waveform": "s"}]"#,
        )
        .unwrap();
        assert_eq!(timbre, Timbre::default());
    }
}
