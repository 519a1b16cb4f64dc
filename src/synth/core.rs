use super::config::SynthConfig;
use super::error::SynthError;
use super::event::SynthEvent;
use super::keyboard::Keyboard;
use super::pitch::NOTE_NAMES;
use super::timbre::Timbre;
use tracing::{debug, info};

/// Mixes every sounding key into a mono 16-bit stream, one chunk at a time.
pub struct SynthEngine {
    keyboard: Keyboard,
    timbre: Timbre,
    sample_time: u64,
    sample_rate: u32,
    channels: u16,
    chunk_size: usize,
    samples: Vec<i16>,
}

impl SynthEngine {
    pub fn new(config: &SynthConfig) -> Self {
        Self {
            keyboard: Keyboard::new(config.envelope),
            timbre: config.timbre.clone(),
            sample_time: 0,
            sample_rate: config.sample_rate,
            channels: config.channels,
            chunk_size: config.chunk_size,
            samples: vec![0; config.chunk_size],
        }
    }

    pub fn apply(&mut self, event: SynthEvent) -> Result<(), SynthError> {
        match event {
            SynthEvent::NoteOn { key, velocity } => self.keyboard.note_on(key, velocity),
            SynthEvent::NoteOff { key } => self.keyboard.note_off(key),
            SynthEvent::FootPedal(held) => {
                debug!(held, "foot pedal");
                self.keyboard.set_foot_pedal(held);
                Ok(())
            }
            SynthEvent::RetuneJust { fundamental } => {
                self.keyboard.apply_just_tuning(fundamental)?;
                info!("fundamental now {}", NOTE_NAMES[fundamental]);
                Ok(())
            }
            SynthEvent::RetuneEqual => {
                self.keyboard.apply_equal_tuning();
                info!("fundamental now equal");
                Ok(())
            }
            SynthEvent::SetTimbre(timbre) => {
                self.set_timbre(timbre);
                Ok(())
            }
            SynthEvent::SetEnvelopeRates(rates) => {
                self.keyboard.set_envelope_rates(rates);
                Ok(())
            }
        }
    }

    /// Summed 16-bit contributions of the active keys, and the sum of their
    /// envelope levels.
    fn mix_active_keys(&self) -> (f64, f64) {
        let mut signal = 0.0;
        let mut total_amplitude = 0.0;

        for key in self.keyboard.active_keys() {
            signal += self.timbre.mix(
                self.sample_time,
                key.frequency(),
                key.amplitude(),
                self.sample_rate,
            ) as f64;
            total_amplitude += key.amplitude();
        }

        (signal, total_amplitude)
    }

    /// Produce one mixed sample and step every sounding envelope once.
    pub fn next_frame(&mut self) -> i16 {
        let (mut frame, total_amplitude) = self.mix_active_keys();

        // Loud chords are scaled down by their combined level instead of clipped.
        if total_amplitude > 1.0 {
            frame /= total_amplitude;
        }

        self.keyboard.advance_active();
        self.sample_time = (self.sample_time + 1) % u64::MAX;

        frame as i16
    }

    /// Fill the working buffer with `frame_count` fresh frames.
    pub fn produce_chunk(&mut self, frame_count: usize) -> Result<&[i16], SynthError> {
        if frame_count == 0 {
            return Err(SynthError::InvalidFrameCount(frame_count));
        }

        self.samples.resize(frame_count, 0);
        for index in 0..frame_count {
            let frame = self.next_frame();
            self.samples[index] = frame;
        }

        Ok(&self.samples)
    }

    pub fn set_timbre(&mut self, timbre: Timbre) {
        debug!(overtones = timbre.overtones().len(), "timbre replaced");
        self.timbre = timbre;
    }

    pub fn timbre(&self) -> &Timbre {
        &self.timbre
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn sample_time(&self) -> u64 {
        self.sample_time
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[cfg(test)]
    pub(crate) fn set_sample_time(&mut self, sample_time: u64) {
        self.sample_time = sample_time;
    }
}

impl Default for SynthEngine {
    fn default() -> Self {
        Self::new(&SynthConfig::default())
    }
}
