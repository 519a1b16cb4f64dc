use crate::audio::ChunkReader;
use crate::synth::{SynthEngine, SynthError, SynthEvent};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tracing::{error, warn};

/// Native runtime synth: owns the engine and applies queued events at chunk
/// boundaries, so every chunk is rendered against one consistent state.
pub struct NativeSynth {
    engine: SynthEngine,
    reader: ChunkReader,
    event_receiver: Receiver<SynthEvent>,
}

impl NativeSynth {
    pub fn new(engine: SynthEngine, event_receiver: Receiver<SynthEvent>) -> Self {
        let reader = ChunkReader::new(engine.sample_rate());
        Self {
            engine,
            reader,
            event_receiver,
        }
    }

    /// Fill `output` with mono frames, producing new chunks as needed.
    pub fn process(&mut self, output: &mut [i16]) {
        let mut written = 0;
        while written < output.len() {
            if self.reader.is_exhausted() {
                self.process_events();
                let chunk_size = self.engine.chunk_size();
                match self.engine.produce_chunk(chunk_size) {
                    Ok(chunk) => self.reader.load(chunk),
                    Err(e) => {
                        error!("Failed to produce chunk: {}", e);
                        output[written..].fill(0);
                        return;
                    }
                }
            }
            written += self.reader.read(&mut output[written..]);
        }
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            if let Err(e) = self.engine.apply(event) {
                warn!("Rejected synth event: {}", e);
            }
        }
    }

    /// Apply an event immediately, bypassing the queue.
    pub fn apply_now(&mut self, event: SynthEvent) -> Result<(), SynthError> {
        self.engine.apply(event)
    }

    pub fn seek(&mut self, offset: Duration) {
        self.reader.seek(offset);
    }

    pub fn engine(&self) -> &SynthEngine {
        &self.engine
    }

    pub fn sample_rate(&self) -> u32 {
        self.engine.sample_rate()
    }
}

/// Which input adapters to run alongside the audio stream.
#[cfg(feature = "native")]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub midi: bool,
    pub console: bool,
}

#[cfg(feature = "native")]
pub fn start(
    config_path: std::path::PathBuf,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    use crate::audio::{AudioBackend, CpalBackend};
    use crate::input::{console, KeyboardHandler, MidiHandler};
    use crate::synth::{ConfigWatcher, SynthConfig};
    use std::sync::mpsc::channel;
    use std::sync::{Arc, Mutex};
    use tracing::info;

    let config = SynthConfig::load_or_default(&config_path);
    let (event_tx, event_rx) = channel();

    let synth = Arc::new(Mutex::new(NativeSynth::new(
        SynthEngine::new(&config),
        event_rx,
    )));

    let mut audio_backend = CpalBackend::new(synth.clone());
    audio_backend.start()?;

    let mut midi_handler = if options.midi {
        Some(MidiHandler::new(event_tx.clone()))
    } else {
        None
    };
    if options.console {
        console::spawn(event_tx.clone())?;
    }
    let mut keyboard_handler = KeyboardHandler::new(event_tx.clone());
    let mut config_watcher = ConfigWatcher::new(config_path, config);

    info!("Letters play notes, 'z' changes the fundamental, 'c' sets 12 tone");
    info!("Space holds the sustain pedal, shift keys change octave, '.' exits");

    loop {
        if !keyboard_handler.update() {
            break;
        }
        if let Some(midi_handler) = midi_handler.as_mut() {
            midi_handler.update();
        }
        for event in config_watcher.poll() {
            event_tx.send(event)?;
        }

        std::thread::sleep(Duration::from_millis(10));
    }

    audio_backend.stop();
    Ok(())
}
