use super::envelope::EnvelopeRates;
use super::error::SynthError;
use super::event::SynthEvent;
use super::timbre::Timbre;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

/// Stream and instrument settings. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub chunk_size: usize,
    pub envelope: EnvelopeRates,
    pub timbre: Timbre,
}

impl SynthConfig {
    pub fn from_json(text: &str) -> Result<Self, SynthError> {
        let config: SynthConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SynthError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SynthError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load `path`, falling back to the built-in instrument when it is missing
    /// or unusable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => {
                config.log_summary();
                config
            }
            Err(e) => {
                warn!("{}; using default settings", e);
                let config = Self::default();
                config.log_summary();
                config
            }
        }
    }

    /// Reject settings the stream cannot run with. Envelope rates are only
    /// warned about.
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidConfig("sample_rate must be positive".into()));
        }
        if self.channels == 0 {
            return Err(SynthError::InvalidConfig("channels must be positive".into()));
        }
        if self.chunk_size == 0 {
            return Err(SynthError::InvalidConfig("chunk_size must be positive".into()));
        }
        for warning in self.envelope.warnings() {
            warn!("{}", warning);
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            attack = self.envelope.attack,
            sustain = self.envelope.sustain,
            decay = self.envelope.decay,
            "envelope rates"
        );
        info!(timbre = ?self.timbre.overtones(), "timbre");
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            chunk_size: 1024,
            envelope: EnvelopeRates::default(),
            timbre: Timbre::default(),
        }
    }
}

/// Re-reads a config file when it changes on disk and reports the instrument
/// settings that differ from the last good read.
pub struct ConfigWatcher {
    path: PathBuf,
    modified: Option<SystemTime>,
    current: SynthConfig,
}

impl ConfigWatcher {
    pub fn new(path: impl Into<PathBuf>, current: SynthConfig) -> Self {
        let path = path.into();
        let modified = Self::modified_time(&path);
        Self {
            path,
            modified,
            current,
        }
    }

    fn modified_time(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|meta| meta.modified()).ok()
    }

    pub fn current(&self) -> &SynthConfig {
        &self.current
    }

    /// Events needed to bring the synth in line with the file. Stream settings
    /// only apply on restart and are ignored here.
    pub fn poll(&mut self) -> Vec<SynthEvent> {
        let modified = Self::modified_time(&self.path);
        if modified.is_none() || modified == self.modified {
            return Vec::new();
        }
        self.modified = modified;

        let config = match SynthConfig::load(&self.path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring config change: {}", e);
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        if config.envelope != self.current.envelope {
            info!(
                attack = config.envelope.attack,
                sustain = config.envelope.sustain,
                decay = config.envelope.decay,
                "envelope rates changed"
            );
            events.push(SynthEvent::SetEnvelopeRates(config.envelope));
        }
        if config.timbre != self.current.timbre {
            info!(timbre = ?config.timbre.overtones(), "timbre changed");
            events.push(SynthEvent::SetTimbre(config.timbre.clone()));
        }
        self.current = config;
        events
    }
}
