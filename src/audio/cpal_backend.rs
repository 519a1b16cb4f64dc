use crate::audio::AudioBackend;
use crate::runtime::NativeSynth;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

pub struct CpalBackend {
    stream: Option<Stream>,
    synth: Arc<Mutex<NativeSynth>>,
}

impl CpalBackend {
    pub fn new(synth: Arc<Mutex<NativeSynth>>) -> Self {
        Self {
            stream: None,
            synth,
        }
    }

    fn select_output_device(
        &self,
        host: &cpal::Host,
    ) -> Result<cpal::Device, Box<dyn std::error::Error>> {
        if cfg!(target_os = "linux") {
            self.select_linux_output_device(host)
        } else {
            host.default_output_device()
                .ok_or_else(|| "No output device available".into())
        }
    }

    fn select_linux_output_device(
        &self,
        host: &cpal::Host,
    ) -> Result<cpal::Device, Box<dyn std::error::Error>> {
        let mut device_names = Vec::new();

        for device in host.devices()? {
            let name = device.name().unwrap_or_default();
            if name.to_lowercase().starts_with("default:")
                || name.to_lowercase().contains("pipewire")
            {
                device_names.push(name);
            }
        }

        if device_names.is_empty() {
            return host
                .default_output_device()
                .ok_or_else(|| "No output device available".into());
        }

        println!("Available output devices:");
        for (i, name) in device_names.iter().enumerate() {
            println!("{}. {}", i + 1, name);
        }

        println!("Select device (default 1): ");
        let mut choice = String::new();
        std::io::stdin().read_line(&mut choice)?;
        let choice = choice
            .trim()
            .parse::<usize>()
            .unwrap_or(1)
            .saturating_sub(1);

        let selected_name = device_names.get(choice).ok_or("Invalid device selection")?;

        host.devices()?
            .find(|d| d.name().map(|n| n == *selected_name).unwrap_or(false))
            .ok_or_else(|| "Selected output device not found".into())
    }

    fn build_stream(&mut self) -> Result<Stream, Box<dyn std::error::Error>> {
        let host = cpal::default_host();
        let device = self.select_output_device(&host)?;
        info!("Selected device: {}", device.name().unwrap_or_default());

        let supported_config = device.default_output_config()?;
        let mut stream_config: cpal::StreamConfig = supported_config.clone().into();

        // The engine renders at its configured rate; ask the device for the same.
        let sample_rate = self.synth.lock().map_err(|_| "synth lock poisoned")?.sample_rate();
        if stream_config.sample_rate.0 != sample_rate {
            warn!(
                "Device prefers {} Hz, requesting {} Hz",
                stream_config.sample_rate.0, sample_rate
            );
            stream_config.sample_rate = cpal::SampleRate(sample_rate);
        }

        let channels = stream_config.channels as usize;
        let synth = self.synth.clone();
        let mut frames: Vec<i16> = Vec::new();

        let stream = match supported_config.sample_format() {
            SampleFormat::F32 => device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    frames.resize(data.len() / channels, 0);
                    if let Ok(mut synth) = synth.lock() {
                        synth.process(&mut frames);
                    } else {
                        frames.fill(0);
                    }

                    for (i, frame) in data.chunks_mut(channels).enumerate() {
                        for sample in frame.iter_mut() {
                            *sample = frames[i] as f32 / 32768.0;
                        }
                    }
                },
                |err| error!("Stream error: {}", err),
                None,
            )?,
            SampleFormat::I16 => device.build_output_stream(
                &stream_config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    frames.resize(data.len() / channels, 0);
                    if let Ok(mut synth) = synth.lock() {
                        synth.process(&mut frames);
                    } else {
                        frames.fill(0);
                    }

                    for (i, frame) in data.chunks_mut(channels).enumerate() {
                        frame.fill(frames[i]);
                    }
                },
                |err| error!("Stream error: {}", err),
                None,
            )?,
            format => return Err(format!("Unsupported sample format: {:?}", format).into()),
        };

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let stream = self.build_stream()?;
        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                error!("Failed to stop stream: {}", e);
            }
        }
    }
}
