use crate::synth::pitch::PITCH_CLASSES;
use crate::synth::SynthEvent;

/// Sustain pedal controller number.
const SUSTAIN_CONTROLLER: u8 = 64;

/// Playable range; the board starts an octave below MIDI note 0.
const LOWEST_PLAYED_NOTE: u8 = 36;
const HIGHEST_PLAYED_NOTE: u8 = 107;
const KEY_OFFSET: u8 = 12;

/// Notes below the playable range pick the just-intonation fundamental.
const LOWEST_TUNING_NOTE: u8 = 21;
const HIGHEST_TUNING_NOTE: u8 = 34;

const VELOCITY_SCALE: f64 = 130.0;

/// Translate one three-byte channel message into a synth event.
pub fn decode_message(status: u8, data1: u8, data2: u8) -> Option<SynthEvent> {
    let kind = status & 0xF0;
    let note_on = kind == 0x90 && data2 > 0;
    let note_off = kind == 0x80 || (kind == 0x90 && data2 == 0);
    let playable = (LOWEST_PLAYED_NOTE..=HIGHEST_PLAYED_NOTE).contains(&data1);

    if note_on {
        if playable {
            Some(SynthEvent::NoteOn {
                key: (data1 - KEY_OFFSET) as usize,
                velocity: data2 as f64 / VELOCITY_SCALE,
            })
        } else if (LOWEST_TUNING_NOTE..=HIGHEST_TUNING_NOTE).contains(&data1) {
            Some(SynthEvent::RetuneJust {
                fundamental: data1 as usize % PITCH_CLASSES,
            })
        } else {
            None
        }
    } else if note_off {
        playable.then(|| SynthEvent::NoteOff {
            key: (data1 - KEY_OFFSET) as usize,
        })
    } else if kind == 0xB0 && data1 == SUSTAIN_CONTROLLER {
        Some(SynthEvent::FootPedal(data2 >= 64))
    } else {
        None
    }
}

#[cfg(feature = "native")]
pub use self::handler::MidiHandler;

#[cfg(feature = "native")]
mod handler {
    use super::decode_message;
    use crate::synth::SynthEvent;
    use midir::{MidiInput, MidiInputConnection, MidiInputPort};
    use std::error::Error;
    use std::io::{stdin, stdout, Write};
    use std::sync::mpsc::{self, Receiver, Sender};
    use tracing::{debug, error, info, warn};

    pub struct MidiHandler {
        /// Holds the connection to keep it alive
        #[allow(dead_code)]
        connection: Option<MidiInputConnection<()>>,
        receiver: Option<Receiver<(u8, u8, u8)>>, // (status, data1, data2)
        event_sender: Sender<SynthEvent>,
    }

    impl MidiHandler {
        pub fn new(event_sender: Sender<SynthEvent>) -> Self {
            match Self::try_new(event_sender.clone()) {
                Ok(handler) => handler,
                Err(e) => {
                    warn!(
                        "Failed to initialize MIDI: {}. MIDI functionality will be disabled.",
                        e
                    );
                    Self {
                        connection: None,
                        receiver: None,
                        event_sender,
                    }
                }
            }
        }

        fn try_new(event_sender: Sender<SynthEvent>) -> Result<Self, Box<dyn Error>> {
            let midi_in = MidiInput::new("MicroSynth Input")?;
            let port = Self::select_input_port(&midi_in)?;
            let port_name = midi_in.port_name(&port)?;

            let (sender, receiver) = mpsc::channel();

            // A single callback may carry several running messages back to back.
            let connection = midi_in.connect(
                &port,
                "midir-read-input",
                move |_, message, _| {
                    for bytes in message.chunks_exact(3) {
                        let _ = sender.send((bytes[0], bytes[1], bytes[2]));
                    }
                },
                (),
            )?;

            info!("Opened MIDI port: {}", port_name);

            Ok(Self {
                connection: Some(connection),
                receiver: Some(receiver),
                event_sender,
            })
        }

        fn select_input_port(midi_in: &MidiInput) -> Result<MidiInputPort, Box<dyn Error>> {
            let in_ports = midi_in.ports();
            if in_ports.is_empty() {
                return Err("No MIDI input ports found".into());
            }

            println!("Available MIDI input ports:");
            for (i, port) in in_ports.iter().enumerate() {
                println!("{}: {}", i, midi_in.port_name(port)?);
            }

            print!("Select MIDI input port: ");
            stdout().flush()?;
            let mut input = String::new();
            stdin().read_line(&mut input)?;
            let selection = input.trim().parse::<usize>().unwrap_or(0);

            let port = in_ports
                .get(selection)
                .ok_or("Invalid MIDI port selection")?
                .clone();

            Ok(port)
        }

        pub fn update(&mut self) {
            if let Some(receiver) = &self.receiver {
                while let Ok((status, data1, data2)) = receiver.try_recv() {
                    let Some(event) = decode_message(status, data1, data2) else {
                        continue;
                    };
                    debug!(?event, "midi");
                    if let Err(e) = self.event_sender.send(event) {
                        error!("Failed to send MIDI event: {}", e);
                    }
                }
            }
        }
    }
}
