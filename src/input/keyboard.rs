use crate::synth::pitch::{NOTE_NAMES, PITCH_CLASSES};
use crate::synth::SynthEvent;
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::sync::mpsc::Sender;
use tracing::{debug, error, info};

/// Chromatic layout starting at C: white keys on the home row, black keys above.
const NOTE_KEYS: [Keycode; 15] = [
    Keycode::A,
    Keycode::W,
    Keycode::S,
    Keycode::E,
    Keycode::D,
    Keycode::F,
    Keycode::T,
    Keycode::G,
    Keycode::Y,
    Keycode::H,
    Keycode::U,
    Keycode::J,
    Keycode::K,
    Keycode::O,
    Keycode::L,
];

const LOWEST_OCTAVE: usize = 1;
const HIGHEST_OCTAVE: usize = 6;

/// Edge-detecting key state, independent of the polling device.
struct KeyLayout {
    key_states: [bool; NOTE_KEYS.len()],
    octave: usize,
    octave_key_held: bool,
    changing_root: bool,
    temperament_key_held: bool,
    foot_pedal: bool,
}

impl KeyLayout {
    fn new() -> Self {
        Self {
            key_states: [false; NOTE_KEYS.len()],
            octave: 4,
            octave_key_held: false,
            changing_root: false,
            temperament_key_held: false,
            foot_pedal: false,
        }
    }

    /// Events for one snapshot of held keys, or `None` when the user asked to
    /// quit.
    fn handle(&mut self, keys: &[Keycode]) -> Option<Vec<SynthEvent>> {
        if keys.contains(&Keycode::Dot) {
            return None;
        }

        let mut events = Vec::new();

        if keys.contains(&Keycode::Z) && !self.changing_root {
            info!("Press a note key to choose the fundamental");
            self.changing_root = true;
        }

        for (index, key) in NOTE_KEYS.iter().enumerate() {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states[index];

            if is_pressed && !was_pressed {
                if self.changing_root {
                    let fundamental = index % PITCH_CLASSES;
                    debug!("Fundamental key {}", NOTE_NAMES[fundamental]);
                    events.push(SynthEvent::RetuneJust { fundamental });
                    self.changing_root = false;
                } else {
                    let key_index = self.octave * PITCH_CLASSES + index;
                    debug!("Key '{:?}' pressed - note on for key {}", key, key_index);
                    events.push(SynthEvent::NoteOn {
                        key: key_index,
                        velocity: 1.0,
                    });
                }
            } else if !is_pressed && was_pressed && !self.changing_root {
                // The octave may have moved while the key was held.
                debug!("Key '{:?}' released", key);
                events.extend((LOWEST_OCTAVE..=HIGHEST_OCTAVE).map(|octave| {
                    SynthEvent::NoteOff {
                        key: octave * PITCH_CLASSES + index,
                    }
                }));
            }

            self.key_states[index] = is_pressed;
        }

        let temperament_key = keys.contains(&Keycode::C);
        if temperament_key && !self.temperament_key_held {
            events.push(SynthEvent::RetuneEqual);
        }
        self.temperament_key_held = temperament_key;

        let shift_down = keys.contains(&Keycode::LShift);
        let shift_up = keys.contains(&Keycode::RShift);
        if !self.octave_key_held {
            if shift_down {
                self.octave = (self.octave - 1).max(LOWEST_OCTAVE);
                info!("Octave {}", self.octave);
            } else if shift_up {
                self.octave = (self.octave + 1).min(HIGHEST_OCTAVE);
                info!("Octave {}", self.octave);
            }
        }
        self.octave_key_held = shift_down || shift_up;

        let foot_pedal = keys.contains(&Keycode::Space);
        if foot_pedal != self.foot_pedal {
            events.push(SynthEvent::FootPedal(foot_pedal));
            self.foot_pedal = foot_pedal;
        }

        Some(events)
    }
}

pub struct KeyboardHandler {
    device_state: DeviceState,
    layout: KeyLayout,
    event_sender: Sender<SynthEvent>,
}

impl KeyboardHandler {
    pub fn new(event_sender: Sender<SynthEvent>) -> Self {
        Self {
            device_state: DeviceState::new(),
            layout: KeyLayout::new(),
            event_sender,
        }
    }

    /// Poll the keyboard once. Returns `false` when the user asked to quit.
    pub fn update(&mut self) -> bool {
        let keys: Vec<Keycode> = self.device_state.get_keys();

        let Some(events) = self.layout.handle(&keys) else {
            info!("Exiting");
            return false;
        };

        for event in events {
            if let Err(e) = self.event_sender.send(event) {
                error!("Error sending keyboard event: {}", e);
            }
        }

        true
    }
}
