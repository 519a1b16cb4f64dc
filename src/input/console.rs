//! Line-based control from stdin.
//!
//! ```text
//! f 7          just intonation over G
//! e            equal temperament
//! p on|off     sustain pedal
//! c 60 64 -60  chord: positive keys start, the rest stop
//! ```

use crate::synth::keyboard::KEY_COUNT;
use crate::synth::SynthEvent;
use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("missing argument for '{0}'")]
    MissingArgument(&'static str),
}

fn parse_number(word: &str) -> Result<i64, CommandError> {
    word.parse()
        .map_err(|_| CommandError::NotANumber(word.to_string()))
}

pub fn parse_command(line: &str) -> Result<Vec<SynthEvent>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Vec::new());
    };

    match command {
        "f" => {
            let word = words.next().ok_or(CommandError::MissingArgument("f"))?;
            let fundamental: usize = word
                .parse()
                .map_err(|_| CommandError::NotANumber(word.to_string()))?;
            Ok(vec![SynthEvent::RetuneJust { fundamental }])
        }
        "e" => Ok(vec![SynthEvent::RetuneEqual]),
        "p" => match words.next() {
            Some("on") => Ok(vec![SynthEvent::FootPedal(true)]),
            Some("off") => Ok(vec![SynthEvent::FootPedal(false)]),
            Some(other) => Err(CommandError::Unknown(other.to_string())),
            None => Err(CommandError::MissingArgument("p")),
        },
        "c" => words
            .map(|word| {
                let note = parse_number(word)?;
                let key = (note.unsigned_abs() % KEY_COUNT as u64) as usize;
                Ok(if note > 0 {
                    SynthEvent::NoteOn { key, velocity: 1.0 }
                } else {
                    SynthEvent::NoteOff { key }
                })
            })
            .collect(),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Read commands from stdin on a background thread until stdin closes.
pub fn spawn(event_sender: Sender<SynthEvent>) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console-input".into())
        .spawn(move || {
            info!("Console: 'f <0-11>', 'e', 'p on|off', 'c <keys...>'");
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Ok(events) => {
                        for event in events {
                            if event_sender.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
        })
}
