use clap::Parser;
use microsynth::runtime::{self, RunOptions};
use std::path::PathBuf;

/// Microtonal additive synthesizer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with envelope rates and timbre; re-read while running
    #[arg(short, long, default_value = "synth_config.json")]
    config: PathBuf,

    /// Skip MIDI port selection
    #[arg(long)]
    no_midi: bool,

    /// Also accept commands on stdin
    #[arg(long)]
    console: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    runtime::start(
        args.config,
        RunOptions {
            midi: !args.no_midi,
            console: args.console,
        },
    )
}
