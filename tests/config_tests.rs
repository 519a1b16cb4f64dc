use microsynth::synth::{
    ConfigWatcher, EnvelopeRates, Overtone, SynthConfig, SynthEvent, Timbre, WaveformKind,
};
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Write `text` and push the mtime forward so coarse filesystem clocks still
/// register a change.
fn rewrite(path: &Path, text: &str, step: u64) {
    fs::write(path, text).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(step * 10))
        .unwrap();
}

#[test]
fn watcher_reports_only_what_changed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synth_config.json");
    fs::write(&path, r#"{ "envelope": { "attack": 1.002, "sustain": 0.99999, "decay": 0.9998 } }"#)
        .unwrap();

    let initial = SynthConfig::load(&path).unwrap();
    let mut watcher = ConfigWatcher::new(&path, initial);
    assert!(watcher.poll().is_empty());

    rewrite(
        &path,
        r#"{ "envelope": { "attack": 1.01, "sustain": 0.99999, "decay": 0.9998 } }"#,
        1,
    );
    assert_eq!(
        watcher.poll(),
        vec![SynthEvent::SetEnvelopeRates(EnvelopeRates::new(
            1.01, 0.99999, 0.9998
        ))]
    );
    assert!(watcher.poll().is_empty());

    rewrite(&path, "{ not json", 2);
    assert!(watcher.poll().is_empty());
    assert_eq!(watcher.current().envelope.attack, 1.01);

    rewrite(
        &path,
        r#"{
            "envelope": { "attack": 1.01, "sustain": 0.99999, "decay": 0.9998 },
            "timbre": [{ "ratio": 1.0, "waveform": "t" }, { "ratio": 3.5, "waveform": "S" }]
        }"#,
        3,
    );
    let expected = Timbre::new(vec![
        Overtone::new(1.0, WaveformKind::Triangle),
        Overtone::new(3.5, WaveformKind::Square),
    ])
    .unwrap();
    assert_eq!(watcher.poll(), vec![SynthEvent::SetTimbre(expected)]);
}

#[test]
fn shipped_config_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("synth_config.json");
    let config = SynthConfig::load(path).unwrap();
    assert_eq!(config, SynthConfig::default());
}

#[test]
fn missing_file_is_ignored_by_watcher() {
    let dir = tempfile::tempdir().unwrap();
    let mut watcher = ConfigWatcher::new(dir.path().join("absent.json"), SynthConfig::default());
    assert!(watcher.poll().is_empty());
}
