pub mod audio;
pub mod input;
pub mod runtime;
pub mod synth;
