pub mod native;
pub use native::NativeSynth;
#[cfg(feature = "native")]
pub use native::{start, RunOptions};
