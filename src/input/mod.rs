pub mod console;
#[cfg(feature = "native")]
mod keyboard;
pub mod midi;

#[cfg(feature = "native")]
pub use self::keyboard::KeyboardHandler;
#[cfg(feature = "native")]
pub use self::midi::MidiHandler;
