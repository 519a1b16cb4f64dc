#[cfg(feature = "native")]
mod cpal_backend;
mod reader;

#[cfg(feature = "native")]
pub use self::cpal_backend::CpalBackend;
pub use self::reader::ChunkReader;

pub trait AudioBackend {
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error>>;
    fn stop(&mut self);
}
