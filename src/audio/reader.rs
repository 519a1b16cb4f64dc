use std::time::Duration;

/// Read cursor over the most recently produced chunk.
///
/// Device callbacks rarely ask for exactly one chunk of frames, so the reader
/// hands out what is left of the current chunk and reports when a new one is
/// needed. Seeking only moves the cursor; it never touches synthesis state.
pub struct ChunkReader {
    chunk: Vec<i16>,
    position: usize,
    sample_rate: u32,
}

impl ChunkReader {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            chunk: Vec::new(),
            position: 0,
            sample_rate,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.chunk.len()
    }

    /// Replace the current chunk and rewind to its start.
    pub fn load(&mut self, chunk: &[i16]) {
        self.chunk.clear();
        self.chunk.extend_from_slice(chunk);
        self.position = 0;
    }

    /// Copy as many pending frames as fit into `output`; returns how many.
    pub fn read(&mut self, output: &mut [i16]) -> usize {
        let pending = &self.chunk[self.position.min(self.chunk.len())..];
        let count = pending.len().min(output.len());
        output[..count].copy_from_slice(&pending[..count]);
        self.position += count;
        count
    }

    /// Move the cursor to `offset` into the current chunk. The chunk holds mono
    /// frames, so the device channel count plays no part. Offsets past the end
    /// leave the reader exhausted.
    pub fn seek(&mut self, offset: Duration) {
        let position = offset.as_secs_f64() * self.sample_rate as f64;
        self.position = (position as usize).min(self.chunk.len());
    }

    pub fn position(&self) -> usize {
        self.position
    }
}
