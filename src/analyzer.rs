/// Root-mean-square loudness of one block of mono samples.
///
/// Emphasizes louder sounds compared to a plain mean of absolute values.
/// An all-silent block yields exactly 0.
pub fn block_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|&x| x * x).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Turns arbitrarily sized capture callbacks into fixed-length mono blocks.
///
/// The audio backend delivers interleaved buffers whose size it chooses;
/// detection runs on blocks of exactly `block_len` samples, in arrival order.
pub struct BlockAssembler {
    block_len: usize,
    buffer: Vec<f32>,
}

impl BlockAssembler {
    pub fn new(block_len: usize) -> Self {
        Self {
            block_len,
            buffer: Vec::with_capacity(block_len * 2),
        }
    }

    /// Downmix an interleaved buffer to mono and append it. Every complete
    /// block is handed to `on_block` before this call returns.
    pub fn push(&mut self, interleaved: &[f32], channels: usize, mut on_block: impl FnMut(&[f32])) {
        if channels <= 1 {
            self.buffer.extend_from_slice(interleaved);
        } else {
            for frame in interleaved.chunks_exact(channels) {
                self.buffer.push(frame.iter().sum::<f32>() / channels as f32);
            }
        }

        while self.buffer.len() >= self.block_len {
            on_block(&self.buffer[..self.block_len]);
            self.buffer.drain(..self.block_len);
        }
    }
}
