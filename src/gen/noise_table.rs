//! Noise table for the click burst
//!
//! A fixed 1024-sample wavetable: a decaying square burst at the head followed
//! by pseudo-random tail samples. Built once per process and shared read-only
//! by every processor instance.

use once_cell::sync::Lazy;

/// Number of samples in the table
pub const NOISE_TABLE_LEN: usize = 1024;

/// Length of the square burst at the head of the table
const BURST_LEN: usize = 128;

/// The burst flips sign every this many samples
const BURST_HALF_PERIOD: usize = 8;

/// Amount of noise mixed into the burst
const BURST_NOISE: f32 = 0.1;

/// Fixed seed so every process builds the same table
const SEED: u32 = 1;

static NOISE_TABLE: Lazy<NoiseTable> = Lazy::new(NoiseTable::generate);

/// Linear congruential generator with the classic C library constants
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in [-1.0, 1.0]
    fn next_bipolar(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let bits = (self.state >> 16) & 0x7fff;
        (bits as f32 / 32767.0) * 2.0 - 1.0
    }
}

/// Read-only lookup table of click samples
pub struct NoiseTable {
    samples: [f32; NOISE_TABLE_LEN],
}

impl NoiseTable {
    /// The process-wide table, generated on first use
    pub fn global() -> &'static NoiseTable {
        &NOISE_TABLE
    }

    fn generate() -> Self {
        let mut rng = Lcg::new(SEED);
        let mut samples = [0.0f32; NOISE_TABLE_LEN];

        for (i, sample) in samples.iter_mut().enumerate() {
            let noise = rng.next_bipolar();
            *sample = if i < BURST_LEN {
                let sign = if (i / BURST_HALF_PERIOD) % 2 == 0 { 1.0 } else { -1.0 };
                // 1.0 at the first sample down to 0.5 at the end of the burst
                let decay = 1.0 - 0.5 * (i as f32 / BURST_LEN as f32);
                (sign * decay * (1.0 - BURST_NOISE) + noise * BURST_NOISE).clamp(-1.0, 1.0)
            } else {
                noise
            };
        }

        Self { samples }
    }

    /// Sample at `index`, wrapped modulo the table length
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.samples[index % NOISE_TABLE_LEN]
    }

    /// Sample at a fractional frame position (truncated, then wrapped)
    #[inline]
    pub fn at_frame(&self, frame: f32) -> f32 {
        self.get(frame.max(0.0) as usize)
    }

    pub fn len(&self) -> usize {
        NOISE_TABLE_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_in_range() {
        let table = NoiseTable::global();
        assert_eq!(table.len(), 1024);
        for &sample in table.as_slice() {
            assert!(sample.is_finite());
            assert!((-1.0..=1.0).contains(&sample), "sample {} out of range", sample);
        }
    }

    #[test]
    fn test_burst_alternates_sign() {
        let table = NoiseTable::global();
        // Noise share is 0.1 and burst magnitude stays above 0.45, so the sign holds
        assert!(table.get(0) > 0.0);
        assert!(table.get(8) < 0.0);
        assert!(table.get(16) > 0.0);
        assert!(table.get(127) < 0.0);
    }

    #[test]
    fn test_index_wraps() {
        let table = NoiseTable::global();
        assert_eq!(table.get(3), table.get(3 + NOISE_TABLE_LEN));
        assert_eq!(table.at_frame(1024.0 + 5.0), table.get(5));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = NoiseTable::generate();
        let b = NoiseTable::generate();
        assert_eq!(a.as_slice(), b.as_slice());
        assert_eq!(a.as_slice(), NoiseTable::global().as_slice());
    }

    #[test]
    fn test_tail_is_not_constant() {
        let table = NoiseTable::global();
        let tail = &table.as_slice()[BURST_LEN..];
        let min = tail.iter().cloned().fold(f32::MAX, f32::min);
        let max = tail.iter().cloned().fold(f32::MIN, f32::max);
        assert!(max - min > 1.0);
    }
}
