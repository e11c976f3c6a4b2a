use std::collections::VecDeque;

use rand::Rng;

/// The single source of randomness for pools and display resolution.
/// Every `rand::Rng` is one; tests can also script exact sequences.
pub trait RandomSource {
    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;

    /// One fair coin flip.
    fn flip(&mut self) -> bool;
}

impl<R: Rng> RandomSource for R {
    fn index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn flip(&mut self) -> bool {
        self.gen_bool(0.5)
    }
}

/// Replays fixed indices and flips in order. Once a queue runs dry it
/// returns index 0 and `true`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    indices: VecDeque<usize>,
    flips: VecDeque<bool>,
}

impl ScriptedSource {
    pub fn new(indices: &[usize], flips: &[bool]) -> Self {
        Self {
            indices: indices.iter().copied().collect(),
            flips: flips.iter().copied().collect(),
        }
    }
}

impl RandomSource for ScriptedSource {
    fn index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % len
    }

    fn flip(&mut self) -> bool {
        self.flips.pop_front().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        let xs: Vec<usize> = (0..20).map(|_| a.index(10)).collect();
        let ys: Vec<usize> = (0..20).map(|_| b.index(10)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&i| i < 10));
    }

    #[test]
    fn scripted_source_wraps_out_of_range_indices() {
        let mut src = ScriptedSource::new(&[5, 1], &[false]);
        assert_eq!(src.index(3), 2);
        assert_eq!(src.index(3), 1);
        assert_eq!(src.index(3), 0);
        assert!(!src.flip());
        assert!(src.flip());
    }
}
