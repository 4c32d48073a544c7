//! Per-world seedable RNG (spec.md §5, §9: "do NOT use the host language's
//! default global RNG"; §8.1.7 requires bit-identical determinism across
//! platforms for a fixed seed).
//!
//! Uses `rand_pcg::Pcg32`, a fixed, named, portable algorithm, rather than
//! `rand::thread_rng()`. `Nopey-sand` uses `rand::random()` (the thread-local
//! generator) for its perturbation seeding; that is exactly the pattern
//! spec.md forbids for the move executor, so here the world owns one
//! explicit, seeded generator instead.

use rand::SeedableRng;
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct WorldRng {
    rng: Pcg32,
    seed: u64,
}

impl WorldRng {
    pub fn new(seed: u64) -> Self {
        WorldRng {
            rng: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }

    pub fn inner_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Shuffles `items` in place using this world's RNG (spec.md §4.11 step
    /// 1, §9's determinism requirement).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        use rand::seq::SliceRandom;
        items.shuffle(&mut self.rng);
    }

    pub fn gen_range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        use rand::Rng;
        self.rng.gen_range(lo..hi)
    }

    pub fn gen_unit_f64(&mut self) -> f64 {
        use rand::Rng;
        self.rng.gen::<f64>()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_seed_gives_same_shuffle() {
        let mut a = WorldRng::new(42);
        let mut b = WorldRng::new(42);
        let mut va: Vec<u32> = (0..20).collect();
        let mut vb: Vec<u32> = (0..20).collect();
        a.shuffle(&mut va);
        b.shuffle(&mut vb);
        assert_eq!(va, vb);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let mut a = WorldRng::new(1);
        let mut b = WorldRng::new(2);
        let mut va: Vec<u32> = (0..20).collect();
        let mut vb: Vec<u32> = (0..20).collect();
        a.shuffle(&mut va);
        b.shuffle(&mut vb);
        assert_ne!(va, vb);
    }
}
