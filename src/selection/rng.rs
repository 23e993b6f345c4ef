//! Randomization helpers for the shuffling strategies.

use rand::{Rng, RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Creates the generator used by randomized selectors.
///
/// A fixed seed makes every shuffle reproducible; without one the generator
/// is seeded from the thread-local RNG.
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    }
}

/// Uniformly permutes `items` in place (Fisher-Yates).
///
/// Walks from the back, swapping each slot with a uniformly chosen slot at or
/// before it.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let mut counter = items.len();
    while counter > 1 {
        let index = rng.random_range(0..counter);
        counter -= 1;
        items.swap(counter, index);
    }
}

/// Returns a shuffled permutation of `0..len`.
pub fn shuffled_indices<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    shuffle(&mut indices, rng);
    indices
}
