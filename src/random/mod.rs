//! Named, independently seeded random number streams.
//!
//! Every stochastic decision in the simulation draws from a stream identified by a zero-sized
//! type declared with [`define_rng!`]. All streams derive from one base seed, so a run is fully
//! reproducible from that seed, and adding draws to one stream (say, vaccination) never shifts
//! the sequence seen by another (say, disease transitions).
//!
//! ```rust
//! use epigrid::define_rng;
//! use epigrid::random::RngStore;
//!
//! define_rng!(CoinRng);
//!
//! let mut store = RngStore::new(42);
//! let toss = store.sample_unit(CoinRng);
//! assert!((0.0..1.0).contains(&toss));
//! ```
mod macros;
mod sampling_algorithms;

use std::any::{Any, TypeId};

use log::trace;
pub use macros::define_rng;
pub use sampling_algorithms::{
    sample_multiple_with_replacement, sample_multiple_without_replacement,
};

use crate::hashing::{hash_str, HashMap};
use crate::rand::distr::uniform::{SampleRange, SampleUniform};
use crate::rand::distr::weighted::WeightedIndex;
use crate::rand::distr::Distribution;
use crate::rand::{Rng, SeedableRng};

pub trait RngId: Copy + Clone + 'static {
    type RngType: SeedableRng + Rng + 'static;
    fn get_name() -> &'static str;
}

// This is a wrapper that allows for future support for different types of
// random number generators (anything that implements SeedableRng is valid).
struct RngHolder {
    rng: Box<dyn Any>,
}

/// Holds the base seed and the lazily created rngs, keyed by their `RngId`.
pub struct RngStore {
    base_seed: u64,
    rng_holders: HashMap<TypeId, RngHolder>,
}

impl RngStore {
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        trace!("initializing random streams with base seed {}", base_seed);
        RngStore {
            base_seed,
            rng_holders: HashMap::default(),
        }
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Gets a mutable reference to the random number generator associated with the given
    /// [`RngId`]. If the rng has not been used before, one will be created from the base seed.
    pub fn get_rng<R: RngId>(&mut self, _rng_id: R) -> &mut R::RngType {
        let base_seed = self.base_seed;
        self.rng_holders
            .entry(TypeId::of::<R>())
            // Create a new rng holder if it doesn't exist yet
            .or_insert_with(|| {
                trace!(
                    "creating new RNG (seed={}) for stream {}",
                    base_seed,
                    R::get_name()
                );
                let seed_offset = hash_str(R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(
                        base_seed.wrapping_add(seed_offset),
                    )),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            .expect("rng stored under the wrong type id")
    }

    /// Gets a random sample from the stream associated with `rng_id` by applying the specified
    /// sampler function.
    pub fn sample<R: RngId, T>(
        &mut self,
        rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        sampler(self.get_rng(rng_id))
    }

    /// Gets a random sample within the range provided by `range`.
    pub fn sample_range<R: RngId, S, T>(&mut self, rng_id: R, range: S) -> T
    where
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    /// Gets a uniform `f64` in `[0, 1)`.
    pub fn sample_unit<R: RngId>(&mut self, rng_id: R) -> f64 {
        self.sample(rng_id, |rng| rng.random::<f64>())
    }

    /// Draws an index into `weights` with probability proportional to its weight.
    ///
    /// # Panics
    ///
    /// Panics if `weights` is empty, contains a negative weight or sums to zero.
    pub fn sample_weighted<R: RngId>(&mut self, rng_id: R, weights: &[f64]) -> usize {
        let index = WeightedIndex::new(weights).expect("invalid sampling weights");
        index.sample(self.get_rng(rng_id))
    }
}
