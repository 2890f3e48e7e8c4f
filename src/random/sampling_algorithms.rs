//! Algorithms for uniform random sampling from the slice of cells eligible for some action.
//! Both variants return indexes into the slice rather than cloned items, so callers can write
//! back into the grid.

use crate::rand::seq::index::sample as choose_range;
use crate::rand::Rng;

/// Sample `requested` positions uniformly *with* replacement from a slice of length `len`.
///
/// The same position may be returned more than once, so the number of distinct positions can be
/// smaller than `requested`. Vaccination relies on exactly this behavior.
pub fn sample_multiple_with_replacement<R: Rng>(
    rng: &mut R,
    len: usize,
    requested: usize,
) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    // This little trick with `u32` makes sampling measurably faster on large grids.
    if u32::try_from(len).is_ok() {
        (0..requested)
            .map(|_| rng.random_range(0..len as u32) as usize)
            .collect()
    } else {
        (0..requested).map(|_| rng.random_range(0..len)).collect()
    }
}

/// Sample `requested` distinct positions uniformly *without* replacement from a slice of length
/// `len`. If more samples are requested than there are positions, every position is returned.
///
/// The positions are returned in ascending order.
pub fn sample_multiple_without_replacement<R: Rng>(
    rng: &mut R,
    len: usize,
    requested: usize,
) -> Vec<usize> {
    if requested >= len {
        return (0..len).collect();
    }
    let mut indexes = Vec::with_capacity(requested);
    indexes.extend(choose_range(rng, len, requested));
    indexes.sort_unstable();
    indexes
}
