//! Deterministic hashing. The hash of a name, used to derive per-stream seeds in
//! [`crate::random`], must be the same in every process, and the crate's maps and sets use a
//! fixed hasher rather than the randomly seeded standard one.
//!
//! `HashMap<K, V, S>` with a custom hasher has no `new` method; use `HashMap::default()`.

pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use xxhash_rust::xxh3::xxh3_64;

/// A convenience method to compute the hash of a `&str`.
#[must_use]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings() {
        let a = hash_str("hello");
        let b = hash_str("hello");
        let c = hash_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn maps_iterate_in_a_fixed_order() {
        let build = || {
            let mut map = HashMap::default();
            for name in ["infection", "recovery", "death", "vaccination"] {
                map.insert(name.to_string(), hash_str(name));
            }
            map.into_iter().collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
