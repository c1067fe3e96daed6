//! Faster (but not DoS-resistant) hashmap
use farmhash;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher, BuildHasherDefault};

/// Chain farmhash over every write
///
/// farmhash isn't a streaming hash, so each chunk is hashed with the running
/// state as its seed. `str` writes its bytes and then a terminator, and a pair
/// writes both halves, so the seed chaining is what keeps those keys apart.
pub struct FarmChain (u64);

impl Default for FarmChain {
    #[inline]
    fn default() -> FarmChain { FarmChain(0) }
}

impl Hasher for FarmChain {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.0 = farmhash::hash64_with_seed(bytes, self.0);
    }
}

pub type Farm = BuildHasherDefault<FarmChain>;
pub type FarmMap<X, Y> = HashMap<X, Y, Farm>;

pub type FarmSet<X> = HashSet<X, Farm>;

pub fn new_farm<X: Hash+Eq, Y>() -> FarmMap<X, Y> {
    Default::default()
}
