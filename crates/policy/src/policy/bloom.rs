//! Bloom Filter for PC Classification.
//!
//! A fixed-size bit array supporting probabilistic insertion and membership
//! queries for 64-bit keys. Each key selects `k` bit positions using double
//! hashing over the two 64-bit lanes of a keyed 128-bit SipHash:
//! position `i` is `(h1 + i * h2) mod m`.
//!
//! There is no deletion. A key that was inserted is always reported as a
//! possible member; keys that were never inserted may be reported as members
//! with a probability that grows with the fraction of bits set.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `insert()`: O(k)
//!   - `may_contain()`: O(k)
//! - **Space Complexity:** O(m) bits
//! - **Hardware Cost:** Low - one hash unit and a small SRAM bit vector

use std::hash::Hasher;

use siphasher::sip128::{Hasher128, SipHasher13};

use crate::common::PolicyError;

/// Bit count used by [`BloomFilter::default`].
const DEFAULT_BITS: usize = 1107;

/// Hash count used by [`BloomFilter::default`].
const DEFAULT_HASHES: u8 = 6;

/// Constant folded into the second SipHash key so both key halves differ.
const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Bloom filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Bit storage, 64 bits per word.
    words: Vec<u64>,
    /// Number of addressable bits.
    bits: usize,
    /// Number of bit positions derived per key.
    num_hashes: u8,
    /// Seed mixed into the hash.
    seed: u64,
    /// Insertions since the last clear.
    inserted: usize,
}

impl BloomFilter {
    /// Creates an empty filter with a zero hash seed.
    ///
    /// # Arguments
    ///
    /// * `bits` - Number of bits in the filter.
    /// * `num_hashes` - Bit positions derived per key.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if either argument is zero.
    pub fn new(bits: usize, num_hashes: u8) -> Result<Self, PolicyError> {
        Self::with_seed(bits, num_hashes, 0)
    }

    /// Creates an empty filter whose hash is keyed by `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if `bits` or `num_hashes` is zero.
    /// A filter without hash functions would claim every key.
    pub fn with_seed(bits: usize, num_hashes: u8, seed: u64) -> Result<Self, PolicyError> {
        if bits == 0 {
            return Err(PolicyError::InvalidConfig(
                "bloom filter needs at least one bit".to_string(),
            ));
        }
        if num_hashes == 0 {
            return Err(PolicyError::InvalidConfig(
                "bloom filter needs at least one hash function".to_string(),
            ));
        }
        Ok(Self::empty(bits, num_hashes, seed))
    }

    /// Builds the zeroed storage for already-checked sizing.
    fn empty(bits: usize, num_hashes: u8, seed: u64) -> Self {
        debug_assert!(bits > 0 && num_hashes > 0);
        Self {
            words: vec![0; bits.div_ceil(64)],
            bits,
            num_hashes,
            seed,
            inserted: 0,
        }
    }

    /// Derives the two hash lanes for `key`.
    #[inline]
    fn lanes(&self, key: u64) -> (u64, u64) {
        let mut hasher = SipHasher13::new_with_keys(self.seed, self.seed ^ SEED_SPREAD);
        hasher.write_u64(key);
        let hash = hasher.finish128();
        (hash.h1, hash.h2)
    }

    /// Bit positions selected by `key`, in hash order.
    fn positions(&self, key: u64) -> impl Iterator<Item = usize> + use<> {
        let (a, b) = self.lanes(key);
        let bits = self.bits as u64;
        (0..u64::from(self.num_hashes)).map(move |i| (a.wrapping_add(i.wrapping_mul(b)) % bits) as usize)
    }

    #[inline]
    fn test_bit(&self, pos: usize) -> bool {
        (self.words[pos >> 6] >> (pos & 63)) & 1 == 1
    }

    /// Records `key` in the filter.
    ///
    /// Sets every bit position derived from `key`. Bits are never cleared
    /// except by [`BloomFilter::clear`].
    pub fn insert(&mut self, key: u64) {
        for pos in self.positions(key) {
            self.words[pos >> 6] |= 1_u64 << (pos & 63);
        }
        self.inserted = self.inserted.saturating_add(1);
    }

    /// Returns `true` if `key` may have been inserted.
    ///
    /// Never returns `false` for an inserted key.
    pub fn may_contain(&self, key: u64) -> bool {
        self.positions(key).all(|pos| self.test_bit(pos))
    }

    /// Resets every bit and the insertion count.
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.inserted = 0;
    }

    /// Number of insertions since the filter was created or cleared.
    pub const fn len(&self) -> usize {
        self.inserted
    }

    /// Returns `true` if nothing has been inserted since the last clear.
    pub const fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Number of addressable bits.
    pub const fn bit_count(&self) -> usize {
        self.bits
    }

    /// Number of hash functions.
    pub const fn num_hashes(&self) -> u8 {
        self.num_hashes
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Fraction of bits set, the main driver of the false-positive rate.
    pub fn load(&self) -> f64 {
        self.count_ones() as f64 / self.bits as f64
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::empty(DEFAULT_BITS, DEFAULT_HASHES, 0)
    }
}
