//! Re-Reference Prediction Value (RRPV) Table.
//!
//! Each line carries a small counter predicting how soon it will be referenced
//! again. [`MAX_RRPV`] means "evict now"; zero means "just promoted".
//!
//! Victim search is RRIP style: scan the set for a line at [`MAX_RRPV`] and,
//! if none exists, age the whole set by one and scan again. Each sweep raises
//! the set maximum by one and aging never pushes a value past [`MAX_RRPV`], so
//! a search finishes after at most `MAX_RRPV` sweeps.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `find_victim()`: O(W × R) worst case, W ways and R = `MAX_RRPV`
//!   - `set()`: O(1)
//! - **Space Complexity:** O(S × W) 3-bit counters
//! - **Hardware Cost:** Low - per-line counters and a parallel compare

use crate::common::constants::{MAX_RRPV, SIBLING_AGING_LIMIT};

/// Result of an RRIP victim search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VictimSearch {
    /// Way holding the first line at `MAX_RRPV`.
    pub way: usize,
    /// Number of aging sweeps performed before the victim appeared.
    pub sweeps: u8,
}

/// RRPV state for every line of the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RrpvTable {
    /// Row-major RRPVs, `ways` entries per set.
    values: Vec<u8>,
    /// Associativity.
    ways: usize,
}

impl RrpvTable {
    /// Creates a table with every line at `MAX_RRPV`.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            values: vec![MAX_RRPV; sets * ways],
            ways,
        }
    }

    /// RRPVs of one set, indexed by way.
    ///
    /// # Panics
    ///
    /// Panics if `set` is out of range.
    #[inline]
    pub fn set(&self, set: usize) -> &[u8] {
        let base = set * self.ways;
        &self.values[base..base + self.ways]
    }

    #[inline]
    fn set_mut(&mut self, set: usize) -> &mut [u8] {
        let base = set * self.ways;
        &mut self.values[base..base + self.ways]
    }

    /// RRPV of a single line.
    #[inline]
    pub fn get(&self, set: usize, way: usize) -> u8 {
        self.values[set * self.ways + way]
    }

    /// Overwrites the RRPV of a single line, clamped to `MAX_RRPV`.
    #[inline]
    pub fn update(&mut self, set: usize, way: usize, value: u8) {
        self.values[set * self.ways + way] = value.min(MAX_RRPV);
    }

    /// Lowers the RRPV of a line to `cap` if it is above it.
    #[inline]
    pub fn clamp(&mut self, set: usize, way: usize, cap: u8) {
        let value = &mut self.values[set * self.ways + way];
        if *value > cap {
            *value = cap;
        }
    }

    /// Ages every line in `set` except `keep` whose RRPV is below the sibling limit.
    pub fn age_siblings(&mut self, set: usize, keep: usize) {
        for (way, value) in self.set_mut(set).iter_mut().enumerate() {
            if way != keep && *value < SIBLING_AGING_LIMIT {
                *value += 1;
            }
        }
    }

    /// Finds the first way at `MAX_RRPV`, aging the set until one exists.
    pub fn find_victim(&mut self, set: usize) -> VictimSearch {
        let values = self.set_mut(set);
        let mut sweeps = 0;
        loop {
            if let Some(way) = values.iter().position(|&v| v == MAX_RRPV) {
                return VictimSearch { way, sweeps };
            }
            debug_assert!(sweeps < MAX_RRPV, "RRIP search failed to converge");
            for value in values.iter_mut() {
                *value = (*value + 1).min(MAX_RRPV);
            }
            sweeps += 1;
        }
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }
}
