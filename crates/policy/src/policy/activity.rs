//! Per-Set Activity Counters.
//!
//! One 8-bit saturating counter per set approximates how long it has been since
//! the set last hit. A hit resets the counter to zero; every miss moves it one
//! step toward 255. A zero counter marks a live set and rewards the accessing PC;
//! a high counter marks a cold set where unpredictable PCs are bypassed.

use crate::common::constants::ACTIVITY_MAX;

/// Activity counter state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityCounters {
    /// One counter per set.
    counters: Vec<u8>,
}

impl ActivityCounters {
    /// Creates `sets` counters, all zero.
    pub fn new(sets: usize) -> Self {
        Self {
            counters: vec![0; sets],
        }
    }

    /// Records a hit or miss in `set` and returns the new counter value.
    #[inline]
    pub fn record(&mut self, set: usize, hit: bool) -> u8 {
        let counter = &mut self.counters[set];
        if hit {
            *counter = 0;
        } else if *counter < ACTIVITY_MAX {
            *counter += 1;
        }
        *counter
    }

    /// Current counter value for `set`.
    ///
    /// # Panics
    ///
    /// Panics if `set` is out of range.
    #[inline]
    pub fn get(&self, set: usize) -> u8 {
        self.counters[set]
    }

    /// Number of sets tracked.
    pub fn sets(&self) -> usize {
        self.counters.len()
    }
}
