//! Configuration for the replacement policy.
//!
//! This module defines how a policy instance is parameterized. It provides:
//! 1. **Defaults:** The filter sizing, alias capacity, and bypass threshold the policy ships with.
//! 2. **Geometry:** Core count and set count chosen by the harness's configuration selector.
//! 3. **Tunables:** A deserializable [`PolicyConfig`] for experiments that override the defaults.
//!
//! Tunables are supplied as JSON (see [`PolicyConfig::from_json`]) or use `PolicyConfig::default()`.

use serde::Deserialize;

use crate::common::PolicyError;
use crate::common::constants::{LLC_WAYS, SETS_PER_CORE};

/// Default tunables for the policy.
mod defaults {
    /// Bits in each PC-classification Bloom filter (512 bytes).
    pub const FILTER_BITS: usize = 4096;

    /// Hash functions per Bloom filter insertion and query.
    pub const FILTER_HASHES: u8 = 6;

    /// Entries kept in the alias table before the oldest is dropped.
    pub const ALIAS_CAPACITY: usize = 256;

    /// Activity level above which a random-category PC bypasses the set.
    pub const BYPASS_ACTIVITY_THRESHOLD: u8 = 100;

    /// Seed mixed into every filter hash.
    pub const HASH_SEED: u64 = 0;
}

/// Shape of the simulated last-level cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Number of simulated cores sharing the LLC.
    pub num_cores: usize,
    /// Number of LLC sets.
    pub sets: usize,
    /// `log2(sets)`.
    pub sets_log2: u32,
    /// Associativity.
    pub ways: usize,
}

impl CacheGeometry {
    /// Builds a geometry for `num_cores` cores, each contributing 2048 sets.
    pub const fn for_cores(num_cores: usize) -> Self {
        let sets = num_cores * SETS_PER_CORE;
        Self {
            num_cores,
            sets,
            sets_log2: sets.trailing_zeros(),
            ways: LLC_WAYS,
        }
    }

    /// Maps the harness configuration selector to a geometry.
    ///
    /// Selectors 1 and 2 describe a single-core system with 2048 sets;
    /// selectors 3 and 4 describe a four-core system with 8192 sets.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownConfig`] for any other selector.
    pub fn from_selector(selector: u32) -> Result<Self, PolicyError> {
        match selector {
            1 | 2 => Ok(Self::for_cores(1)),
            3 | 4 => Ok(Self::for_cores(4)),
            other => Err(PolicyError::UnknownConfig(other)),
        }
    }

    /// Total number of lines tracked by the policy.
    pub const fn lines(&self) -> usize {
        self.sets * self.ways
    }

    /// Checks that the geometry describes a cache the policy can track.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if any dimension is zero, the
    /// set count is not a power of two matching `sets_log2`, or the line count
    /// does not fit in `usize`.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.sets == 0 || self.ways == 0 || self.num_cores == 0 {
            return Err(PolicyError::InvalidConfig(format!(
                "degenerate geometry: {} cores, {} sets, {} ways",
                self.num_cores, self.sets, self.ways
            )));
        }
        if !self.sets.is_power_of_two() || self.sets.trailing_zeros() != self.sets_log2 {
            return Err(PolicyError::InvalidConfig(format!(
                "sets_log2 {} does not describe {} sets",
                self.sets_log2, self.sets
            )));
        }
        if self.sets.checked_mul(self.ways).is_none() {
            return Err(PolicyError::InvalidConfig(format!(
                "{} sets of {} ways overflow the line count",
                self.sets, self.ways
            )));
        }
        Ok(())
    }
}

/// Tunables for the classifier and bypass heuristic.
///
/// Every field is optional when deserializing; missing fields take the
/// shipped defaults.
///
/// # Examples
///
/// ```
/// use lime_policy::PolicyConfig;
///
/// let config = PolicyConfig::from_json(r#"{ "filter_bits": 8192 }"#).unwrap();
/// assert_eq!(config.filter_bits, 8192);
/// assert_eq!(config.filter_hashes, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolicyConfig {
    /// Bits in each Bloom filter.
    #[serde(default = "PolicyConfig::default_filter_bits")]
    pub filter_bits: usize,

    /// Hash functions per Bloom filter operation.
    #[serde(default = "PolicyConfig::default_filter_hashes")]
    pub filter_hashes: u8,

    /// Alias table capacity.
    #[serde(default = "PolicyConfig::default_alias_capacity")]
    pub alias_capacity: usize,

    /// Activity counter value above which random PCs bypass.
    #[serde(default = "PolicyConfig::default_bypass_activity_threshold")]
    pub bypass_activity_threshold: u8,

    /// Seed for the filter hash.
    #[serde(default = "PolicyConfig::default_hash_seed")]
    pub hash_seed: u64,
}

impl PolicyConfig {
    fn default_filter_bits() -> usize {
        defaults::FILTER_BITS
    }

    fn default_filter_hashes() -> u8 {
        defaults::FILTER_HASHES
    }

    fn default_alias_capacity() -> usize {
        defaults::ALIAS_CAPACITY
    }

    fn default_bypass_activity_threshold() -> u8 {
        defaults::BYPASS_ACTIVITY_THRESHOLD
    }

    fn default_hash_seed() -> u64 {
        defaults::HASH_SEED
    }

    /// Parses tunables from JSON and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if the JSON is malformed or a
    /// value fails [`PolicyConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PolicyError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every tunable describes a usable structure.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] for a zero-sized filter, a
    /// filter with no hash functions, or an alias table with no capacity.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.filter_bits == 0 {
            return Err(PolicyError::InvalidConfig(
                "filter_bits must be non-zero".to_string(),
            ));
        }
        if self.filter_hashes == 0 {
            return Err(PolicyError::InvalidConfig(
                "filter_hashes must be non-zero".to_string(),
            ));
        }
        if self.alias_capacity == 0 {
            return Err(PolicyError::InvalidConfig(
                "alias_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            filter_bits: defaults::FILTER_BITS,
            filter_hashes: defaults::FILTER_HASHES,
            alias_capacity: defaults::ALIAS_CAPACITY,
            bypass_activity_threshold: defaults::BYPASS_ACTIVITY_THRESHOLD,
            hash_seed: defaults::HASH_SEED,
        }
    }
}
