//! Cache Replacement Policy.
//!
//! Implements the LIME policy for a shared last-level cache and the pieces it
//! is built from.
//!
//! # Components
//!
//! - `BloomFilter`: Approximate membership filter keyed by PC fingerprints.
//! - `PcClassifier`: Friendly/streaming filters plus the alias table.
//! - `ActivityCounters`: Per-set saturating hit-recency counters.
//! - `RrpvTable`: Per-line re-reference prediction values and RRIP search.
//! - `LimePolicy`: The engine wiring them together behind `ReplacementPolicy`.

/// Per-set activity counters.
pub mod activity;

/// Bloom filter used by the classifier.
pub mod bloom;

/// PC fingerprinting, categories, alias table, and classifier.
pub mod classifier;

/// The LIME replacement engine.
pub mod lime;

/// Re-reference prediction value table.
pub mod rrpv;

pub use activity::ActivityCounters;
pub use bloom::BloomFilter;
pub use classifier::{AliasEntry, AliasTable, Category, PcClassifier, fingerprint};
pub use lime::LimePolicy;
pub use rrpv::{RrpvTable, VictimSearch};

use crate::common::{AccessInfo, Block, PolicyError};

/// Victim-selection outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Victim {
    /// Insert the incoming line into this way.
    Way(usize),
    /// Do not insert the incoming line.
    Bypass,
}

impl Victim {
    /// Decodes the harness's way index, where `ways` itself means bypass.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::WayOutOfRange`] if `way > ways`.
    pub fn from_way_index(way: usize, ways: usize) -> Result<Self, PolicyError> {
        if way < ways {
            Ok(Self::Way(way))
        } else if way == ways {
            Ok(Self::Bypass)
        } else {
            Err(PolicyError::WayOutOfRange { way, ways })
        }
    }

    /// Encodes the outcome as the harness's way index.
    pub const fn to_way_index(self, ways: usize) -> usize {
        match self {
            Self::Way(way) => way,
            Self::Bypass => ways,
        }
    }

    /// The claimed way, or `None` for a bypass.
    pub const fn way(self) -> Option<usize> {
        match self {
            Self::Way(way) => Some(way),
            Self::Bypass => None,
        }
    }

    /// Returns `true` for a bypass.
    pub const fn is_bypass(self) -> bool {
        matches!(self, Self::Bypass)
    }
}

/// Trait for last-level cache replacement policies.
///
/// The harness calls [`ReplacementPolicy::get_victim`] on a miss and then
/// [`ReplacementPolicy::update`] for every hit and fill.
pub trait ReplacementPolicy: Send + Sync {
    /// Selects the way to fill, or decides to bypass.
    ///
    /// # Arguments
    ///
    /// * `access` - The reference being serviced.
    /// * `current_set` - The harness's metadata for every way of the set.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the access lies outside the configured geometry.
    fn get_victim(&mut self, access: &AccessInfo, current_set: &[Block])
    -> Result<Victim, PolicyError>;

    /// Updates policy state after a hit or fill.
    ///
    /// # Arguments
    ///
    /// * `access` - The reference that was serviced.
    /// * `victim` - The way that hit or was filled, or `Victim::Bypass`.
    /// * `victim_addr` - Address of the evicted line, if any.
    /// * `hit` - Whether the reference hit.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the access lies outside the configured geometry.
    fn update(
        &mut self,
        access: &AccessInfo,
        victim: Victim,
        victim_addr: u64,
        hit: bool,
    ) -> Result<(), PolicyError>;
}
