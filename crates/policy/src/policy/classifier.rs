//! PC Classifier.
//!
//! Sorts load/store instruction pointers into behavioural categories using two
//! Bloom filters, one for PCs whose lines tend to be reused ("friendly") and one
//! for PCs whose lines tend to die in the cache ("streaming").
//!
//! A PC that both filters claim is ambiguous. Ambiguity is resolved by a small
//! exact alias table holding a `(fingerprint, is_friendly)` flag per PC. The
//! table is bounded and drops its oldest entry when full. A PC seen ambiguous for
//! the first time is assumed friendly.
//!
//! Training only ever adds filter bits, so the filters drift toward higher
//! false-positive rates over a run. The alias table lets ambiguous PCs follow
//! the most recent training signal despite that.

use std::collections::VecDeque;

use tracing::trace;

use super::bloom::BloomFilter;
use crate::common::PolicyError;
use crate::common::constants::{
    FINGERPRINT_BIT32, FINGERPRINT_BIT32_POS, FINGERPRINT_BIT40, FINGERPRINT_BIT40_POS,
    FINGERPRINT_LOW_MASK,
};
use crate::config::PolicyConfig;

/// Behavioural category of a load/store PC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// No filter claims the PC.
    Random,
    /// Lines inserted by the PC are rarely reused.
    Streaming,
    /// Lines inserted by the PC thrash the set.
    ///
    /// Never produced by [`PcClassifier::classify`]; RRPV updates treat it
    /// like [`Category::Friendly`].
    Thrash,
    /// Lines inserted by the PC are reused.
    Friendly,
}

/// Folds a PC into the classification fingerprint.
///
/// Keeps the low 16 bits, moves PC bit 32 to bit 17 and PC bit 40 to bit 18.
///
/// # Examples
///
/// ```
/// use lime_policy::policy::classifier::fingerprint;
///
/// assert_eq!(fingerprint(0x1000), 0x1000);
/// assert_eq!(fingerprint(0x1_0000_1234), 0x2_1234);
/// assert_eq!(fingerprint(0x100_0000_0000), 0x4_0000);
/// ```
#[inline]
pub const fn fingerprint(pc: u64) -> u32 {
    let low = pc & FINGERPRINT_LOW_MASK;
    let bit32 = (pc >> FINGERPRINT_BIT32) & 1;
    let bit40 = (pc >> FINGERPRINT_BIT40) & 1;
    (low | (bit32 << FINGERPRINT_BIT32_POS) | (bit40 << FINGERPRINT_BIT40_POS)) as u32
}

/// Exact override for an ambiguous fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AliasEntry {
    /// PC fingerprint.
    pub fingerprint: u32,
    /// `true` if the PC currently resolves to friendly, `false` for streaming.
    pub friendly: bool,
}

/// Bounded FIFO of alias entries with linear lookup.
#[derive(Clone, Debug)]
pub struct AliasTable {
    /// Entries, oldest first.
    entries: VecDeque<AliasEntry>,
    /// Maximum number of entries.
    capacity: usize,
}

impl AliasTable {
    /// Creates an empty table holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, PolicyError> {
        if capacity == 0 {
            return Err(PolicyError::InvalidConfig(
                "alias table needs room for at least one entry".to_string(),
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Looks up the entry for `fp`.
    pub fn get(&self, fp: u32) -> Option<&AliasEntry> {
        self.entries.iter().find(|e| e.fingerprint == fp)
    }

    /// Looks up the entry for `fp` for modification.
    pub fn get_mut(&mut self, fp: u32) -> Option<&mut AliasEntry> {
        self.entries.iter_mut().find(|e| e.fingerprint == fp)
    }

    /// Appends an entry, dropping the oldest one first if the table is full.
    ///
    /// Returns the dropped entry, if any.
    pub fn push(&mut self, entry: AliasEntry) -> Option<AliasEntry> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }
}

/// Outcome counters for alias table maintenance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AliasActivity {
    /// Entries added for first-time ambiguous fingerprints.
    pub inserts: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
}

/// PC classifier state.
#[derive(Clone, Debug)]
pub struct PcClassifier {
    /// PCs observed feeding active sets.
    friendly: BloomFilter,
    /// PCs observed inserting into cold sets.
    streaming: BloomFilter,
    /// Overrides for fingerprints both filters claim.
    aliases: AliasTable,
    /// Alias maintenance counters.
    activity: AliasActivity,
}

impl PcClassifier {
    /// Creates a classifier sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: &PolicyConfig) -> Result<Self, PolicyError> {
        config.validate()?;
        Ok(Self {
            friendly: BloomFilter::with_seed(
                config.filter_bits,
                config.filter_hashes,
                config.hash_seed,
            )?,
            streaming: BloomFilter::with_seed(
                config.filter_bits,
                config.filter_hashes,
                config.hash_seed,
            )?,
            aliases: AliasTable::new(config.alias_capacity)?,
            activity: AliasActivity::default(),
        })
    }

    /// Classifies a fingerprint.
    ///
    /// Ambiguous fingerprints without an alias entry get one, defaulting to
    /// friendly, so this call can modify the alias table.
    pub fn classify(&mut self, fp: u32) -> Category {
        let key = u64::from(fp);
        let friendly = self.friendly.may_contain(key);
        let streaming = self.streaming.may_contain(key);

        match (friendly, streaming) {
            (true, true) => {
                if let Some(entry) = self.aliases.get(fp) {
                    return if entry.friendly {
                        Category::Friendly
                    } else {
                        Category::Streaming
                    };
                }
                self.activity.inserts += 1;
                if let Some(old) = self.aliases.push(AliasEntry {
                    fingerprint: fp,
                    friendly: true,
                }) {
                    self.activity.evictions += 1;
                    trace!(evicted = old.fingerprint, "alias table full");
                }
                trace!(fp, "new ambiguous fingerprint");
                Category::Friendly
            }
            (true, false) => Category::Friendly,
            (false, true) => Category::Streaming,
            (false, false) => Category::Random,
        }
    }

    /// Fingerprints `pc` and classifies it.
    pub fn classify_pc(&mut self, pc: u64) -> Category {
        self.classify(fingerprint(pc))
    }

    /// Trains a fingerprint toward `category`.
    ///
    /// Friendly and streaming training insert into the matching filter and
    /// overwrite an existing alias flag. Other categories change nothing.
    pub fn train(&mut self, fp: u32, category: Category) {
        let key = u64::from(fp);
        let flag = match category {
            Category::Friendly => {
                self.friendly.insert(key);
                true
            }
            Category::Streaming => {
                self.streaming.insert(key);
                false
            }
            Category::Random | Category::Thrash => return,
        };

        if let Some(entry) = self.aliases.get_mut(fp) {
            entry.friendly = flag;
        }
    }

    /// The friendly-leaning filter.
    pub const fn friendly_filter(&self) -> &BloomFilter {
        &self.friendly
    }

    /// The streaming-leaning filter.
    pub const fn streaming_filter(&self) -> &BloomFilter {
        &self.streaming
    }

    /// The alias table.
    pub const fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Alias maintenance counters.
    pub const fn alias_activity(&self) -> AliasActivity {
        self.activity
    }
}
