//! PC Classifier Tests.
//!
//! Verifies the fingerprint bit layout, the four-way classification decision,
//! training, and the bounded FIFO alias table that resolves PCs both filters
//! claim.

use lime_policy::policy::{AliasTable, Category, PcClassifier, fingerprint};
use lime_policy::{PolicyConfig, PolicyError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn classifier() -> PcClassifier {
    PcClassifier::new(&PolicyConfig::default()).unwrap()
}

/// Makes `fp` a member of both filters.
fn make_ambiguous(classifier: &mut PcClassifier, fp: u32) {
    classifier.train(fp, Category::Friendly);
    classifier.train(fp, Category::Streaming);
}

// ══════════════════════════════════════════════════════════
// 1. Fingerprint
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x0000_0000_0000_1000, 0x0_1000)]
#[case(0x0000_0000_0040_ABCD, 0x0_ABCD)]
#[case(0x0000_0001_0000_0000, 0x2_0000)]
#[case(0x0000_0100_0000_0000, 0x4_0000)]
#[case(0x0000_0101_0000_FFFF, 0x6_FFFF)]
#[case(0xFFFF_FEFE_FFFF_0000, 0x0_0000)]
fn fingerprint_layout(#[case] pc: u64, #[case] expected: u32) {
    assert_eq!(fingerprint(pc), expected);
}

/// PCs that differ only in discarded bits share a category.
#[test]
fn aliasing_pcs_share_category() {
    let mut classifier = classifier();
    classifier.train(fingerprint(0x40_1234), Category::Streaming);
    assert_eq!(classifier.classify_pc(0x77_1234), Category::Streaming);
    assert_eq!(classifier.classify_pc(0x1_0000_1234), Category::Random);
}

// ══════════════════════════════════════════════════════════
// 2. Classification
// ══════════════════════════════════════════════════════════

#[test]
fn untrained_fingerprint_is_random() {
    let mut classifier = classifier();
    assert_eq!(classifier.classify(0x1000), Category::Random);
    assert!(classifier.aliases().is_empty());
}

/// Training is immediately observable.
#[test]
fn friendly_training_round_trip() {
    let mut classifier = classifier();
    classifier.train(0x1000, Category::Friendly);
    assert_eq!(classifier.classify(0x1000), Category::Friendly);
    assert!(classifier.aliases().is_empty());
}

#[test]
fn streaming_training_round_trip() {
    let mut classifier = classifier();
    classifier.train(0x2000, Category::Streaming);
    assert_eq!(classifier.classify(0x2000), Category::Streaming);
}

/// The first ambiguous sighting allocates a friendly alias entry.
#[test]
fn ambiguous_defaults_to_friendly() {
    let mut classifier = classifier();
    make_ambiguous(&mut classifier, 0x3000);
    assert!(classifier.aliases().is_empty());

    assert_eq!(classifier.classify(0x3000), Category::Friendly);
    assert_eq!(classifier.aliases().len(), 1);
    let entry = classifier.aliases().get(0x3000).copied().unwrap();
    assert!(entry.friendly);

    // Repeat lookups reuse the entry.
    assert_eq!(classifier.classify(0x3000), Category::Friendly);
    assert_eq!(classifier.aliases().len(), 1);
    assert_eq!(classifier.alias_activity().inserts, 1);
}

/// Training flips an existing alias flag in either direction.
#[test]
fn training_updates_alias_flag() {
    let mut classifier = classifier();
    make_ambiguous(&mut classifier, 0x3000);
    let _ = classifier.classify(0x3000);

    classifier.train(0x3000, Category::Streaming);
    assert_eq!(classifier.classify(0x3000), Category::Streaming);

    classifier.train(0x3000, Category::Friendly);
    assert_eq!(classifier.classify(0x3000), Category::Friendly);
}

/// Training alone never allocates alias entries.
#[test]
fn training_without_entry_leaves_table_alone() {
    let mut classifier = classifier();
    make_ambiguous(&mut classifier, 0x4000);
    classifier.train(0x4000, Category::Streaming);
    assert!(classifier.aliases().get(0x4000).is_none());
}

/// Filter bits are never removed by later training.
#[test]
fn filter_membership_is_permanent() {
    let mut classifier = classifier();
    classifier.train(0x5000, Category::Friendly);
    for fp in 0..200 {
        classifier.train(fp, Category::Streaming);
    }
    assert!(classifier.friendly_filter().may_contain(0x5000));
}

// ══════════════════════════════════════════════════════════
// 3. Alias Table Bound
// ══════════════════════════════════════════════════════════

/// More than 256 distinct ambiguous fingerprints evict oldest first.
#[test]
fn alias_table_fifo_eviction() {
    let mut classifier = classifier();
    let fps: Vec<u32> = (0..300).map(|i| 0x100 + i * 3).collect();
    for &fp in &fps {
        make_ambiguous(&mut classifier, fp);
    }
    for &fp in &fps {
        assert_eq!(classifier.classify(fp), Category::Friendly);
        assert!(classifier.aliases().len() <= 256);
    }

    let table = classifier.aliases();
    assert_eq!(table.capacity(), 256);
    assert_eq!(table.len(), 256);
    let held: Vec<u32> = table.iter().map(|e| e.fingerprint).collect();
    assert_eq!(held, fps[44..].to_vec());
    assert_eq!(classifier.alias_activity().inserts, 300);
    assert_eq!(classifier.alias_activity().evictions, 44);
}

/// An evicted fingerprint forgets its flag and comes back friendly.
#[test]
fn evicted_entry_returns_with_default() {
    let config = PolicyConfig {
        alias_capacity: 2,
        ..PolicyConfig::default()
    };
    let mut classifier = PcClassifier::new(&config).unwrap();
    for fp in [10, 20, 30] {
        make_ambiguous(&mut classifier, fp);
    }

    let _ = classifier.classify(10);
    classifier.train(10, Category::Streaming);
    assert_eq!(classifier.classify(10), Category::Streaming);

    let _ = classifier.classify(20);
    let _ = classifier.classify(30);
    assert!(classifier.aliases().get(10).is_none());

    assert_eq!(classifier.classify(10), Category::Friendly);
}

/// Tunables that validation refuses never produce a classifier, so an
/// untrained PC can never come back anything but random.
#[rstest]
#[case(PolicyConfig { filter_hashes: 0, ..PolicyConfig::default() })]
#[case(PolicyConfig { filter_bits: 0, ..PolicyConfig::default() })]
#[case(PolicyConfig { alias_capacity: 0, ..PolicyConfig::default() })]
fn invalid_config_rejected(#[case] config: PolicyConfig) {
    assert!(config.validate().is_err());
    let err = PcClassifier::new(&config).unwrap_err();
    assert!(matches!(err, PolicyError::InvalidConfig(_)), "{err:?}");
}

#[test]
fn zero_capacity_alias_table_rejected() {
    assert!(matches!(AliasTable::new(0), Err(PolicyError::InvalidConfig(_))));
    assert_eq!(AliasTable::new(1).unwrap().capacity(), 1);
}

proptest! {
    #[test]
    fn alias_table_never_exceeds_capacity(
        ops in prop::collection::vec((0u32..64, 0u8..3), 0..400),
    ) {
        let config = PolicyConfig {
            alias_capacity: 8,
            ..PolicyConfig::default()
        };
        let mut classifier = PcClassifier::new(&config).unwrap();
        for (fp, op) in ops {
            match op {
                0 => classifier.train(fp, Category::Friendly),
                1 => classifier.train(fp, Category::Streaming),
                _ => {
                    let _ = classifier.classify(fp);
                }
            }
            prop_assert!(classifier.aliases().len() <= 8);
        }
    }

    #[test]
    fn classify_never_returns_thrash(fps in prop::collection::vec(any::<u32>(), 1..100)) {
        let mut classifier = classifier();
        for (i, &fp) in fps.iter().enumerate() {
            let category = if i % 2 == 0 { Category::Friendly } else { Category::Streaming };
            classifier.train(fp, category);
        }
        for fp in fps {
            prop_assert_ne!(classifier.classify(fp), Category::Thrash);
        }
    }
}
