//! Multi-Access Scenarios.
//!
//! Drives the policy through `LlcHarness`, which owns tags and calls the entry
//! points in simulator order, and checks the resulting RRPV, activity, and
//! classifier state step by step.

use lime_policy::common::{LLC_WAYS, MAX_RRPV};
use lime_policy::policy::{Category, fingerprint};
use lime_policy::{AccessInfo, AccessType, Block, LimePolicy, ReplacementPolicy, Victim};
use pretty_assertions::assert_eq;

use crate::common::LlcHarness;

/// Single core, 2048 sets, 16 ways; set 5 starts with every RRPV at the maximum.
/// A first-sighting load from PC 0x1000 fills way 0 and lands at `MAX_RRPV - 1`.
#[test]
fn first_miss_end_to_end() {
    let mut policy = LimePolicy::new(1).unwrap();
    assert_eq!(policy.set_rrpvs(5), &[MAX_RRPV; LLC_WAYS]);

    let blocks = [Block::default(); LLC_WAYS];
    let way = policy
        .get_victim_in_set(0, 5, &blocks, 0x1000, 0x8000_0140, 0)
        .unwrap();
    assert_eq!(way, 0);

    policy
        .update_replacement_state(0, 5, way, 0x8000_0140, 0x1000, 0, 0, false)
        .unwrap();
    assert_eq!(policy.activity(5), 1);
    assert_eq!(policy.rrpv(5, 0), MAX_RRPV - 1);
    assert_eq!(policy.rrpv(5, 1), MAX_RRPV);
}

/// Filling a whole set with distinct PCs leaves every way at `MAX_RRPV - 1`;
/// the next fill needs exactly one aging sweep and takes way 0.
#[test]
fn full_set_needs_one_sweep() {
    let mut llc = LlcHarness::new(1);
    for i in 0..LLC_WAYS as u64 {
        let outcome = llc.load(12, 100 + i, 0x1000 + i * 4);
        assert_eq!(outcome.victim, Victim::Way(i as usize));
    }
    assert_eq!(llc.policy.set_rrpvs(12), &[MAX_RRPV - 1; LLC_WAYS]);

    let outcome = llc.load(12, 999, 0x5000);
    assert!(!outcome.hit);
    assert_eq!(outcome.victim, Victim::Way(0));
    assert_eq!(llc.resident_tag(12, 0), Some(999));
    assert_eq!(llc.policy.stats().aging_sweeps, 1);
}

/// A PC first seen hitting (friendly) that then misses becomes ambiguous, is
/// resolved friendly by a new alias entry, inserts at zero, and ages siblings.
/// Its next miss flips the alias flag to streaming, and after that it bypasses.
#[test]
fn friendly_pc_turns_streaming() {
    let mut llc = LlcHarness::new(1);
    let filler = 0x1000;
    let pc = 0x2000;

    let outcome = llc.load(0, 1, filler);
    assert_eq!(outcome.victim, Victim::Way(0));
    assert_eq!(llc.policy.rrpv(0, 0), MAX_RRPV - 1);

    let outcome = llc.load(0, 1, pc);
    assert!(outcome.hit);
    assert_eq!(llc.policy.activity(0), 0);
    assert_eq!(llc.policy.rrpv(0, 0), 0);

    let outcome = llc.load(0, 2, pc);
    assert_eq!(outcome.victim, Victim::Way(1));
    let mut expected = [MAX_RRPV; LLC_WAYS];
    expected[0] = 1;
    expected[1] = 0;
    assert_eq!(llc.policy.set_rrpvs(0), &expected);
    let alias = llc.policy.classifier().aliases().get(fingerprint(pc)).copied();
    assert!(alias.is_some_and(|e| e.friendly));

    let outcome = llc.load(0, 3, pc);
    assert_eq!(outcome.victim, Victim::Way(2));
    expected[2] = MAX_RRPV - 1;
    assert_eq!(llc.policy.set_rrpvs(0), &expected);
    assert_eq!(llc.policy.classify(pc), Category::Streaming);

    let outcome = llc.load(0, 4, pc);
    assert_eq!(outcome.victim, Victim::Bypass);
    assert_eq!(llc.resident_tag(0, 3), None);
    assert_eq!(llc.policy.set_rrpvs(0), &expected);
}

/// Random PCs stop inserting once a set has gone more than 100 misses
/// without a hit, and start again after the set hits.
#[test]
fn cold_set_bypasses_random_pcs() {
    let mut llc = LlcHarness::new(1);
    let set = 9;
    for i in 0..101u64 {
        let outcome = llc.load(set, 1000 + i, 0x10_0000 + i * 4);
        assert!(!outcome.victim.is_bypass(), "miss {i} bypassed");
    }
    assert_eq!(llc.policy.activity(set), 101);

    let outcome = llc.load(set, 5000, 0x20_8000);
    assert_eq!(outcome.victim, Victim::Bypass);
    assert_eq!(llc.policy.stats().cold_random_bypasses, 1);
    assert_eq!(llc.policy.activity(set), 102);

    let resident = llc.resident_tag(set, 0).unwrap();
    let outcome = llc.load(set, resident, 0x20_9000);
    assert!(outcome.hit);
    assert_eq!(llc.policy.activity(set), 0);

    let outcome = llc.load(set, 6000, 0x20_A000);
    assert!(!outcome.victim.is_bypass());
}

/// Activity saturates at 255 under a long run of bypassed misses.
#[test]
fn activity_saturates_through_engine() {
    let mut llc = LlcHarness::new(1);
    for i in 0..400u64 {
        let _ = llc.load(3, i, 0x30_0000 + (i % 200) * 4);
    }
    assert_eq!(llc.policy.activity(3), 255);
    assert_eq!(llc.policy.activity(4), 0);
}

/// Writebacks through the harness never fill and never train.
#[test]
fn writebacks_bypass_through_harness() {
    let mut llc = LlcHarness::new(2);
    let outcome = llc.access(1, 77, 0x1000, AccessType::Writeback).unwrap();
    assert_eq!(outcome.victim, Victim::Bypass);
    assert_eq!(llc.resident_tag(1, 0), None);
    assert_eq!(llc.policy.activity(1), 0);
    assert_eq!(llc.policy.stats().ignored_updates, 1);
}

/// Classifier state is shared by every core of a multi-core LLC.
#[test]
fn cores_share_classifier() {
    let mut policy = LimePolicy::new(4).unwrap();
    let blocks = [Block::default(); LLC_WAYS];
    let pc = 0x7000;

    let info = AccessInfo::new(0, 100, pc, 0, AccessType::Load);
    let victim = policy.get_victim(&info, &blocks).unwrap();
    policy.update(&info, victim, 0, false).unwrap();

    let other = AccessInfo::new(3, 8000, pc, 0, AccessType::Load);
    assert_eq!(policy.get_victim(&other, &blocks).unwrap(), Victim::Bypass);
}

/// Counters stay consistent with the decisions the harness observed.
#[test]
fn stats_match_observed_outcomes() {
    let mut llc = LlcHarness::new(1);
    let mut hits = 0;
    let mut misses = 0;
    let mut bypasses = 0;
    for i in 0..2000u64 {
        let set = (i % 7) as usize;
        let tag = (i * 31) % 23;
        let pc = 0x400 + (i % 13) * 8;
        let outcome = llc.load(set, tag, pc);
        if outcome.hit {
            hits += 1;
        } else {
            misses += 1;
            if outcome.victim.is_bypass() {
                bypasses += 1;
            }
        }
    }

    let stats = llc.policy.stats();
    assert_eq!(stats.hits, hits);
    assert_eq!(stats.misses, misses);
    assert_eq!(stats.bypasses(), bypasses);
    assert_eq!(stats.updates, hits + misses);
    assert!(llc.policy.classifier().aliases().len() <= 256);
    llc.policy.print_heartbeat();
    llc.policy.print_stats();
}
