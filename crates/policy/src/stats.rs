//! Policy statistics collection and reporting.
//!
//! This module tracks what the replacement policy decided over a run. It provides:
//! 1. **Victim selection:** Requests, bypasses by reason, RRIP searches, and aging sweeps.
//! 2. **Updates:** Demand hits and misses, plus ignored prefetch/writeback updates.
//! 3. **Training:** Friendly and streaming training events and alias table churn.

use serde::Serialize;
use tracing::info;

/// Replacement policy statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PolicyStats {
    /// Victim-selection calls.
    pub victim_requests: u64,
    /// Writebacks turned away.
    pub writeback_bypasses: u64,
    /// Random-category PCs turned away from cold sets.
    pub cold_random_bypasses: u64,
    /// Streaming-category PCs turned away.
    pub streaming_bypasses: u64,
    /// RRIP searches performed.
    pub victim_searches: u64,
    /// Aging sweeps performed across all searches.
    pub aging_sweeps: u64,

    /// Demand updates processed.
    pub updates: u64,
    /// Prefetch and writeback updates skipped.
    pub ignored_updates: u64,
    /// Demand hits.
    pub hits: u64,
    /// Demand misses.
    pub misses: u64,

    /// PCs trained toward friendly.
    pub friendly_trainings: u64,
    /// PCs trained toward streaming.
    pub streaming_trainings: u64,
    /// Alias entries allocated for ambiguous PCs.
    pub alias_inserts: u64,
    /// Alias entries dropped to make room.
    pub alias_evictions: u64,
}

impl PolicyStats {
    /// Total bypass decisions.
    pub const fn bypasses(&self) -> u64 {
        self.writeback_bypasses + self.cold_random_bypasses + self.streaming_bypasses
    }

    /// Demand hit rate in `[0, 1]`, or zero before any demand update.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Fraction of victim requests that bypassed, or zero before any request.
    pub fn bypass_rate(&self) -> f64 {
        if self.victim_requests == 0 {
            0.0
        } else {
            self.bypasses() as f64 / self.victim_requests as f64
        }
    }

    /// Average aging sweeps per RRIP search.
    pub fn sweeps_per_search(&self) -> f64 {
        if self.victim_searches == 0 {
            0.0
        } else {
            self.aging_sweeps as f64 / self.victim_searches as f64
        }
    }

    /// Logs a one-line progress record at `info` level.
    pub fn heartbeat(&self) {
        info!(
            hits = self.hits,
            misses = self.misses,
            hit_rate = self.hit_rate(),
            bypasses = self.bypasses(),
            alias_inserts = self.alias_inserts,
            "LIME heartbeat"
        );
    }

    /// Serializes the counters as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Prints the end-of-run report to stdout.
    pub fn print(&self) {
        println!("\n==========================================================");
        println!("LIME REPLACEMENT POLICY STATISTICS");
        println!("==========================================================");
        println!("VICTIM SELECTION");
        println!("  victim.requests        {}", self.victim_requests);
        println!(
            "  bypass.total           {} ({:.2}%)",
            self.bypasses(),
            self.bypass_rate() * 100.0
        );
        println!("  bypass.writeback       {}", self.writeback_bypasses);
        println!("  bypass.cold_random     {}", self.cold_random_bypasses);
        println!("  bypass.streaming       {}", self.streaming_bypasses);
        println!("  rrip.searches          {}", self.victim_searches);
        println!(
            "  rrip.sweeps            {} ({:.2}/search)",
            self.aging_sweeps,
            self.sweeps_per_search()
        );
        println!("----------------------------------------------------------");
        println!("UPDATES");
        println!("  demand.hits            {}", self.hits);
        println!("  demand.misses          {}", self.misses);
        println!("  demand.hit_rate        {:.2}%", self.hit_rate() * 100.0);
        println!("  ignored                {}", self.ignored_updates);
        println!("----------------------------------------------------------");
        println!("TRAINING");
        println!("  train.friendly         {}", self.friendly_trainings);
        println!("  train.streaming        {}", self.streaming_trainings);
        println!("  alias.inserts          {}", self.alias_inserts);
        println!("  alias.evictions        {}", self.alias_evictions);
        println!("==========================================================");
    }
}
