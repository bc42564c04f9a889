//! LIME Replacement Engine.
//!
//! Combines RRIP victim selection with PC-based bypass and insertion decisions.
//!
//! On a miss the engine first decides whether the line is worth inserting:
//! writebacks never are, streaming PCs never are, and random PCs are not when
//! the set has gone a long time without a hit. Otherwise the usual RRIP search
//! picks the victim.
//!
//! After every demand access the engine updates the set's activity counter,
//! trains the PC (friendly when the set just hit, streaming when a miss claimed
//! a way in a set that has not hit since), and then places the touched line in
//! the RRPV table according to the PC's current category.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `get_victim()`: O(W × R + A) where A is the alias table capacity
//!   - `update()`: O(W + A)
//! - **Space Complexity:** O(S × W) RRPVs, O(S) counters, two fixed Bloom filters
//! - **Hardware Cost:** Moderate - roughly 64 KiB for an 8192-set LLC

use tracing::{debug, trace};

use super::activity::ActivityCounters;
use super::classifier::{Category, PcClassifier, fingerprint};
use super::rrpv::RrpvTable;
use super::{ReplacementPolicy, Victim};
use crate::common::constants::{DISTANT_RRPV, NEAR_RRPV};
use crate::common::{AccessInfo, AccessType, Block, PolicyError};
use crate::config::{CacheGeometry, PolicyConfig};
use crate::stats::PolicyStats;

/// LIME policy state.
#[derive(Clone, Debug)]
pub struct LimePolicy {
    /// Cache shape.
    geometry: CacheGeometry,
    /// Activity level above which random PCs bypass.
    bypass_threshold: u8,
    /// Per-line prediction values.
    rrpv: RrpvTable,
    /// Per-set hit-recency counters.
    activity: ActivityCounters,
    /// PC categories.
    classifier: PcClassifier,
    /// Decision counters.
    stats: PolicyStats,
}

impl LimePolicy {
    /// Creates a policy for the harness configuration `selector` with default tunables.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownConfig`] if the selector is not 1-4.
    pub fn new(selector: u32) -> Result<Self, PolicyError> {
        let geometry = CacheGeometry::from_selector(selector)?;
        Self::with_config(geometry, &PolicyConfig::default())
    }

    /// Creates a policy for an explicit geometry and tunables.
    ///
    /// Every line starts at `MAX_RRPV` and every activity counter at zero.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if the tunables or the geometry
    /// fail validation.
    pub fn with_config(geometry: CacheGeometry, config: &PolicyConfig) -> Result<Self, PolicyError> {
        geometry.validate()?;

        let classifier = PcClassifier::new(config)?;

        debug!(
            cores = geometry.num_cores,
            sets = geometry.sets,
            ways = geometry.ways,
            filter_bits = config.filter_bits,
            filter_hashes = config.filter_hashes,
            alias_capacity = config.alias_capacity,
            "initialized LIME replacement state"
        );

        Ok(Self {
            geometry,
            bypass_threshold: config.bypass_activity_threshold,
            rrpv: RrpvTable::new(geometry.sets, geometry.ways),
            activity: ActivityCounters::new(geometry.sets),
            classifier,
            stats: PolicyStats::default(),
        })
    }

    /// Rejects accesses outside the configured geometry.
    fn check_access(&self, access: &AccessInfo) -> Result<(), PolicyError> {
        if access.cpu >= self.geometry.num_cores {
            return Err(PolicyError::CpuOutOfRange {
                cpu: access.cpu,
                cores: self.geometry.num_cores,
            });
        }
        if access.set >= self.geometry.sets {
            return Err(PolicyError::SetOutOfRange {
                set: access.set,
                sets: self.geometry.sets,
            });
        }
        Ok(())
    }

    /// Victim selection using the harness's numeric encoding.
    ///
    /// Returns the way to fill, or `ways` (16) to bypass.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] for an unknown access type or an access
    /// outside the configured geometry.
    pub fn get_victim_in_set(
        &mut self,
        cpu: u32,
        set: u32,
        current_set: &[Block],
        pc: u64,
        paddr: u64,
        access_type: u32,
    ) -> Result<u32, PolicyError> {
        let access = AccessInfo::new(
            cpu as usize,
            set as usize,
            pc,
            paddr,
            AccessType::try_from(access_type)?,
        );
        let victim = self.get_victim(&access, current_set)?;
        Ok(victim.to_way_index(self.geometry.ways) as u32)
    }

    /// State update using the harness's numeric encoding.
    ///
    /// A `way` equal to `ways` (16) marks a bypassed access.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] for an unknown access type, a way index past
    /// the bypass sentinel, or an access outside the configured geometry.
    pub fn update_replacement_state(
        &mut self,
        cpu: u32,
        set: u32,
        way: u32,
        paddr: u64,
        pc: u64,
        victim_addr: u64,
        access_type: u32,
        hit: bool,
    ) -> Result<(), PolicyError> {
        let access = AccessInfo::new(
            cpu as usize,
            set as usize,
            pc,
            paddr,
            AccessType::try_from(access_type)?,
        );
        let victim = Victim::from_way_index(way as usize, self.geometry.ways)?;
        self.update(&access, victim, victim_addr, hit)
    }

    /// Category the classifier currently assigns to `pc`.
    ///
    /// Classification may allocate an alias entry for an ambiguous PC.
    pub fn classify(&mut self, pc: u64) -> Category {
        self.classifier.classify_pc(pc)
    }

    /// Places a touched line in the RRPV table according to its category.
    fn place_line(&mut self, set: usize, way: usize, category: Category, hit: bool) {
        match (hit, category) {
            (true, Category::Random) => self.rrpv.clamp(set, way, NEAR_RRPV),
            (true, Category::Streaming) => self.rrpv.update(set, way, NEAR_RRPV),
            (true, Category::Thrash | Category::Friendly) => self.rrpv.update(set, way, 0),
            (false, Category::Random | Category::Streaming) => {
                self.rrpv.update(set, way, DISTANT_RRPV);
            }
            (false, Category::Thrash | Category::Friendly) => {
                self.rrpv.update(set, way, 0);
                self.rrpv.age_siblings(set, way);
            }
        }
    }

    /// Cache shape.
    pub const fn geometry(&self) -> CacheGeometry {
        self.geometry
    }

    /// RRPV of one line.
    ///
    /// # Panics
    ///
    /// Panics if `set` or `way` lies outside the geometry.
    pub fn rrpv(&self, set: usize, way: usize) -> u8 {
        self.rrpv.get(set, way)
    }

    /// RRPVs of one set, indexed by way.
    ///
    /// # Panics
    ///
    /// Panics if `set` lies outside the geometry.
    pub fn set_rrpvs(&self, set: usize) -> &[u8] {
        self.rrpv.set(set)
    }

    /// Activity counter of one set.
    ///
    /// # Panics
    ///
    /// Panics if `set` lies outside the geometry.
    pub fn activity(&self, set: usize) -> u8 {
        self.activity.get(set)
    }

    /// The PC classifier.
    pub const fn classifier(&self) -> &PcClassifier {
        &self.classifier
    }

    /// Snapshot of the decision counters.
    pub fn stats(&self) -> PolicyStats {
        let aliases = self.classifier.alias_activity();
        PolicyStats {
            alias_inserts: aliases.inserts,
            alias_evictions: aliases.evictions,
            ..self.stats.clone()
        }
    }

    /// Emits a one-line progress record.
    pub fn print_heartbeat(&self) {
        self.stats().heartbeat();
    }

    /// Prints the end-of-run report to stdout.
    pub fn print_stats(&self) {
        self.stats().print();
    }
}

impl ReplacementPolicy for LimePolicy {
    /// Chooses a way to fill or bypasses.
    ///
    /// Writebacks bypass unconditionally. Demand accesses bypass when the PC is
    /// streaming, or when it is random and the set is cold. Everything else goes
    /// through RRIP search.
    fn get_victim(
        &mut self,
        access: &AccessInfo,
        current_set: &[Block],
    ) -> Result<Victim, PolicyError> {
        self.check_access(access)?;
        if current_set.len() != self.geometry.ways {
            return Err(PolicyError::BlockCountMismatch {
                len: current_set.len(),
                ways: self.geometry.ways,
            });
        }
        self.stats.victim_requests += 1;

        if access.kind.is_writeback() {
            self.stats.writeback_bypasses += 1;
            return Ok(Victim::Bypass);
        }

        let set = access.set;
        let category = self.classifier.classify_pc(access.pc);
        let activity = self.activity.get(set);

        if activity > self.bypass_threshold && category == Category::Random {
            trace!(set, activity, pc = access.pc, "bypass: random PC in cold set");
            self.stats.cold_random_bypasses += 1;
            return Ok(Victim::Bypass);
        }
        if category == Category::Streaming {
            trace!(set, pc = access.pc, "bypass: streaming PC");
            self.stats.streaming_bypasses += 1;
            return Ok(Victim::Bypass);
        }

        let search = self.rrpv.find_victim(set);
        self.stats.victim_searches += 1;
        self.stats.aging_sweeps += u64::from(search.sweeps);
        Ok(Victim::Way(search.way))
    }

    /// Trains the activity counter and classifier, then repositions the line.
    ///
    /// Prefetches and writebacks are ignored.
    fn update(
        &mut self,
        access: &AccessInfo,
        victim: Victim,
        _victim_addr: u64,
        hit: bool,
    ) -> Result<(), PolicyError> {
        self.check_access(access)?;
        let ways = self.geometry.ways;
        match victim {
            Victim::Way(way) if way >= ways => {
                return Err(PolicyError::WayOutOfRange { way, ways });
            }
            // A hit always lands in a resident way.
            Victim::Bypass if hit => {
                return Err(PolicyError::WayOutOfRange { way: ways, ways });
            }
            _ => {}
        }

        if !access.kind.trains() {
            self.stats.ignored_updates += 1;
            return Ok(());
        }
        self.stats.updates += 1;
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }

        let set = access.set;
        let activity = self.activity.record(set, hit);
        let fp = fingerprint(access.pc);

        if activity == 0 {
            self.classifier.train(fp, Category::Friendly);
            self.stats.friendly_trainings += 1;
        } else if !hit && !victim.is_bypass() {
            self.classifier.train(fp, Category::Streaming);
            self.stats.streaming_trainings += 1;
        }

        let Victim::Way(way) = victim else {
            return Ok(());
        };
        let category = self.classifier.classify(fp);
        self.place_line(set, way, category, hit);
        Ok(())
    }
}
