//! Access Metadata.
//!
//! This module defines what the harness tells the policy about each access:
//! 1. **Access Type:** Demand load, read-for-ownership, prefetch, or writeback.
//! 2. **Access Information:** The CPU, set, instruction pointer, and address of a reference.
//! 3. **Line Metadata:** The harness's view of a resident line, passed to victim selection.

use super::error::PolicyError;

/// Type of LLC access.
///
/// The discriminants match the harness's numeric encoding so the legacy
/// entry points can convert without a lookup table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Demand data load.
    Load = 0,

    /// Read-for-ownership issued by a store miss.
    Rfo = 1,

    /// Hardware prefetch fill.
    ///
    /// Prefetches never train the policy.
    Prefetch = 2,

    /// Dirty line written back from an upper level.
    ///
    /// Writebacks always bypass and never train the policy.
    Writeback = 3,
}

impl AccessType {
    /// Returns `true` for writebacks, which never claim a way.
    #[inline]
    pub const fn is_writeback(self) -> bool {
        matches!(self, Self::Writeback)
    }

    /// Returns `true` if accesses of this type update predictive state.
    #[inline]
    pub const fn trains(self) -> bool {
        matches!(self, Self::Load | Self::Rfo)
    }
}

impl TryFrom<u32> for AccessType {
    type Error = PolicyError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Load),
            1 => Ok(Self::Rfo),
            2 => Ok(Self::Prefetch),
            3 => Ok(Self::Writeback),
            other => Err(PolicyError::UnknownAccessType(other)),
        }
    }
}

impl From<AccessType> for u32 {
    fn from(kind: AccessType) -> Self {
        kind as Self
    }
}

/// Metadata describing one memory reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessInfo {
    /// Simulated core that issued the reference.
    pub cpu: usize,
    /// LLC set index the address maps to.
    pub set: usize,
    /// Instruction pointer of the load or store.
    pub pc: u64,
    /// Physical address of the reference.
    pub paddr: u64,
    /// Kind of access.
    pub kind: AccessType,
}

impl AccessInfo {
    /// Creates access metadata for a reference.
    ///
    /// # Arguments
    ///
    /// * `cpu` - The issuing core.
    /// * `set` - The LLC set index.
    /// * `pc` - The instruction pointer.
    /// * `paddr` - The physical address.
    /// * `kind` - The access type.
    pub const fn new(cpu: usize, set: usize, pc: u64, paddr: u64, kind: AccessType) -> Self {
        Self {
            cpu,
            set,
            pc,
            paddr,
            kind,
        }
    }

    /// Convenience constructor for a demand load from core 0.
    pub const fn load(set: usize, pc: u64, paddr: u64) -> Self {
        Self::new(0, set, pc, paddr, AccessType::Load)
    }
}

/// The harness's view of a resident cache line.
///
/// The policy does not read line contents; the slice is accepted so the
/// victim-selection call mirrors what the harness has on hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Line holds valid data.
    pub valid: bool,
    /// Line has been written since it was filled.
    pub dirty: bool,
    /// Line-aligned physical address of the resident data.
    pub address: u64,
    /// Tag bits of the resident data.
    pub tag: u64,
}
