//! Policy Error definitions.
//!
//! The replacement policy is a total state machine over its stated domains, so
//! the only errors are caller contract violations. They are reported before any
//! state is mutated so a misbehaving harness cannot corrupt the RRPV table.

use thiserror::Error;

/// Errors returned when a caller violates the policy's call contract.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The configuration selector is not one of the recognised values.
    #[error("unknown configuration selector {0} (expected 1-4)")]
    UnknownConfig(u32),

    /// The numeric access type is outside the harness encoding.
    #[error("unknown access type {0}")]
    UnknownAccessType(u32),

    /// The set index is outside the configured geometry.
    #[error("set {set} out of range ({sets} sets)")]
    SetOutOfRange {
        /// Offending set index.
        set: usize,
        /// Number of configured sets.
        sets: usize,
    },

    /// The way index is neither a valid way nor the bypass sentinel.
    #[error("way {way} out of range ({ways} ways)")]
    WayOutOfRange {
        /// Offending way index.
        way: usize,
        /// Associativity.
        ways: usize,
    },

    /// The CPU index exceeds the configured core count.
    #[error("cpu {cpu} out of range ({cores} cores)")]
    CpuOutOfRange {
        /// Offending core index.
        cpu: usize,
        /// Number of configured cores.
        cores: usize,
    },

    /// The line metadata passed to victim selection does not cover one set.
    #[error("expected {ways} blocks for the set, got {len}")]
    BlockCountMismatch {
        /// Length of the slice passed in.
        len: usize,
        /// Associativity.
        ways: usize,
    },

    /// A tunable in the policy configuration cannot be honoured.
    #[error("invalid policy configuration: {0}")]
    InvalidConfig(String),
}
