//! LIME last-level cache replacement policy.
//!
//! This crate implements a replacement-decision engine for a set-associative
//! last-level cache driven by an external simulation harness:
//! 1. **Victim selection:** Re-reference prediction values (RRPV) with RRIP aging.
//! 2. **PC classification:** Two Bloom filters plus an exact alias table sort
//!    instruction pointers into friendly, streaming, and random categories.
//! 3. **Bypass:** A per-set activity counter and the PC category decide when an
//!    incoming line is not worth inserting at all.
//! 4. **Configuration and statistics:** Geometry selection, tunables, and
//!    counters for heartbeat and end-of-run reporting.

/// Common types and constants (access metadata, errors, policy constants).
pub mod common;
/// Policy configuration (cache geometry selectors and tunables).
pub mod config;
/// Replacement policy components and the LIME engine.
pub mod policy;
/// Policy statistics collection and reporting.
pub mod stats;

/// Typed access metadata passed to both entry points.
pub use crate::common::{AccessInfo, AccessType, Block, PolicyError};
/// Cache geometry and policy tunables.
pub use crate::config::{CacheGeometry, PolicyConfig};
/// The replacement engine and its entry-point trait.
pub use crate::policy::{LimePolicy, ReplacementPolicy, Victim};
