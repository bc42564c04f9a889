//! Policy Constants.
//!
//! This module defines the fixed parameters of the replacement policy. It includes:
//! 1. **Geometry:** Associativity and per-core set counts.
//! 2. **RRPV Constants:** The prediction value range and the insertion/promotion points.
//! 3. **Fingerprint Constants:** Bit positions used to fold a PC into 18 bits.

/// Associativity of the last-level cache.
pub const LLC_WAYS: usize = 16;

/// Number of LLC sets contributed by each simulated core.
pub const SETS_PER_CORE: usize = 2048;

/// Maximum re-reference prediction value (3-bit counter).
///
/// A line at this value is eligible for eviction immediately.
pub const MAX_RRPV: u8 = 7;

/// RRPV assigned to a line predicted to be re-referenced soon (hit promotion point).
pub const NEAR_RRPV: u8 = MAX_RRPV - 4;

/// RRPV assigned to a line inserted by a PC with no useful history.
pub const DISTANT_RRPV: u8 = MAX_RRPV - 1;

/// Siblings at or above this value are left alone when a friendly line is inserted.
pub const SIBLING_AGING_LIMIT: u8 = 6;

/// Mask selecting the low 16 PC bits kept by the fingerprint.
pub const FINGERPRINT_LOW_MASK: u64 = 0xFFFF;

/// PC bit folded into the fingerprint at [`FINGERPRINT_BIT32_POS`].
pub const FINGERPRINT_BIT32: u32 = 32;

/// Fingerprint position of PC bit 32.
pub const FINGERPRINT_BIT32_POS: u32 = 17;

/// PC bit folded into the fingerprint at [`FINGERPRINT_BIT40_POS`].
pub const FINGERPRINT_BIT40: u32 = 40;

/// Fingerprint position of PC bit 40.
pub const FINGERPRINT_BIT40_POS: u32 = 18;

/// Largest value an activity counter can hold.
pub const ACTIVITY_MAX: u8 = u8::MAX;
