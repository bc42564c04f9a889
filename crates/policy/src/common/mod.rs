//! Common types and constants shared by every policy component.
//!
//! This module provides:
//! 1. **Constants:** Associativity, RRPV range, and fingerprint bit positions.
//! 2. **Access Metadata:** Access types, per-access information, and line metadata.
//! 3. **Error Handling:** The error type returned on caller contract violations.

/// Policy-wide constants.
pub mod constants;

/// Access type and access metadata definitions.
pub mod data;

/// Error type for rejected calls.
pub mod error;

pub use constants::{LLC_WAYS, MAX_RRPV};
pub use data::{AccessInfo, AccessType, Block};
pub use error::PolicyError;
