//! Replacement policy component tests.



/// Fingerprinting, classification, training, and alias table behaviour.
pub mod classifier;



/// Multi-access scenarios driven through the LLC harness.
pub mod scenarios;
