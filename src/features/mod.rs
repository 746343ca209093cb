//! Feature extraction modules
//!
//! - Onset detection (spectral flux + backtracking)

pub mod onset;
