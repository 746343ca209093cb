//! Timeline synthesis modules
//!
//! Turns detected onsets into a render plan:
//! - Timestamp normalization (min-gap filter, truncation, padding)
//! - Storyboard building
//! - Timeline composition
//! - Result types

pub mod composer;
pub mod normalizer;
pub mod result;
pub mod storyboard;
