//! Visual asset modules
//!
//! - Label to asset lookup
//! - Lazily generated placeholder images and their card drawing
//! - Default background image
//! - Label templates (alphabet, numbers, colors) and prompt parsing

pub mod background;
pub(crate) mod card;
pub mod catalog;
pub(crate) mod persist;
pub mod placeholder;
pub mod templates;
