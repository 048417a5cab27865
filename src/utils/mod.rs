//! Utility helpers shared across layers.
//!
//! - [`key_generator`] - Time-ordered push keys for new catalog entries

pub mod key_generator;
