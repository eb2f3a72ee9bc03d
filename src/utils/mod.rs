//! Utilities
pub mod stats;
